use glam::Vec3;
use std::f32::consts::PI;

use crate::error::GlobeError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoCoord {
    pub latitude: f32,
    pub longitude: f32,
}

impl GeoCoord {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects non-finite values and anything outside [-90, 90] x [-180, 180].
    pub fn checked(latitude: f32, longitude: f32) -> Result<Self, GlobeError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self::new(latitude, longitude))
        } else {
            Err(GlobeError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn project(&self, radius: f32, height: f32) -> Vec3 {
        project(self.latitude, self.longitude, radius, height)
    }
}

/// Maps a geographic coordinate onto a sphere of `radius + height`.
///
/// y is up, the north pole maps to +Y and longitude 180 lies on -X.
pub fn project(latitude: f32, longitude: f32, radius: f32, height: f32) -> Vec3 {
    let phi = latitude * PI / 180.0;
    let theta = (longitude - 180.0) * PI / 180.0;
    let r = radius + height;

    let x = -r * phi.cos() * theta.cos();
    let y = r * phi.sin();
    let z = r * phi.cos() * theta.sin();

    Vec3::new(x, y, z)
}
