use std::{fs, path::Path};

use serde::Deserialize;

use crate::{common::projection::GeoCoord, error::GlobeError};

/// One point of interest read from the dataset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoFeature {
    pub longitude: f32,
    pub latitude: f32,
}

impl GeoFeature {
    pub fn coord(&self) -> GeoCoord {
        GeoCoord::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Option<Vec<f32>>,
}

impl RawFeature {
    fn into_feature(self, index: usize) -> Result<GeoFeature, GlobeError> {
        let malformed = |reason: &str| GlobeError::MalformedFeature {
            index,
            reason: reason.to_owned(),
        };
        let coordinates = self
            .geometry
            .ok_or_else(|| malformed("missing geometry"))?
            .coordinates
            .ok_or_else(|| malformed("missing coordinates"))?;

        // GeoJSON positions are [longitude, latitude, elevation?]
        let [longitude, latitude, ..] = coordinates.as_slice() else {
            return Err(malformed("expected at least two coordinates"));
        };
        let coord = GeoCoord::checked(*latitude, *longitude)?;

        Ok(GeoFeature {
            longitude: coord.longitude,
            latitude: coord.latitude,
        })
    }
}

pub fn parse_features(json: &str) -> Result<Vec<GeoFeature>, GlobeError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| feature.into_feature(index))
        .collect()
}

pub fn read_features(path: &Path) -> Result<Vec<GeoFeature>, GlobeError> {
    let json = fs::read_to_string(path).map_err(|source| GlobeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let features = parse_features(&json)?;
    log::info!("Loaded {} features from {path:?}", features.len());
    Ok(features)
}
