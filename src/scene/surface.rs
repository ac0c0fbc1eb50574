use crate::{
    control::texture_loader::TextureRequester,
    error::GlobeError,
    render::geometry::{generate_uv_sphere, Geometry},
};

use super::material::{Material, MaterialOptions, TextureTarget};

pub const SPHERE_SEGMENTS: u32 = 32;

pub fn build_sphere(size: f32) -> Result<Geometry, GlobeError> {
    if !(size.is_finite() && size > 0.0) {
        return Err(GlobeError::InvalidSize(size));
    }
    Ok(generate_uv_sphere(size, SPHERE_SEGMENTS, SPHERE_SEGMENTS))
}

/// Phong material with `options` applied over the defaults.
pub fn build_material(options: Option<&MaterialOptions>) -> Material {
    let material = Material::phong();
    match options {
        Some(options) => material.with_options(options),
        None => material,
    }
}

/// Starts loading `uri` into `target`. Returns immediately; the slot keeps
/// its current image until the load completes, and forever if it fails.
pub fn bind_texture(requester: &dyn TextureRequester, target: TextureTarget, uri: &str) {
    log::debug!("Binding {uri} to {target:?}");
    requester.request(target, uri);
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::scene::material::{Color, Shading};

    use super::*;

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f32::NAN)]
    fn rejects_degenerate_sizes(#[case] size: f32) {
        assert!(matches!(build_sphere(size), Err(GlobeError::InvalidSize(_))));
    }

    #[test]
    fn builds_fixed_tessellation() {
        let sphere = build_sphere(0.5).unwrap();
        assert_eq!(
            sphere.vertices.len(),
            ((SPHERE_SEGMENTS + 1) * (SPHERE_SEGMENTS + 1)) as usize
        );
    }

    #[test]
    fn default_material_is_phong() {
        let material = build_material(None);
        assert_eq!(material.shading, Shading::Phong);
        assert_eq!(material.color, Color::WHITE);
    }
}
