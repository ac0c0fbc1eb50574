use std::collections::HashMap;

use glam::Vec3;
use serde::Deserialize;

use crate::render::geometry::generate_uv_sphere;

use super::{
    assets::SceneAssets,
    material::{Color, GeometryId, Material, MaterialId, Shading},
    node::SceneNode,
};

const MARKER_WIDTH_SEGMENTS: u32 = 16;
const MARKER_HEIGHT_SEGMENTS: u32 = 8;

/// How every feature of the dataset is drawn on the planet.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Radius of the sphere the markers are projected onto.
    pub radius: f32,
    /// Distance above that sphere.
    pub height: f32,
    /// Radius of the marker itself.
    pub size: f32,
    pub color: Color,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 0.0,
            size: 0.0075,
            color: Color::from_hex(0xff0000),
        }
    }
}

/// Builds marker nodes, sharing geometry and material between markers of
/// the same size and color.
#[derive(Debug, Default)]
pub struct MarkerFactory {
    geometries: HashMap<u32, GeometryId>,
    materials: HashMap<[u32; 3], MaterialId>,
}

impl MarkerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build_marker(
        &mut self,
        assets: &mut SceneAssets,
        size: f32,
        color: Color,
        position: Vec3,
    ) -> SceneNode {
        let geometry = *self.geometries.entry(size.to_bits()).or_insert_with(|| {
            assets.add_geometry(generate_uv_sphere(
                size,
                MARKER_WIDTH_SEGMENTS,
                MARKER_HEIGHT_SEGMENTS,
            ))
        });

        let color_key = [color.r, color.g, color.b].map(f32::to_bits);
        let material = *self.materials.entry(color_key).or_insert_with(|| {
            let mut material = Material::new(Shading::Lambert);
            material.color = color;
            material.emissive = color;
            assets.add_material(material)
        });

        SceneNode::mesh(geometry, material).with_position(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_emissive_and_unnamed() {
        let mut assets = SceneAssets::new();
        let mut factory = MarkerFactory::new();
        let red = Color::from_hex(0xff0000);

        let marker = factory.build_marker(&mut assets, 0.01, red, Vec3::new(0.5, 0.0, 0.0));

        assert!(marker.name.is_none());
        assert!(marker.children().is_empty());
        assert_eq!(marker.transform.position, Vec3::new(0.5, 0.0, 0.0));

        let material = assets.material(marker.mesh.unwrap().material);
        assert_eq!(material.emissive, red);
        assert_eq!(material.shading, Shading::Lambert);
    }

    #[test]
    fn markers_share_assets() {
        let mut assets = SceneAssets::new();
        let mut factory = MarkerFactory::new();
        let red = Color::from_hex(0xff0000);

        let first = factory.build_marker(&mut assets, 0.01, red, Vec3::X);
        let second = factory.build_marker(&mut assets, 0.01, red, Vec3::Y);
        let blue = factory.build_marker(&mut assets, 0.01, Color::from_hex(0x0000ff), Vec3::Z);

        assert_eq!(first.mesh, second.mesh);
        assert_eq!(
            first.mesh.unwrap().geometry,
            blue.mesh.unwrap().geometry
        );
        assert_ne!(
            first.mesh.unwrap().material,
            blue.mesh.unwrap().material
        );
        assert_eq!(assets.num_materials(), 2);
    }
}
