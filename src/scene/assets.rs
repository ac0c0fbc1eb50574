use crate::render::geometry::Geometry;

use super::material::{GeometryId, Material, MaterialId};

/// Geometries and materials shared by scene nodes, addressed by id.
#[derive(Debug, Default)]
pub struct SceneAssets {
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
}

impl SceneAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }

    /// Returns the materials flagged for GPU upload and clears their flag.
    pub fn take_updated_materials(&mut self) -> Vec<MaterialId> {
        self.materials
            .iter_mut()
            .enumerate()
            .filter(|(_, material)| material.needs_update())
            .map(|(i, material)| {
                material.mark_uploaded();
                MaterialId(i)
            })
            .collect()
    }
}
