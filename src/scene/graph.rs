use glam::{vec3, Mat4, Vec3};

use crate::{
    common::{data::Size, dataset::GeoFeature},
    control::texture_loader::{TextureEvent, TextureRequester},
    error::GlobeError,
};

use super::{
    assets::SceneAssets,
    camera::PerspectiveCamera,
    material::{Color, GeometryId, MaterialId, Side},
    planet::{Planet, PlanetConfig},
    skybox::{Skybox, SkyboxConfig},
};

/// Whatever presents the frames; resized together with the camera.
pub trait OutputSurface {
    fn resize_output(&mut self, size: Size<u32>);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub ambient: Color,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: vec3(0.125, 0.0, 1.0),
            color: Color::WHITE,
            intensity: 1.0,
            ambient: Color::BLACK,
        }
    }
}

/// One mesh to draw with its accumulated transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub side: Side,
    pub world: Mat4,
}

#[derive(Debug)]
pub struct SceneGraph {
    pub camera: PerspectiveCamera,
    pub light: PointLight,
    planet: Planet,
    skybox: Skybox,
    assets: SceneAssets,
    viewport: Size<u32>,
}

impl SceneGraph {
    /// Assembles the planet and the skybox and requests their textures.
    pub fn build(
        planet_config: &PlanetConfig,
        skybox_config: &SkyboxConfig,
        features: &[GeoFeature],
        requester: &dyn TextureRequester,
        viewport: Size<u32>,
    ) -> Result<Self, GlobeError> {
        let mut assets = SceneAssets::new();
        let planet = Planet::assemble(planet_config, features, &mut assets, requester)?;
        let skybox = Skybox::assemble(
            skybox_config,
            planet_config.surface.size,
            &mut assets,
            requester,
        )?;

        let mut camera = PerspectiveCamera::default();
        if !viewport.is_empty() {
            camera.set_aspect(viewport.aspect_ratio());
            camera.update_projection_matrix();
        }
        camera.look_at(planet.root().transform.position);

        Ok(Self {
            camera,
            light: PointLight::default(),
            planet,
            skybox,
            assets,
            viewport,
        })
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    pub fn planet_mut(&mut self) -> &mut Planet {
        &mut self.planet
    }

    pub fn skybox(&self) -> &Skybox {
        &self.skybox
    }

    pub fn assets(&self) -> &SceneAssets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut SceneAssets {
        &mut self.assets
    }

    pub fn viewport(&self) -> Size<u32> {
        self.viewport
    }

    /// Applies a viewport change to the camera and the output surface.
    pub fn resize(&mut self, size: Size<u32>, output: &mut dyn OutputSurface) {
        if size.is_empty() {
            log::debug!("Ignoring empty viewport {size:?}");
            return;
        }
        self.viewport = size;
        self.camera.set_aspect(size.aspect_ratio());
        self.camera.update_projection_matrix();
        output.resize_output(size);
    }

    /// Applies a finished texture load. Returns whether the scene changed.
    pub fn apply_texture(&mut self, event: TextureEvent) -> bool {
        match event {
            TextureEvent::Loaded { target, uri, image } => {
                log::info!(
                    "Applying {uri} ({}x{}) to {target:?}",
                    image.width(),
                    image.height()
                );
                self.assets
                    .material_mut(target.material)
                    .set_texture(target.slot, image);
                if target.material == self.skybox.material() {
                    self.skybox.attach();
                }
                true
            }
            TextureEvent::Failed {
                target,
                uri,
                reason,
            } => {
                log::warn!("Texture {uri} for {target:?} failed to load: {reason}");
                if target.material == self.skybox.material() {
                    log::warn!("Skybox stays hidden");
                }
                false
            }
        }
    }

    /// Flattens every visible mesh with its world transform.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        let mut collect = |node: &super::node::SceneNode, world: Mat4| {
            if let Some(mesh) = node.mesh {
                items.push(DrawItem {
                    geometry: mesh.geometry,
                    material: mesh.material,
                    side: self.assets.material(mesh.material).side,
                    world,
                });
            }
        };

        if let Some(skybox) = self.skybox.node() {
            skybox.traverse(Mat4::IDENTITY, &mut collect);
        }
        self.planet.root().traverse(Mat4::IDENTITY, &mut collect);

        items
    }
}
