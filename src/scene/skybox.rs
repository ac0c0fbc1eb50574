use serde::Deserialize;

use crate::{control::texture_loader::TextureRequester, error::GlobeError};

use super::{
    assets::SceneAssets,
    material::{Material, MaterialId, Shading, Side, TextureSlot, TextureTarget},
    node::SceneNode,
    surface::{bind_texture, build_sphere},
};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkyboxConfig {
    pub texture: String,
    /// Skybox radius as a multiple of the planet radius.
    pub radius_factor: f32,
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            texture: "https://s3-us-west-2.amazonaws.com/s.cdpn.io/141228/starfield.png".to_owned(),
            radius_factor: 200.0,
        }
    }
}

/// Inverted sphere around the whole scene. Hidden until its panorama has
/// loaded; a failed load leaves it hidden for good.
#[derive(Debug)]
pub struct Skybox {
    node: SceneNode,
    material: MaterialId,
    attached: bool,
}

impl Skybox {
    pub fn assemble(
        config: &SkyboxConfig,
        planet_radius: f32,
        assets: &mut SceneAssets,
        requester: &dyn TextureRequester,
    ) -> Result<Self, GlobeError> {
        let geometry = assets.add_geometry(build_sphere(planet_radius * config.radius_factor)?);
        let mut material = Material::new(Shading::Basic);
        material.side = Side::Back;
        let material = assets.add_material(material);

        bind_texture(
            requester,
            TextureTarget {
                material,
                slot: TextureSlot::Map,
            },
            &config.texture,
        );

        Ok(Self {
            node: SceneNode::mesh(geometry, material).with_name("skybox"),
            material,
            attached: false,
        })
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn attach(&mut self) {
        if !self.attached {
            log::info!("Skybox texture ready, attaching skybox");
        }
        self.attached = true;
    }

    /// The skybox node, once it is part of the drawn scene.
    pub fn node(&self) -> Option<&SceneNode> {
        self.attached.then_some(&self.node)
    }
}
