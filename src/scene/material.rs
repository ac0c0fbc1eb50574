use std::{collections::BTreeMap, sync::Arc};

use glam::Vec3;
use image::RgbaImage;
use serde::Deserialize;

/// Linear RGB color, usually written as a `0xRRGGBB` integer in settings.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "u32")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Unlit, color times map.
    Basic,
    /// Diffuse only.
    Lambert,
    /// Diffuse plus a specular highlight.
    Phong,
}

/// Image-backed material properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSlot {
    /// Multiplies the base color.
    Map,
    /// Multiplies the emissive color.
    EmissiveMap,
    /// Red channel scales the specular highlight.
    SpecularMap,
}

pub type TextureBindings = BTreeMap<TextureSlot, String>;

/// Every material property that can be set from configuration.
///
/// Unknown keys fail deserialization instead of being copied blindly onto
/// the material.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialOptions {
    /// Base diffuse color.
    pub color: Option<Color>,
    /// Light emitted regardless of scene lighting.
    pub emissive: Option<Color>,
    /// Scales `emissive`.
    pub emissive_intensity: Option<f32>,
    /// Color of the Phong highlight.
    pub specular: Option<Color>,
    /// Phong exponent, higher is sharper.
    pub shininess: Option<f32>,
    /// Which faces are drawn.
    pub side: Option<Side>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub(crate) usize);

/// Destination of an asynchronous texture load.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureTarget {
    pub material: MaterialId,
    pub slot: TextureSlot,
}

#[derive(Clone, Debug)]
pub struct Material {
    pub shading: Shading,
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub specular: Color,
    pub shininess: f32,
    pub side: Side,
    textures: BTreeMap<TextureSlot, Arc<RgbaImage>>,
    needs_update: bool,
}

impl Material {
    pub fn new(shading: Shading) -> Self {
        Self {
            shading,
            color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
            side: Side::Front,
            textures: BTreeMap::new(),
            needs_update: true,
        }
    }

    pub fn phong() -> Self {
        Self::new(Shading::Phong)
    }

    pub fn with_options(mut self, options: &MaterialOptions) -> Self {
        self.apply(options);
        self
    }

    pub fn apply(&mut self, options: &MaterialOptions) {
        let MaterialOptions {
            color,
            emissive,
            emissive_intensity,
            specular,
            shininess,
            side,
        } = *options;

        if let Some(color) = color {
            self.color = color;
        }
        if let Some(emissive) = emissive {
            self.emissive = emissive;
        }
        if let Some(emissive_intensity) = emissive_intensity {
            self.emissive_intensity = emissive_intensity;
        }
        if let Some(specular) = specular {
            self.specular = specular;
        }
        if let Some(shininess) = shininess {
            self.shininess = shininess;
        }
        if let Some(side) = side {
            self.side = side;
        }
        self.needs_update = true;
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<RgbaImage>> {
        self.textures.get(&slot)
    }

    pub fn set_texture(&mut self, slot: TextureSlot, image: Arc<RgbaImage>) {
        self.textures.insert(slot, image);
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub(crate) fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_override_defaults() {
        let options = MaterialOptions {
            color: Some(Color::from_hex(0x336699)),
            shininess: Some(5.0),
            ..Default::default()
        };

        let material = Material::phong().with_options(&options);

        assert_eq!(material.color, Color::from_hex(0x336699));
        assert_eq!(material.shininess, 5.0);
        assert_eq!(material.emissive, Color::BLACK);
        assert_eq!(material.side, Side::Front);
    }

    #[test]
    fn options_deserialize_from_hex_integers() {
        let json = r#"{"color": 16711680, "side": "back", "emissive_intensity": 0.5}"#;

        let options: MaterialOptions = serde_json::from_str(json).unwrap();

        assert_eq!(options.color, Some(Color::from_hex(0xff0000)));
        assert_eq!(options.side, Some(Side::Back));
        assert_eq!(options.emissive_intensity, Some(0.5));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let json = r#"{"colour": 16711680}"#;

        let err = serde_json::from_str::<MaterialOptions>(json).unwrap_err();

        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn unknown_texture_slot_is_rejected() {
        let json = r#"{"map": "earth.jpg", "bump_map": "bump.jpg"}"#;

        assert!(serde_json::from_str::<TextureBindings>(json).is_err());
    }

    #[test]
    fn setting_a_texture_flags_reupload() {
        let mut material = Material::phong();
        material.mark_uploaded();
        assert!(!material.needs_update());

        material.set_texture(TextureSlot::Map, Arc::new(RgbaImage::new(2, 2)));

        assert!(material.needs_update());
        assert!(material.texture(TextureSlot::Map).is_some());
        assert!(material.texture(TextureSlot::EmissiveMap).is_none());
    }
}
