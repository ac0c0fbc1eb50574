use serde::Deserialize;

use crate::{
    common::dataset::GeoFeature, control::texture_loader::TextureRequester, error::GlobeError,
};

use super::{
    assets::SceneAssets,
    marker::{MarkerFactory, MarkerStyle},
    material::{MaterialOptions, TextureBindings, TextureTarget},
    node::SceneNode,
    surface::{bind_texture, build_material, build_sphere},
};

pub const PLANET_NAME: &str = "planet";
pub const SURFACE_NAME: &str = "surface";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub size: f32,
    pub material: MaterialOptions,
    pub textures: TextureBindings,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            size: 0.5,
            material: MaterialOptions::default(),
            textures: TextureBindings::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub surface: SurfaceConfig,
    pub markers: MarkerStyle,
}

/// The planet group. Its first and only direct child is the surface, which
/// carries the markers and spins independently of the group.
#[derive(Debug)]
pub struct Planet {
    root: SceneNode,
}

impl Planet {
    const SURFACE_INDEX: usize = 0;

    /// Builds the planet and starts loading its textures.
    ///
    /// Markers are attached before this returns; textures arrive later.
    pub fn assemble(
        config: &PlanetConfig,
        features: &[GeoFeature],
        assets: &mut SceneAssets,
        requester: &dyn TextureRequester,
    ) -> Result<Self, GlobeError> {
        let geometry = assets.add_geometry(build_sphere(config.surface.size)?);
        let material = assets.add_material(build_material(Some(&config.surface.material)));
        let mut surface = SceneNode::mesh(geometry, material).with_name(SURFACE_NAME);

        config.surface.textures.iter().for_each(|(&slot, uri)| {
            bind_texture(requester, TextureTarget { material, slot }, uri);
        });

        let style = &config.markers;
        let mut markers = MarkerFactory::new();
        features.iter().for_each(|feature| {
            let position = feature.coord().project(style.radius, style.height);
            surface.add_child(markers.build_marker(assets, style.size, style.color, position));
        });
        log::info!("Placed {} markers", features.len());

        let mut root = SceneNode::group(PLANET_NAME);
        root.add_child(surface);

        Ok(Self { root })
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn surface(&self) -> &SceneNode {
        &self.root.children()[Self::SURFACE_INDEX]
    }

    pub fn surface_mut(&mut self) -> &mut SceneNode {
        &mut self.root.children_mut()[Self::SURFACE_INDEX]
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use approx::assert_abs_diff_eq;

    use crate::{
        common::projection::project,
        scene::material::{Color, TextureSlot},
    };

    use super::*;

    #[derive(Default)]
    struct RecordingRequester {
        requests: RefCell<Vec<(TextureTarget, String)>>,
    }

    impl TextureRequester for RecordingRequester {
        fn request(&self, target: TextureTarget, uri: &str) {
            self.requests.borrow_mut().push((target, uri.to_owned()));
        }
    }

    fn volcanoes() -> Vec<GeoFeature> {
        vec![
            GeoFeature {
                longitude: 14.999,
                latitude: 37.748,
            },
            GeoFeature {
                longitude: 138.727,
                latitude: 35.361,
            },
            GeoFeature {
                longitude: -122.18,
                latitude: 46.2,
            },
        ]
    }

    #[test]
    fn markers_hang_off_the_surface() {
        let mut assets = SceneAssets::new();
        let features = volcanoes();

        let planet = Planet::assemble(
            &PlanetConfig::default(),
            &features,
            &mut assets,
            &RecordingRequester::default(),
        )
        .unwrap();

        let surface = planet.root().find_by_name(SURFACE_NAME).unwrap();
        assert_eq!(surface.children().len(), features.len());
        assert_eq!(planet.surface().children().len(), features.len());
        surface
            .children()
            .iter()
            .zip(features.iter())
            .for_each(|(marker, feature)| {
                let expected = project(feature.latitude, feature.longitude, 0.5, 0.0);
                assert_abs_diff_eq!(marker.transform.position.x, expected.x);
                assert_abs_diff_eq!(marker.transform.position.y, expected.y);
                assert_abs_diff_eq!(marker.transform.position.z, expected.z);
            });
    }

    #[test]
    fn surface_is_the_first_child() {
        let mut assets = SceneAssets::new();
        let planet = Planet::assemble(
            &PlanetConfig::default(),
            &[],
            &mut assets,
            &RecordingRequester::default(),
        )
        .unwrap();

        assert_eq!(planet.root().name.as_deref(), Some(PLANET_NAME));
        assert_eq!(planet.root().children().len(), 1);
        assert_eq!(planet.surface().name.as_deref(), Some(SURFACE_NAME));
        assert!(planet.surface().children().is_empty());
    }

    #[test]
    fn surface_mut_reaches_the_surface() {
        let mut assets = SceneAssets::new();
        let mut planet = Planet::assemble(
            &PlanetConfig::default(),
            &volcanoes(),
            &mut assets,
            &RecordingRequester::default(),
        )
        .unwrap();

        planet.surface_mut().transform.rotation.y = -0.5;

        assert_eq!(planet.surface().name.as_deref(), Some(SURFACE_NAME));
        assert_eq!(planet.surface().transform.rotation.y, -0.5);
        assert_eq!(planet.root().transform.rotation.y, 0.0);
    }

    #[test]
    fn textures_are_requested_but_not_applied() {
        let mut assets = SceneAssets::new();
        let requester = RecordingRequester::default();
        let mut config = PlanetConfig::default();
        config
            .surface
            .textures
            .insert(TextureSlot::Map, "earth_diffuse.jpg".to_owned());
        config
            .surface
            .textures
            .insert(TextureSlot::EmissiveMap, "earth_diffuse.jpg".to_owned());

        let planet = Planet::assemble(&config, &[], &mut assets, &requester).unwrap();

        let material = planet.surface().mesh.unwrap().material;
        let requests = requester.requests.borrow();
        assert_eq!(
            *requests,
            vec![
                (
                    TextureTarget {
                        material,
                        slot: TextureSlot::Map
                    },
                    "earth_diffuse.jpg".to_owned()
                ),
                (
                    TextureTarget {
                        material,
                        slot: TextureSlot::EmissiveMap
                    },
                    "earth_diffuse.jpg".to_owned()
                ),
            ]
        );
        assert!(assets.material(material).texture(TextureSlot::Map).is_none());
    }

    #[test]
    fn surface_material_options_are_applied() {
        let mut assets = SceneAssets::new();
        let mut config = PlanetConfig::default();
        config.surface.material.color = Some(Color::from_hex(0x2255aa));

        let planet = Planet::assemble(
            &config,
            &[],
            &mut assets,
            &RecordingRequester::default(),
        )
        .unwrap();

        let material = assets.material(planet.surface().mesh.unwrap().material);
        assert_eq!(material.color, Color::from_hex(0x2255aa));
    }

    #[test]
    fn invalid_size_fails_synchronously() {
        let mut assets = SceneAssets::new();
        let mut config = PlanetConfig::default();
        config.surface.size = 0.0;

        let result = Planet::assemble(
            &config,
            &volcanoes(),
            &mut assets,
            &RecordingRequester::default(),
        );

        assert!(matches!(result, Err(GlobeError::InvalidSize(_))));
    }
}
