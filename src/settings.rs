use std::path::PathBuf;

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::{
    control::render_loop::CameraState,
    error::GlobeError,
    scene::{planet::PlanetConfig, skybox::SkyboxConfig},
};

pub const SETTINGS_FILE: &str = "Settings";
pub const ENV_PREFIX: &str = "GLOBE";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "The world is on fire".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory that relative dataset and texture paths resolve against.
    pub asset_root: PathBuf,
    pub dataset: PathBuf,
    pub announcement: String,
    pub window: WindowSettings,
    pub planet: PlanetConfig,
    pub skybox: SkyboxConfig,
    pub camera: CameraState,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("resources"),
            dataset: PathBuf::from("volcanos.json"),
            announcement: "boarding-announcement.mp3".to_string(),
            window: WindowSettings::default(),
            planet: PlanetConfig::default(),
            skybox: SkyboxConfig::default(),
            camera: CameraState::default(),
        }
    }
}

impl Settings {
    /// Reads `Settings.toml` when present, then `GLOBE__*` environment
    /// variables (`GLOBE__PLANET__SURFACE__SIZE=0.6`).
    pub fn load() -> Result<Self, GlobeError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(SETTINGS_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, GlobeError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        log::debug!("Loaded settings: {settings:?}");
        Ok(settings)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.asset_root.join(&self.dataset)
    }
}
