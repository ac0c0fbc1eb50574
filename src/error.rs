use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the globe or loading its assets.
#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f32, longitude: f32 },

    #[error("feature #{index} is malformed: {reason}")]
    MalformedFeature { index: usize, reason: String },

    #[error("sphere size must be a positive finite number, got {0}")]
    InvalidSize(f32),

    #[error("unable to parse dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("unable to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to fetch asset: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("invalid settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Failure of a single draw call; fatal to the render loop.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),
}
