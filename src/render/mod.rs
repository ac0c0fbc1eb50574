pub mod buffer;
pub mod data;
pub mod geometry;
pub mod pipeline;
pub mod render_engine;
pub mod texture;
