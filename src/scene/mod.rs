pub mod assets;
pub mod camera;
pub mod graph;
pub mod marker;
pub mod material;
pub mod node;
pub mod planet;
pub mod skybox;
pub mod surface;
