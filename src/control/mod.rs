pub mod announcement;
pub mod input_controller;
pub mod render_loop;
pub mod texture_loader;
