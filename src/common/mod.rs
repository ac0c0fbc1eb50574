pub mod data;
pub mod dataset;
pub mod projection;
