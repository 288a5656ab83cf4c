pub mod capacity;
pub mod config;
pub mod render;
