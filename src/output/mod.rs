pub mod config;
pub mod presenter;
pub mod render;
pub mod types;

pub use presenter::Emitter;
