/// Renderer module - GPU resource, pipeline and frame-loop core

// Module declarations
pub mod config;
pub mod transfer;
pub mod pipeline_builder;
pub mod frame;
pub mod lifecycle;
pub mod renderer;

// Re-export everything from renderer.rs
pub use renderer::*;

// Re-export from other modules
pub use config::*;
pub use transfer::*;
pub use pipeline_builder::*;
pub use frame::*;
pub use lifecycle::*;
