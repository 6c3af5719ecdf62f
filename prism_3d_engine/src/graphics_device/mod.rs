/// Graphics device module - backend-agnostic GPU capability traits and types

// Module declarations
pub mod handles;
pub mod memory;
pub mod buffer;
pub mod shader;
pub mod pipeline;
pub mod command_list;
pub mod surface;
pub mod graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use handles::*;
pub use memory::*;
pub use buffer::*;
pub use shader::*;
pub use pipeline::*;
pub use command_list::*;
pub use surface::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
