/*!
# Prism3D Engine

Core of the Prism3D renderer: GPU resource and pipeline lifecycle management
plus the per-frame render loop.

This crate is backend-agnostic. A backend (see `prism_3d_engine_renderer_vulkan`)
implements the [`GraphicsDevice`](prism3d::render::GraphicsDevice) and
[`CommandList`](prism3d::render::CommandList) traits; the presentation layer
implements [`SurfaceProvider`](prism3d::render::SurfaceProvider).

## Architecture

- **MemoryTypeSelector**: `find_memory_type`, explicit memory-type selection
- **BufferTransferEngine**: staging uploads into device-local buffers
- **PipelineStateBuilder**: fill/line pipeline variants from one table
- **FrameRenderLoop**: render pass, per-object pipeline/push constant/draw
- **ResourceLifecycleManager**: device-idle teardown in reverse dependency order
- **Renderer**: façade with the init / frame / release hooks
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod renderer;
pub mod scene;

// Main prism3d namespace module
pub mod prism3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine (logger slot)
    pub use crate::engine::Engine;

    // Renderer façade
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module: device capabilities and the render core
    pub mod render {
        pub use crate::graphics_device::*;
        pub use crate::renderer::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
