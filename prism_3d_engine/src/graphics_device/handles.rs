/// Opaque GPU object handles
///
/// Backends store their native handle as a `u64` (e.g. `vk::Buffer::as_raw()`).
/// The value 0 is the null handle; destroying a null handle is always a no-op.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            /// Null handle
            pub const NULL: Self = Self(0);

            /// Wrap a raw backend handle
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw backend handle
            pub fn as_raw(&self) -> u64 {
                self.0
            }

            /// True for the null handle
            pub fn is_null(&self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// GPU buffer object
    BufferHandle
);
define_handle!(
    /// Device memory allocation
    MemoryHandle
);
define_handle!(
    /// Compiled shader module
    ShaderModuleHandle
);
define_handle!(
    /// Graphics pipeline
    PipelineHandle
);
define_handle!(
    /// Pipeline layout (push constant ranges)
    PipelineLayoutHandle
);
define_handle!(
    /// Pipeline cache shared by every pipeline build
    PipelineCacheHandle
);
define_handle!(
    /// Command buffer (one-shot transfers)
    CommandBufferHandle
);
define_handle!(
    /// Render pass owned by the presentation layer
    RenderPassHandle
);
define_handle!(
    /// Framebuffer owned by the presentation layer
    FramebufferHandle
);
