/*!
# Prism3D Engine - Vulkan Backend

Vulkan implementation of the Prism3D core traits, built on `ash`.

- [`VulkanGraphicsDevice`](prism3d::VulkanGraphicsDevice) implements `GraphicsDevice`:
  buffers, explicit memory allocation, one-shot copies, shader modules and
  graphics pipelines.
- [`VulkanCommandList`](prism3d::VulkanCommandList) implements `CommandList` on a
  command buffer owned by the presentation layer.
- Validation-layer messages are routed to the engine logger.

```no_run
use prism_3d_engine::prism3d::render::{BufferUsageFlags, BufferTransferEngine};
use prism_3d_engine_renderer_vulkan::prism3d::{VulkanDeviceConfig, VulkanGraphicsDevice};

let mut device = VulkanGraphicsDevice::new_headless(VulkanDeviceConfig::default())?;
let transfer = BufferTransferEngine::new(&device);
let buffer = transfer.upload_to_device(&mut device, &[0u8; 64], BufferUsageFlags::VERTEX)?;
# Ok::<(), prism_3d_engine::prism3d::Error>(())
```
*/

mod debug;
mod vulkan_command_list;
mod vulkan_device;
mod vulkan_format;

pub mod prism3d {
    pub use crate::vulkan_device::{VulkanDeviceConfig, VulkanGraphicsDevice};
    pub use crate::vulkan_command_list::VulkanCommandList;

    /// Validation layer statistics
    pub mod debug {
        pub use crate::debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
    }
}
