/// Presentation-layer capabilities consumed by the frame loop

use crate::graphics_device::{CommandList, Extent2D, FramebufferHandle, RenderPassHandle, SampleCount};

/// Window/swapchain side of rendering
///
/// The presentation layer owns the swapchain, framebuffers, the default render
/// pass and the per-frame command buffer. The core reaches it only through
/// this trait.
pub trait SurfaceProvider {
    /// Current swapchain image size
    fn extent(&self) -> Extent2D;

    /// Command list of the frame being recorded
    fn command_list(&mut self) -> &mut dyn CommandList;

    /// Framebuffer of the current swapchain image
    fn framebuffer(&self) -> FramebufferHandle;

    /// Render pass compatible with every framebuffer of the surface
    fn render_pass(&self) -> RenderPassHandle;

    /// Sample count of the color attachment
    fn sample_count(&self) -> SampleCount;

    /// Signal that recording is finished and the frame can be submitted
    fn frame_ready(&mut self);

    /// Schedule the next frame
    fn request_update(&mut self);
}
