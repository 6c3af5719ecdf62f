/// VulkanCommandList - records the engine's CommandList calls into a Vulkan
/// command buffer owned by the presentation layer

use ash::vk;
use prism_3d_engine::prism3d::render::{
    BufferHandle, ClearValue, CommandList, Extent2D, FramebufferHandle, IndexType,
    PipelineHandle, PipelineLayoutHandle, Rect2D, RenderPassHandle, ShaderStage, Viewport,
};
use prism_3d_engine::prism3d::{Error, Result};
use prism_3d_engine::engine_error;

use crate::vulkan_format::*;

/// Vulkan command list
///
/// The command buffer must already be in the recording state; beginning,
/// ending and submitting it is the presentation layer's job.
pub struct VulkanCommandList {
    device: ash::Device,
    command_buffer: vk::CommandBuffer,
    /// Whether we're inside a render pass
    in_render_pass: bool,
}

impl VulkanCommandList {
    pub fn new(device: ash::Device, command_buffer: vk::CommandBuffer) -> Self {
        Self {
            device,
            command_buffer,
            in_render_pass: false,
        }
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Point the list at the command buffer of the next frame
    pub fn set_command_buffer(&mut self, command_buffer: vk::CommandBuffer) {
        self.command_buffer = command_buffer;
        self.in_render_pass = false;
    }

    fn require_render_pass(&self, command: &str) -> Result<()> {
        if !self.in_render_pass {
            engine_error!("prism3d::vulkan", "{} recorded outside a render pass", command);
            return Err(Error::InvalidState(format!("{} outside a render pass", command)));
        }
        Ok(())
    }
}

impl CommandList for VulkanCommandList {
    fn begin_render_pass(
        &mut self,
        render_pass: RenderPassHandle,
        framebuffer: FramebufferHandle,
        extent: Extent2D,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if self.in_render_pass {
            engine_error!("prism3d::vulkan", "Render pass already begun");
            return Err(Error::InvalidState("render pass already begun".to_string()));
        }

        let vk_clear_values: Vec<vk::ClearValue> =
            clear_values.iter().map(|value| clear_value_to_vk(*value)).collect();

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(vk_handle(render_pass.as_raw()))
            .framebuffer(vk_handle(framebuffer.as_raw()))
            .render_area(rect_to_vk(Rect2D::full(extent)))
            .clear_values(&vk_clear_values);

        unsafe {
            self.device
                .cmd_begin_render_pass(self.command_buffer, &begin_info, vk::SubpassContents::INLINE);
        }
        self.in_render_pass = true;
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.require_render_pass("end_render_pass")?;
        unsafe {
            self.device.cmd_end_render_pass(self.command_buffer);
        }
        self.in_render_pass = false;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        unsafe {
            self.device
                .cmd_set_viewport(self.command_buffer, 0, &[viewport_to_vk(viewport)]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        unsafe {
            self.device
                .cmd_set_scissor(self.command_buffer, 0, &[rect_to_vk(scissor)]);
        }
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        if pipeline.is_null() {
            return Err(Error::InvalidResource("bind of a null pipeline".to_string()));
        }
        unsafe {
            self.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_handle(pipeline.as_raw()),
            );
        }
        Ok(())
    }

    fn push_constants(
        &mut self,
        layout: PipelineLayoutHandle,
        stages: &[ShaderStage],
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        unsafe {
            self.device.cmd_push_constants(
                self.command_buffer,
                vk_handle(layout.as_raw()),
                shader_stages_to_vk(stages),
                offset,
                data,
            );
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, offset: u64) -> Result<()> {
        unsafe {
            self.device.cmd_bind_vertex_buffers(
                self.command_buffer,
                0,
                &[vk_handle(buffer.as_raw())],
                &[offset],
            );
        }
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle, offset: u64, index_type: IndexType) -> Result<()> {
        unsafe {
            self.device.cmd_bind_index_buffer(
                self.command_buffer,
                vk_handle(buffer.as_raw()),
                offset,
                index_type_to_vk(index_type),
            );
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.require_render_pass("draw")?;
        unsafe {
            self.device
                .cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.require_render_pass("draw_indexed")?;
        unsafe {
            self.device
                .cmd_draw_indexed(self.command_buffer, index_count, 1, first_index, vertex_offset, 0);
        }
        Ok(())
    }
}
