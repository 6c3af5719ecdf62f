/// FrameRenderLoop - records one frame: render pass, then per object pipeline,
/// transform, buffers and draw call.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::error::{Error, Result};
use crate::graphics_device::{
    ClearValue, CommandList, Extent2D, FramebufferHandle, IndexType, Rect2D, RenderPassHandle,
    SampleCount, ShaderStage, SurfaceProvider, Viewport,
};
use crate::renderer::PipelineSet;
use crate::scene::{DrawableObject, Scene};
use crate::{engine_error, engine_trace, engine_warn};

/// Phase of the frame state machine
///
/// `BeginFrame -> RecordPass -> DrawObjects -> EndPass -> Present -> BeginFrame`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Idle, waiting for the next frame
    BeginFrame,
    /// Render pass open, viewport and scissor set
    RecordPass,
    /// Every object recorded
    DrawObjects,
    /// Render pass closed
    EndPass,
    /// Handing the frame to the presentation layer
    Present,
}

impl FrameState {
    /// Following phase
    pub fn next(self) -> Self {
        match self {
            FrameState::BeginFrame => FrameState::RecordPass,
            FrameState::RecordPass => FrameState::DrawObjects,
            FrameState::DrawObjects => FrameState::EndPass,
            FrameState::EndPass => FrameState::Present,
            FrameState::Present => FrameState::BeginFrame,
        }
    }
}

/// Model-view-projection matrix pushed to the vertex stage, column-major
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PushConstantBlock {
    pub mvp: [f32; 16],
}

impl PushConstantBlock {
    /// `view_projection * model`
    pub fn new(view_projection: Mat4, model: Mat4) -> Self {
        Self { mvp: (view_projection * model).to_cols_array() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Counters of one recorded frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Total draw calls (indexed and non-indexed)
    pub draw_calls: u32,
    /// Draw calls issued with an index buffer
    pub indexed_draw_calls: u32,
    /// Vertices submitted by non-indexed draws
    pub vertices: u32,
    /// Indices submitted by indexed draws
    pub indices: u32,
}

/// Snapshot of the surface state a frame is recorded against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTarget {
    pub extent: Extent2D,
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    pub sample_count: SampleCount,
}

impl FrameTarget {
    pub fn from_surface(surface: &dyn SurfaceProvider) -> Self {
        Self {
            extent: surface.extent(),
            render_pass: surface.render_pass(),
            framebuffer: surface.framebuffer(),
            sample_count: surface.sample_count(),
        }
    }
}

/// Per-frame command recording
#[derive(Debug)]
pub struct FrameRenderLoop {
    state: FrameState,
    clear_color: [f32; 4],
    frames_presented: u64,
}

impl FrameRenderLoop {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            state: FrameState::BeginFrame,
            clear_color,
            frames_presented: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Abandon a partially recorded frame (e.g. after the swapchain was recreated)
    pub fn reset(&mut self) {
        self.state = FrameState::BeginFrame;
    }

    fn expect_state(&self, expected: FrameState) -> Result<()> {
        if self.state != expected {
            engine_error!(
                "prism3d::frame",
                "Frame loop is in {:?}, expected {:?}",
                self.state, expected
            );
            return Err(Error::InvalidState(format!(
                "frame loop is in {:?}, expected {:?}",
                self.state, expected
            )));
        }
        Ok(())
    }

    /// Clear values in attachment order: color, depth/stencil, and the
    /// multisample resolve color when the surface is multisampled
    pub fn clear_values(&self, sample_count: SampleCount) -> Vec<ClearValue> {
        let mut values = vec![
            ClearValue::Color(self.clear_color),
            ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
        ];
        if sample_count.is_multisampled() {
            values.push(ClearValue::Color(self.clear_color));
        }
        values
    }

    /// Begin the render pass and set the dynamic viewport and scissor
    pub fn begin_pass(&mut self, cmd: &mut dyn CommandList, target: &FrameTarget) -> Result<()> {
        self.expect_state(FrameState::BeginFrame)?;

        let clear_values = self.clear_values(target.sample_count);
        cmd.begin_render_pass(target.render_pass, target.framebuffer, target.extent, &clear_values)?;
        let dynamic_state = cmd
            .set_viewport(Viewport::full(target.extent))
            .and_then(|_| cmd.set_scissor(Rect2D::full(target.extent)));
        if let Err(e) = dynamic_state {
            self.abort_pass(cmd);
            return Err(e);
        }

        self.state = FrameState::RecordPass;
        Ok(())
    }

    /// Record every object of the scene, in scene order
    pub fn draw_objects(
        &mut self,
        cmd: &mut dyn CommandList,
        pipelines: &PipelineSet,
        scene: &Scene,
        view_projection: Mat4,
    ) -> Result<FrameStats> {
        self.expect_state(FrameState::RecordPass)?;
        if !pipelines.is_complete() {
            engine_error!("prism3d::frame", "Drawing before the pipelines were built");
            self.abort_pass(cmd);
            return Err(Error::InvalidState("pipelines are not built".to_string()));
        }

        let mut stats = FrameStats::default();
        for object in scene.objects() {
            if let Err(e) = Self::draw_object(cmd, pipelines, object, view_projection, &mut stats) {
                self.abort_pass(cmd);
                return Err(e);
            }
        }

        self.state = FrameState::DrawObjects;
        Ok(stats)
    }

    /// Close the open render pass and return to `BeginFrame`
    ///
    /// Leaves the command list balanced so the next frame can start.
    fn abort_pass(&mut self, cmd: &mut dyn CommandList) {
        if let Err(e) = cmd.end_render_pass() {
            engine_warn!("prism3d::frame", "Could not close the render pass of a failed frame: {}", e);
        }
        self.state = FrameState::BeginFrame;
    }

    fn draw_object(
        cmd: &mut dyn CommandList,
        pipelines: &PipelineSet,
        object: &DrawableObject,
        view_projection: Mat4,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let vertex_buffer = match object.vertex_buffer() {
            Some(buffer) if buffer.is_valid() => buffer.buffer(),
            _ => {
                engine_error!("prism3d::frame", "Object '{}' has no vertex buffer", object.name());
                return Err(Error::InvalidResource(format!(
                    "object '{}' has no vertex buffer",
                    object.name()
                )));
            }
        };

        cmd.bind_pipeline(pipelines.select(object.draw_style()))?;
        let push = PushConstantBlock::new(view_projection, object.transform());
        cmd.push_constants(pipelines.layout(), &[ShaderStage::Vertex], 0, push.as_bytes())?;
        cmd.bind_vertex_buffer(vertex_buffer, 0)?;

        if object.is_indexed() {
            let index_buffer = match object.index_buffer() {
                Some(buffer) if buffer.is_valid() => buffer.buffer(),
                _ => {
                    engine_error!("prism3d::frame", "Object '{}' has indices but no index buffer", object.name());
                    return Err(Error::InvalidResource(format!(
                        "object '{}' has indices but no index buffer",
                        object.name()
                    )));
                }
            };
            let index_count = object.indices().len() as u32;
            cmd.bind_index_buffer(index_buffer, 0, IndexType::U32)?;
            cmd.draw_indexed(index_count, 0, 0)?;
            stats.indexed_draw_calls += 1;
            stats.indices += index_count;
        } else {
            let vertex_count = object.vertices().len() as u32;
            cmd.draw(vertex_count, 0)?;
            stats.vertices += vertex_count;
        }
        stats.draw_calls += 1;

        engine_trace!("prism3d::frame", "Drew '{}' ({:?})", object.name(), object.draw_style());
        Ok(())
    }

    /// Close the render pass
    pub fn end_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        self.expect_state(FrameState::DrawObjects)?;
        if let Err(e) = cmd.end_render_pass() {
            self.state = FrameState::BeginFrame;
            return Err(e);
        }
        self.state = FrameState::EndPass;
        Ok(())
    }

    /// Begin pass, draw every object, end pass
    pub fn record(
        &mut self,
        cmd: &mut dyn CommandList,
        target: &FrameTarget,
        pipelines: &PipelineSet,
        scene: &Scene,
        view_projection: Mat4,
    ) -> Result<FrameStats> {
        self.begin_pass(cmd, target)?;
        let stats = self.draw_objects(cmd, pipelines, scene, view_projection)?;
        self.end_pass(cmd)?;
        Ok(stats)
    }

    /// Mark the frame ready and schedule the next one
    pub fn present(&mut self, surface: &mut dyn SurfaceProvider) -> Result<()> {
        self.expect_state(FrameState::EndPass)?;
        self.state = FrameState::Present;

        surface.frame_ready();
        surface.request_update();

        self.frames_presented += 1;
        self.state = FrameState::BeginFrame;
        Ok(())
    }

    /// Record and present one full frame on `surface`
    pub fn render_frame(
        &mut self,
        surface: &mut dyn SurfaceProvider,
        pipelines: &PipelineSet,
        scene: &Scene,
        view_projection: Mat4,
    ) -> Result<FrameStats> {
        let target = FrameTarget::from_surface(surface);
        let stats = self.record(surface.command_list(), &target, pipelines, scene, view_projection)?;
        self.present(surface)?;
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
