/// Renderer façade - wires the transfer engine, pipeline builder, frame loop
/// and lifecycle manager to the presentation layer's hooks
///
/// Hook order driven by the presentation layer:
/// `init_resources` -> `init_swap_chain_resources` -> `start_next_frame`* ->
/// `release_swap_chain_resources` -> `release_resources`.

use glam::{Mat4, Vec3};

use crate::error::{Error, Result};
use crate::graphics_device::{Extent2D, GraphicsDevice, SampleCount, SurfaceProvider};
use crate::renderer::{
    choose_sample_count, BufferTransferEngine, FrameRenderLoop, FrameStats, FrameTarget,
    PipelineSet, PipelineStateBuilder, ReleaseReport, RendererConfig, ResourceLifecycleManager,
};
use crate::scene::Scene;
use crate::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};

pub struct Renderer {
    config: RendererConfig,
    pipeline_builder: PipelineStateBuilder,
    pipelines: PipelineSet,
    frame_loop: FrameRenderLoop,
    scene: Scene,
    extent: Extent2D,
    initialized: bool,
}

impl Renderer {
    pub fn new(config: RendererConfig, scene: Scene) -> Self {
        Self {
            pipeline_builder: PipelineStateBuilder::from_config(&config),
            frame_loop: FrameRenderLoop::new(config.clear_color),
            pipelines: PipelineSet::default(),
            extent: Extent2D::default(),
            initialized: false,
            config,
            scene,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Scene access for external mutation between frames
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn pipelines(&self) -> &PipelineSet {
        &self.pipelines
    }

    pub fn frame_loop(&self) -> &FrameRenderLoop {
        &self.frame_loop
    }

    /// Aspect ratio of the current swapchain, for the external camera
    pub fn aspect_ratio(&self) -> f32 {
        self.extent.aspect_ratio()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sample count the presentation layer should create its surface with
    pub fn preferred_sample_count(&self, device: &dyn GraphicsDevice) -> SampleCount {
        choose_sample_count(&device.info().supported_sample_counts(), self.config.request_msaa)
    }

    // ===== LIFECYCLE HOOKS =====

    /// Upload the scene and build the pipelines
    ///
    /// On failure every object created so far is released and the original
    /// error is returned.
    pub fn init_resources(&mut self, device: &mut dyn GraphicsDevice, surface: &dyn SurfaceProvider) -> Result<()> {
        if self.initialized {
            engine_error!("prism3d::renderer", "init_resources called twice");
            return Err(Error::InvalidState("renderer resources already initialized".to_string()));
        }

        for line in device.info().report() {
            engine_info!("prism3d::renderer", "{}", line);
        }

        if let Err(e) = self.create_resources(device, surface) {
            engine_error!("prism3d::renderer", "Resource initialization failed: {}", e);
            if let Err(release_error) =
                ResourceLifecycleManager::release_all(device, &mut self.pipelines, &mut self.scene)
            {
                engine_warn!("prism3d::renderer", "Cleanup after failed init also failed: {}", release_error);
            }
            return Err(e);
        }

        self.initialized = true;
        engine_info!(
            "prism3d::renderer",
            "Resources initialized ({} objects)",
            self.scene.len()
        );
        Ok(())
    }

    fn create_resources(&mut self, device: &mut dyn GraphicsDevice, surface: &dyn SurfaceProvider) -> Result<()> {
        let transfer = BufferTransferEngine::new(device);
        let buffers = transfer.upload_scene(device, &mut self.scene)?;
        engine_debug!("prism3d::renderer", "Uploaded {} buffer(s)", buffers);

        self.pipelines = self
            .pipeline_builder
            .build(device, surface.render_pass(), surface.sample_count())?;
        Ok(())
    }

    /// Swapchain (re)created: record the new extent
    pub fn init_swap_chain_resources(&mut self, surface: &dyn SurfaceProvider) {
        self.extent = surface.extent();
        self.frame_loop.reset();
        engine_info!(
            "prism3d::renderer",
            "Swapchain resources initialized ({}x{}, aspect {:.3})",
            self.extent.width, self.extent.height, self.aspect_ratio()
        );
    }

    /// Record and present one frame, then advance the animation
    pub fn start_next_frame(
        &mut self,
        surface: &mut dyn SurfaceProvider,
        view_projection: Mat4,
    ) -> Result<FrameStats> {
        if !self.initialized {
            engine_error!("prism3d::renderer", "Frame requested before init_resources");
            return Err(Error::InvalidState("renderer resources not initialized".to_string()));
        }

        let target = FrameTarget::from_surface(surface);
        let stats = self.frame_loop.record(
            surface.command_list(),
            &target,
            &self.pipelines,
            &self.scene,
            view_projection,
        )?;
        self.animate();
        self.frame_loop.present(surface)?;
        Ok(stats)
    }

    fn animate(&mut self) {
        if let Some(name) = &self.config.animated_object {
            if !self.scene.rotate_object(name, self.config.rotation_step_degrees, Vec3::Z) {
                engine_trace!("prism3d::renderer", "No object named '{}' to animate", name);
            }
        }
    }

    /// Swapchain about to be destroyed; the renderer holds nothing tied to it
    pub fn release_swap_chain_resources(&mut self) {
        self.frame_loop.reset();
        engine_debug!("prism3d::renderer", "Swapchain resources released");
    }

    /// Tear down every GPU object created by `init_resources`
    pub fn release_resources(&mut self, device: &mut dyn GraphicsDevice) -> Result<ReleaseReport> {
        let report = ResourceLifecycleManager::release_all(device, &mut self.pipelines, &mut self.scene)?;
        self.initialized = false;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
