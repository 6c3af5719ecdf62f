/// ResourceLifecycleManager - orderly teardown of every GPU object the
/// renderer created.
///
/// Order: wait for the device to go idle, destroy the pipelines, the pipeline
/// layout and the pipeline cache, then release the scene buffers.

use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::renderer::PipelineSet;
use crate::scene::Scene;
use crate::{engine_debug, engine_error, engine_info};

/// Number of objects destroyed by a release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub pipelines: usize,
    pub pipeline_layouts: usize,
    pub pipeline_caches: usize,
    /// Buffers, each counted once with its memory
    pub buffers: usize,
}

impl ReleaseReport {
    pub fn total(&self) -> usize {
        self.pipelines + self.pipeline_layouts + self.pipeline_caches + self.buffers
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Tears down renderer-owned GPU objects
pub struct ResourceLifecycleManager;

impl ResourceLifecycleManager {
    /// Release pipelines and scene buffers once the device is idle
    ///
    /// If the device cannot be idled nothing is destroyed and the error is
    /// returned. Already released objects are skipped, so calling this twice
    /// destroys nothing the second time.
    pub fn release_all(
        device: &mut dyn GraphicsDevice,
        pipelines: &mut PipelineSet,
        scene: &mut Scene,
    ) -> Result<ReleaseReport> {
        if let Err(e) = device.wait_idle() {
            engine_error!("prism3d::lifecycle", "Device did not become idle, skipping release: {}", e);
            return Err(e);
        }

        let mut report = pipelines.release(device);
        engine_debug!(
            "prism3d::lifecycle",
            "Destroyed {} pipeline(s), {} layout(s), {} cache(s)",
            report.pipelines, report.pipeline_layouts, report.pipeline_caches
        );

        report.buffers = scene.release_buffers(device);
        engine_debug!("prism3d::lifecycle", "Released {} buffer(s)", report.buffers);

        if !report.is_empty() {
            engine_info!("prism3d::lifecycle", "Released {} GPU object(s)", report.total());
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
