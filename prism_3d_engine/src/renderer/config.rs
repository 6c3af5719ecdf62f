/// Renderer configuration

use std::path::PathBuf;
use crate::graphics_device::SampleCount;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Precompiled SPIR-V vertex shader
    pub vertex_shader_path: PathBuf,
    /// Precompiled SPIR-V fragment shader
    pub fragment_shader_path: PathBuf,
    /// Color attachment clear value (RGBA)
    pub clear_color: [f32; 4],
    /// Ask the presentation layer for multisampling
    pub request_msaa: bool,
    /// Object rotated every frame (None disables the animation)
    pub animated_object: Option<String>,
    /// Rotation applied to the animated object each frame, about +Z
    pub rotation_step_degrees: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Prism3D Application".to_string(),
            app_version: (1, 0, 0),
            vertex_shader_path: PathBuf::from("shaders/color.vert.spv"),
            fragment_shader_path: PathBuf::from("shaders/color.frag.spv"),
            clear_color: [0.3, 0.3, 0.3, 1.0],
            request_msaa: false,
            animated_object: Some("quad".to_string()),
            rotation_step_degrees: 1.0,
        }
    }
}

/// Pick the sample count the presentation layer should use
///
/// With `request_msaa`, the largest of 16, 8 and 4 found in `supported`
/// (sample counts as plain numbers) wins; otherwise, or when none of them is
/// supported, rendering is single-sampled.
pub fn choose_sample_count(supported: &[u32], request_msaa: bool) -> SampleCount {
    if !request_msaa {
        return SampleCount::S1;
    }
    [SampleCount::S16, SampleCount::S8, SampleCount::S4]
        .into_iter()
        .find(|candidate| supported.contains(&candidate.count()))
        .unwrap_or(SampleCount::S1)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
