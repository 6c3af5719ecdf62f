/// PipelineStateBuilder - pipeline cache, layout and one pipeline per draw style.
///
/// The variants differ only by topology, polygon mode and line width; everything
/// else (shaders, vertex layout, push constants, depth and blend state) is
/// shared, so each variant is a row of [`PIPELINE_VARIANTS`] fed to a single
/// build function.

use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::graphics_device::{
    spirv_words, ColorBlendState, ColorWriteMask, CompareOp, CullMode, DepthStencilState,
    DynamicState, FrontFace, GraphicsDevice, GraphicsPipelineDesc, MultisampleState,
    PipelineCacheHandle, PipelineHandle, PipelineLayoutDesc, PipelineLayoutHandle, PolygonMode,
    PrimitiveTopology, PushConstantRange, RasterizationState, RenderPassHandle, SampleCount,
    ShaderModuleHandle, ShaderStage, ShaderStageDesc,
};
use crate::renderer::{RendererConfig, ReleaseReport};
use crate::scene::{DrawStyle, Vertex};
use crate::{engine_debug, engine_error, engine_info, engine_warn};

/// Size of the push constant block (one column-major 4x4 f32 matrix)
pub const PUSH_CONSTANT_SIZE: u32 = 64;

/// Shader entry point of both stages
pub const SHADER_ENTRY_POINT: &str = "main";

/// Per-style pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineVariant {
    pub style: DrawStyle,
    pub topology: PrimitiveTopology,
    pub polygon_mode: PolygonMode,
    pub line_width: f32,
}

/// One row per draw style
pub const PIPELINE_VARIANTS: [PipelineVariant; 2] = [
    PipelineVariant {
        style: DrawStyle::Fill,
        topology: PrimitiveTopology::TriangleList,
        polygon_mode: PolygonMode::Fill,
        line_width: 1.0,
    },
    PipelineVariant {
        style: DrawStyle::Line,
        topology: PrimitiveTopology::LineList,
        polygon_mode: PolygonMode::Fill,
        line_width: 5.0,
    },
];

/// Row of the variant table for `style`
pub fn variant_for(style: DrawStyle) -> &'static PipelineVariant {
    match style {
        DrawStyle::Fill => &PIPELINE_VARIANTS[0],
        DrawStyle::Line => &PIPELINE_VARIANTS[1],
    }
}

/// Pipeline layout shared by every variant: the model-view-projection matrix
/// pushed to the vertex stage
pub fn pipeline_layout_desc() -> PipelineLayoutDesc {
    PipelineLayoutDesc {
        push_constant_ranges: vec![PushConstantRange {
            stages: vec![ShaderStage::Vertex],
            offset: 0,
            size: PUSH_CONSTANT_SIZE,
        }],
    }
}

/// Pipeline objects built once at setup and destroyed once at teardown
#[derive(Debug, Default)]
pub struct PipelineSet {
    cache: PipelineCacheHandle,
    layout: PipelineLayoutHandle,
    fill: PipelineHandle,
    line: PipelineHandle,
}

impl PipelineSet {
    /// Pipeline for a draw style
    pub fn select(&self, style: DrawStyle) -> PipelineHandle {
        match style {
            DrawStyle::Fill => self.fill,
            DrawStyle::Line => self.line,
        }
    }

    pub fn layout(&self) -> PipelineLayoutHandle {
        self.layout
    }

    pub fn cache(&self) -> PipelineCacheHandle {
        self.cache
    }

    /// True once every object has been built
    pub fn is_complete(&self) -> bool {
        !self.cache.is_null() && !self.layout.is_null() && !self.fill.is_null() && !self.line.is_null()
    }

    fn assign(&mut self, style: DrawStyle, pipeline: PipelineHandle) {
        match style {
            DrawStyle::Fill => self.fill = pipeline,
            DrawStyle::Line => self.line = pipeline,
        }
    }

    /// Destroy the pipelines, then the layout, then the cache
    ///
    /// Null handles are skipped, so releasing twice does nothing the second time.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) -> ReleaseReport {
        let mut report = ReleaseReport::default();

        for pipeline in [&mut self.fill, &mut self.line] {
            if !pipeline.is_null() {
                device.destroy_pipeline(*pipeline);
                *pipeline = PipelineHandle::NULL;
                report.pipelines += 1;
            }
        }
        if !self.layout.is_null() {
            device.destroy_pipeline_layout(self.layout);
            self.layout = PipelineLayoutHandle::NULL;
            report.pipeline_layouts += 1;
        }
        if !self.cache.is_null() {
            device.destroy_pipeline_cache(self.cache);
            self.cache = PipelineCacheHandle::NULL;
            report.pipeline_caches += 1;
        }
        report
    }
}

/// Read a SPIR-V file as 32-bit words
///
/// A missing or unreadable file, or a blob whose size is not a multiple of 4,
/// is logged as a warning and yields `None`.
pub fn load_shader_code(path: &Path) -> Option<Vec<u32>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            engine_warn!("prism3d::pipeline", "Failed to open shader file {}: {}", path.display(), e);
            return None;
        }
    };
    match spirv_words(&bytes) {
        Some(words) => Some(words),
        None => {
            engine_warn!(
                "prism3d::pipeline",
                "Shader file {} is not valid SPIR-V ({} bytes)",
                path.display(), bytes.len()
            );
            None
        }
    }
}

/// Load a SPIR-V file and create a shader module from it
///
/// Returns `None` when the file cannot be used or the device rejects the module.
pub fn load_shader_module(device: &mut dyn GraphicsDevice, path: &Path) -> Option<ShaderModuleHandle> {
    let words = load_shader_code(path)?;
    match device.create_shader_module(&words) {
        Ok(module) => Some(module),
        Err(e) => {
            engine_warn!("prism3d::pipeline", "Shader module from {} rejected: {}", path.display(), e);
            None
        }
    }
}

/// Builds the [`PipelineSet`] for a render pass and sample count
#[derive(Debug, Clone)]
pub struct PipelineStateBuilder {
    vertex_shader_path: PathBuf,
    fragment_shader_path: PathBuf,
}

impl PipelineStateBuilder {
    pub fn new(vertex_shader_path: impl Into<PathBuf>, fragment_shader_path: impl Into<PathBuf>) -> Self {
        Self {
            vertex_shader_path: vertex_shader_path.into(),
            fragment_shader_path: fragment_shader_path.into(),
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.vertex_shader_path.clone(), config.fragment_shader_path.clone())
    }

    /// Load both shaders and build every variant
    ///
    /// A shader that cannot be loaded fails the build with
    /// `Error::InitializationFailed`.
    pub fn build(
        &self,
        device: &mut dyn GraphicsDevice,
        render_pass: RenderPassHandle,
        sample_count: SampleCount,
    ) -> Result<PipelineSet> {
        let vertex = load_shader_module(device, &self.vertex_shader_path);
        let fragment = load_shader_module(device, &self.fragment_shader_path);
        let result = match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => {
                Self::build_with_modules(device, vertex, fragment, render_pass, sample_count)
            }
            _ => {
                engine_error!(
                    "prism3d::pipeline",
                    "Cannot build pipelines without shaders ({}, {})",
                    self.vertex_shader_path.display(), self.fragment_shader_path.display()
                );
                Err(Error::InitializationFailed("shader modules could not be loaded".to_string()))
            }
        };
        Self::destroy_modules(device, vertex, fragment);
        result
    }

    /// Build every variant from SPIR-V words already in memory
    pub fn build_from_spirv(
        device: &mut dyn GraphicsDevice,
        vertex_code: &[u32],
        fragment_code: &[u32],
        render_pass: RenderPassHandle,
        sample_count: SampleCount,
    ) -> Result<PipelineSet> {
        let vertex = device.create_shader_module(vertex_code)?;
        let fragment = match device.create_shader_module(fragment_code) {
            Ok(module) => module,
            Err(e) => {
                device.destroy_shader_module(vertex);
                return Err(e);
            }
        };
        let result = Self::build_with_modules(device, vertex, fragment, render_pass, sample_count);
        Self::destroy_modules(device, Some(vertex), Some(fragment));
        result
    }

    fn destroy_modules(
        device: &mut dyn GraphicsDevice,
        vertex: Option<ShaderModuleHandle>,
        fragment: Option<ShaderModuleHandle>,
    ) {
        for module in [vertex, fragment].into_iter().flatten() {
            device.destroy_shader_module(module);
        }
    }

    /// Cache, layout and variants; objects built before a failure are destroyed
    fn build_with_modules(
        device: &mut dyn GraphicsDevice,
        vertex: ShaderModuleHandle,
        fragment: ShaderModuleHandle,
        render_pass: RenderPassHandle,
        sample_count: SampleCount,
    ) -> Result<PipelineSet> {
        let mut set = PipelineSet::default();
        let result = Self::build_objects(device, &mut set, vertex, fragment, render_pass, sample_count);

        match result {
            Ok(()) => {
                engine_info!(
                    "prism3d::pipeline",
                    "Built {} pipeline variants ({} samples)",
                    PIPELINE_VARIANTS.len(), sample_count.count()
                );
                Ok(set)
            }
            Err(e) => {
                set.release(device);
                Err(e)
            }
        }
    }

    fn build_objects(
        device: &mut dyn GraphicsDevice,
        set: &mut PipelineSet,
        vertex: ShaderModuleHandle,
        fragment: ShaderModuleHandle,
        render_pass: RenderPassHandle,
        sample_count: SampleCount,
    ) -> Result<()> {
        set.cache = device.create_pipeline_cache()?;
        set.layout = device.create_pipeline_layout(&pipeline_layout_desc())?;

        let stages = [(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)];
        for variant in &PIPELINE_VARIANTS {
            let desc = Self::variant_desc(variant, &stages, set.layout, render_pass, sample_count);
            let pipeline = device.create_graphics_pipeline(set.cache, &desc)?;
            engine_debug!("prism3d::pipeline", "Built {:?} pipeline {:?}", variant.style, pipeline);
            set.assign(variant.style, pipeline);
        }
        Ok(())
    }

    /// Full pipeline description of one variant
    pub fn variant_desc(
        variant: &PipelineVariant,
        stages: &[(ShaderStage, ShaderModuleHandle)],
        layout: PipelineLayoutHandle,
        render_pass: RenderPassHandle,
        sample_count: SampleCount,
    ) -> GraphicsPipelineDesc {
        GraphicsPipelineDesc {
            stages: stages
                .iter()
                .map(|&(stage, module)| ShaderStageDesc {
                    stage,
                    module,
                    entry_point: SHADER_ENTRY_POINT.to_string(),
                })
                .collect(),
            vertex_layout: Vertex::layout(),
            topology: variant.topology,
            rasterization: RasterizationState {
                cull_mode: CullMode::None,
                front_face: FrontFace::CounterClockwise,
                polygon_mode: variant.polygon_mode,
                line_width: variant.line_width,
            },
            depth_stencil: DepthStencilState {
                depth_test_enable: true,
                depth_write_enable: true,
                depth_compare_op: CompareOp::LessOrEqual,
                stencil_test_enable: false,
            },
            color_blend: ColorBlendState {
                blend_enable: false,
                color_write_mask: ColorWriteMask::ALL,
            },
            multisample: MultisampleState { sample_count },
            dynamic_states: vec![DynamicState::Viewport, DynamicState::Scissor],
            layout,
            render_pass,
            subpass: 0,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_builder_tests.rs"]
mod tests;
