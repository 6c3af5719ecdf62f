/// Pipeline descriptors: vertex input, fixed-function state and layouts

use crate::graphics_device::{
    BufferFormat, ShaderStage, ShaderStageDesc, PipelineLayoutHandle, RenderPassHandle,
};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
    /// Line list
    LineList,
    /// Point list
    PointList,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices (max 65535 vertices)
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Vertex input rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    /// Data is per-vertex
    Vertex,
    /// Data is per-instance
    Instance,
}

/// Vertex attribute description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute location in shader
    pub location: u32,
    /// Binding index
    pub binding: u32,
    /// Format of the attribute
    pub format: BufferFormat,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
}

/// Vertex binding description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    /// Binding index
    pub binding: u32,
    /// Stride in bytes between consecutive elements
    pub stride: u32,
    /// Input rate (per-vertex or per-instance)
    pub input_rate: VertexInputRate,
}

/// Vertex input layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    /// Vertex bindings
    pub bindings: Vec<VertexBinding>,
    /// Vertex attributes
    pub attributes: Vec<VertexAttribute>,
}

/// Push constant range descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConstantRange {
    /// Shader stages that can access these push constants
    pub stages: Vec<ShaderStage>,
    /// Offset in bytes
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

/// Descriptor for creating a pipeline layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineLayoutDesc {
    /// Push constant ranges
    pub push_constant_ranges: Vec<PushConstantRange>,
}

// ===== RASTERIZATION =====

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise vertices define front face
    CounterClockwise,
    /// Clockwise vertices define front face
    Clockwise,
}

/// Polygon rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    /// Fill polygons
    Fill,
    /// Draw edges only (wireframe)
    Line,
    /// Draw vertices only
    Point,
}

/// Rasterization fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationState {
    /// Face culling mode
    pub cull_mode: CullMode,
    /// Front face winding order
    pub front_face: FrontFace,
    /// Polygon rendering mode
    pub polygon_mode: PolygonMode,
    /// Rasterized line width
    pub line_width: f32,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            line_width: 1.0,
        }
    }
}

// ===== DEPTH/STENCIL =====

/// Comparison operator for depth tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Depth and stencil testing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    /// Enable depth testing
    pub depth_test_enable: bool,
    /// Enable writing to depth buffer
    pub depth_write_enable: bool,
    /// Depth comparison operator
    pub depth_compare_op: CompareOp,
    /// Enable stencil testing
    pub stencil_test_enable: bool,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::Less,
            stencil_test_enable: false,
        }
    }
}

// ===== COLOR BLEND =====

/// Color write mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWriteMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorWriteMask {
    /// All channels enabled
    pub const ALL: Self = Self { r: true, g: true, b: true, a: true };
    /// No channels enabled
    pub const NONE: Self = Self { r: false, g: false, b: false, a: false };
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Color blending state (single color attachment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorBlendState {
    /// Enable blending
    pub blend_enable: bool,
    /// Color write mask
    pub color_write_mask: ColorWriteMask,
}

// ===== MULTISAMPLE =====

/// Multisample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SampleCount {
    S1,
    S2,
    S4,
    S8,
    S16,
}

impl SampleCount {
    /// Number of samples per pixel
    pub fn count(&self) -> u32 {
        match self {
            SampleCount::S1 => 1,
            SampleCount::S2 => 2,
            SampleCount::S4 => 4,
            SampleCount::S8 => 8,
            SampleCount::S16 => 16,
        }
    }

    /// Sample count from a number of samples (None if unsupported)
    pub fn from_count(count: u32) -> Option<Self> {
        match count {
            1 => Some(SampleCount::S1),
            2 => Some(SampleCount::S2),
            4 => Some(SampleCount::S4),
            8 => Some(SampleCount::S8),
            16 => Some(SampleCount::S16),
            _ => None,
        }
    }

    /// True when more than one sample per pixel is rendered
    pub fn is_multisampled(&self) -> bool {
        *self != SampleCount::S1
    }
}

/// Multisampling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultisampleState {
    /// Number of samples per pixel
    pub sample_count: SampleCount,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self { sample_count: SampleCount::S1 }
    }
}

/// Pipeline state set while recording instead of at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicState {
    Viewport,
    Scissor,
}

// ===== PIPELINE DESCRIPTOR =====

/// Descriptor for creating a graphics pipeline
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDesc {
    /// Programmable stages
    pub stages: Vec<ShaderStageDesc>,
    /// Vertex input layout
    pub vertex_layout: VertexLayout,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Rasterization state
    pub rasterization: RasterizationState,
    /// Depth and stencil testing state
    pub depth_stencil: DepthStencilState,
    /// Color blending state
    pub color_blend: ColorBlendState,
    /// Multisampling state
    pub multisample: MultisampleState,
    /// Dynamic states
    pub dynamic_states: Vec<DynamicState>,
    /// Pipeline layout
    pub layout: PipelineLayoutHandle,
    /// Render pass the pipeline is compatible with
    pub render_pass: RenderPassHandle,
    /// Subpass index
    pub subpass: u32,
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
