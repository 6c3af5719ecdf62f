/// Conversions between engine descriptors and Vulkan enums/flags
///
/// Pure functions, no device required.

use ash::vk;
use ash::vk::Handle;
use prism_3d_engine::prism3d::render::{
    BufferFormat, BufferUsageFlags, ClearValue, ColorWriteMask, CompareOp, CullMode, DynamicState,
    Extent2D, FrontFace, IndexType, MemoryPropertyFlags, MemoryType, PolygonMode,
    PrimitiveTopology, Rect2D, SampleCount, ShaderStage, VertexInputRate, Viewport,
};

// ===== HANDLES =====

/// Engine handle (raw u64) to a Vulkan handle
pub fn vk_handle<H: Handle>(raw: u64) -> H {
    H::from_raw(raw)
}

// ===== MEMORY & BUFFERS =====

pub fn memory_property_flags_to_vk(flags: MemoryPropertyFlags) -> vk::MemoryPropertyFlags {
    vk::MemoryPropertyFlags::from_raw(flags.bits())
}

/// Unknown Vulkan bits (e.g. LAZILY_ALLOCATED) are dropped
pub fn memory_property_flags_from_vk(flags: vk::MemoryPropertyFlags) -> MemoryPropertyFlags {
    MemoryPropertyFlags::from_bits_truncate(flags.as_raw())
}

pub fn buffer_usage_to_vk(usage: BufferUsageFlags) -> vk::BufferUsageFlags {
    vk::BufferUsageFlags::from_raw(usage.bits())
}

/// Memory types of a physical device, in Vulkan index order
pub fn memory_types_from_vk(properties: &vk::PhysicalDeviceMemoryProperties) -> Vec<MemoryType> {
    properties.memory_types[..properties.memory_type_count as usize]
        .iter()
        .map(|memory_type| {
            MemoryType::new(
                memory_property_flags_from_vk(memory_type.property_flags),
                memory_type.heap_index,
            )
        })
        .collect()
}

pub fn buffer_format_to_vk(format: BufferFormat) -> vk::Format {
    match format {
        BufferFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        BufferFormat::R32G32_SFLOAT => vk::Format::R32G32_SFLOAT,
        BufferFormat::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
        BufferFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        BufferFormat::R32_UINT => vk::Format::R32_UINT,
    }
}

pub fn index_type_to_vk(index_type: IndexType) -> vk::IndexType {
    match index_type {
        IndexType::U16 => vk::IndexType::UINT16,
        IndexType::U32 => vk::IndexType::UINT32,
    }
}

// ===== SHADERS =====

pub fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
    }
}

pub fn shader_stages_to_vk(stages: &[ShaderStage]) -> vk::ShaderStageFlags {
    stages
        .iter()
        .fold(vk::ShaderStageFlags::empty(), |flags, stage| flags | shader_stage_to_vk(*stage))
}

// ===== FIXED-FUNCTION STATE =====

pub fn input_rate_to_vk(rate: VertexInputRate) -> vk::VertexInputRate {
    match rate {
        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
    }
}

pub fn topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
    }
}

pub fn cull_mode_to_vk(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn front_face_to_vk(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub fn polygon_mode_to_vk(mode: PolygonMode) -> vk::PolygonMode {
    match mode {
        PolygonMode::Fill => vk::PolygonMode::FILL,
        PolygonMode::Line => vk::PolygonMode::LINE,
        PolygonMode::Point => vk::PolygonMode::POINT,
    }
}

pub fn compare_op_to_vk(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::Equal => vk::CompareOp::EQUAL,
        CompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareOp::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn color_write_mask_to_vk(mask: ColorWriteMask) -> vk::ColorComponentFlags {
    let mut flags = vk::ColorComponentFlags::empty();
    if mask.r { flags |= vk::ColorComponentFlags::R; }
    if mask.g { flags |= vk::ColorComponentFlags::G; }
    if mask.b { flags |= vk::ColorComponentFlags::B; }
    if mask.a { flags |= vk::ColorComponentFlags::A; }
    flags
}

pub fn sample_count_to_vk(count: SampleCount) -> vk::SampleCountFlags {
    match count {
        SampleCount::S1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::S2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::S4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::S8 => vk::SampleCountFlags::TYPE_8,
        SampleCount::S16 => vk::SampleCountFlags::TYPE_16,
    }
}

/// Framebuffer sample counts as the engine's count mask (bit N set = N samples)
pub fn sample_count_mask_from_vk(flags: vk::SampleCountFlags) -> u32 {
    // TYPE_N has value N, so the raw bits already form the mask
    flags.as_raw()
}

pub fn dynamic_state_to_vk(state: DynamicState) -> vk::DynamicState {
    match state {
        DynamicState::Viewport => vk::DynamicState::VIEWPORT,
        DynamicState::Scissor => vk::DynamicState::SCISSOR,
    }
}

// ===== RECORDING =====

pub fn extent_to_vk(extent: Extent2D) -> vk::Extent2D {
    vk::Extent2D { width: extent.width, height: extent.height }
}

pub fn viewport_to_vk(viewport: Viewport) -> vk::Viewport {
    vk::Viewport {
        x: viewport.x,
        y: viewport.y,
        width: viewport.width,
        height: viewport.height,
        min_depth: viewport.min_depth,
        max_depth: viewport.max_depth,
    }
}

pub fn rect_to_vk(rect: Rect2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: rect.x, y: rect.y },
        extent: vk::Extent2D { width: rect.width, height: rect.height },
    }
}

pub fn clear_value_to_vk(value: ClearValue) -> vk::ClearValue {
    match value {
        ClearValue::Color(color) => vk::ClearValue {
            color: vk::ClearColorValue { float32: color },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
        },
    }
}

/// `(major, minor, patch)` of a packed Vulkan version
pub fn version_triplet(version: u32) -> (u32, u32, u32) {
    (
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version),
    )
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
