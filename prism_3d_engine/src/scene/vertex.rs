/// Vertex - the interleaved vertex format shared by every drawable object.

use std::mem::{offset_of, size_of};
use bytemuck::{Pod, Zeroable};
use crate::graphics_device::{BufferFormat, VertexAttribute, VertexBinding, VertexInputRate, VertexLayout};

/// Interleaved vertex: position, color (or normal), texture coordinate.
///
/// `#[repr(C)]` with no padding: 32 bytes, uploaded byte-for-byte.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// RGB color, or normal for lit meshes
    pub color: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex with a zero texture coordinate
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color, uv: [0.0, 0.0] }
    }

    /// Vertex with a texture coordinate
    pub const fn with_uv(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, color, uv }
    }

    /// Size of one vertex in bytes
    pub const STRIDE: u32 = size_of::<Vertex>() as u32;

    /// Vertex input layout consumed by the shaders: one per-vertex binding,
    /// position at location 0 and color at location 1.
    pub fn layout() -> VertexLayout {
        VertexLayout {
            bindings: vec![VertexBinding {
                binding: 0,
                stride: Self::STRIDE,
                input_rate: VertexInputRate::Vertex,
            }],
            attributes: vec![
                VertexAttribute {
                    location: 0,
                    binding: 0,
                    format: BufferFormat::R32G32B32_SFLOAT,
                    offset: offset_of!(Vertex, position) as u32,
                },
                VertexAttribute {
                    location: 1,
                    binding: 0,
                    format: BufferFormat::R32G32B32_SFLOAT,
                    offset: offset_of!(Vertex, color) as u32,
                },
            ],
        }
    }
}

#[cfg(test)]
#[path = "vertex_tests.rs"]
mod tests;
