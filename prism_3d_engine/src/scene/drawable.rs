/// DrawableObject - geometry, transform and GPU buffer slots of one scene object.

use glam::{Mat4, Vec3};
use crate::graphics_device::{GpuBuffer, GraphicsDevice};
use super::vertex::Vertex;

/// Tag given to objects that do not set one
pub const DEFAULT_TAG: &str = "actor";

/// How an object is rasterized; selects the pipeline variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawStyle {
    /// Filled triangles (tag 0)
    #[default]
    Fill,
    /// Thick lines (tag 1)
    Line,
}

impl DrawStyle {
    /// Style from its numeric tag (0 = fill, 1 = line)
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(DrawStyle::Fill),
            1 => Some(DrawStyle::Line),
            _ => None,
        }
    }

    /// Numeric tag of the style
    pub fn tag(&self) -> u32 {
        match self {
            DrawStyle::Fill => 0,
            DrawStyle::Line => 1,
        }
    }
}

/// A drawable scene object.
///
/// Geometry is immutable once uploaded. The GPU buffers are attached by the
/// transfer engine and released by the lifecycle manager; non-empty indices
/// require an index buffer before the object can be drawn.
#[derive(Debug)]
pub struct DrawableObject {
    name: String,
    tag: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    transform: Mat4,
    draw_style: DrawStyle,
    vertex_buffer: Option<GpuBuffer>,
    index_buffer: Option<GpuBuffer>,
}

impl DrawableObject {
    /// Non-indexed object
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, draw_style: DrawStyle) -> Self {
        Self::with_indices(name, vertices, Vec::new(), draw_style)
    }

    /// Indexed object (empty `indices` falls back to non-indexed drawing)
    pub fn with_indices(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        draw_style: DrawStyle,
    ) -> Self {
        Self {
            name: name.into(),
            tag: DEFAULT_TAG.to_string(),
            vertices,
            indices,
            transform: Mat4::IDENTITY,
            draw_style,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// True when the object is drawn with `draw_indexed`
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn draw_style(&self) -> DrawStyle {
        self.draw_style
    }

    pub fn set_draw_style(&mut self, draw_style: DrawStyle) {
        self.draw_style = draw_style;
    }

    /// Model matrix
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    // ===== TRANSFORM HELPERS =====
    // Each helper post-multiplies the current matrix, so the new operation
    // applies in the object's local frame.

    pub fn translate(&mut self, offset: Vec3) {
        self.transform *= Mat4::from_translation(offset);
    }

    pub fn scale(&mut self, factor: f32) {
        self.transform *= Mat4::from_scale(Vec3::splat(factor));
    }

    /// Rotate by `degrees` around `axis` (normalized internally)
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.transform *= Mat4::from_axis_angle(axis, degrees.to_radians());
    }

    /// Overwrite the translation column
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.w_axis = position.extend(1.0);
    }

    /// Translation column of the model matrix
    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    // ===== GPU BUFFERS =====

    pub fn vertex_buffer(&self) -> Option<&GpuBuffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&GpuBuffer> {
        self.index_buffer.as_ref()
    }

    /// Move an uploaded vertex buffer into the object, returning the previous one
    pub fn attach_vertex_buffer(&mut self, buffer: GpuBuffer) -> Option<GpuBuffer> {
        self.vertex_buffer.replace(buffer)
    }

    /// Move an uploaded index buffer into the object, returning the previous one
    pub fn attach_index_buffer(&mut self, buffer: GpuBuffer) -> Option<GpuBuffer> {
        self.index_buffer.replace(buffer)
    }

    /// Release the index buffer, then the vertex buffer
    ///
    /// Each buffer is released through its own handles. Returns the number of
    /// buffers that were still live.
    pub fn release_buffers(&mut self, device: &mut dyn GraphicsDevice) -> usize {
        let mut released = 0;
        for slot in [&mut self.index_buffer, &mut self.vertex_buffer] {
            if let Some(mut buffer) = slot.take() {
                if buffer.is_valid() {
                    released += 1;
                }
                buffer.release(device);
            }
        }
        released
    }
}

#[cfg(test)]
#[path = "drawable_tests.rs"]
mod tests;
