/// GPU buffers: usage flags, vertex formats, size alignment and the owned
/// buffer + memory pair

use bitflags::bitflags;
use crate::graphics_device::{BufferHandle, MemoryHandle, GraphicsDevice};

bitflags! {
    /// Buffer usage flags (bit values match Vulkan's `VkBufferUsageFlagBits`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsageFlags: u32 {
        /// Source of a transfer (staging buffers)
        const TRANSFER_SRC = 0x1;
        /// Destination of a transfer (device-local buffers, readback buffers)
        const TRANSFER_DST = 0x2;
        /// Uniform buffer
        const UNIFORM = 0x10;
        /// Storage buffer
        const STORAGE = 0x20;
        /// Index buffer
        const INDEX = 0x40;
        /// Vertex buffer
        const VERTEX = 0x80;
    }
}

/// Buffer data format for vertex attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    R32_SFLOAT,          // float (4 bytes)
    R32G32_SFLOAT,       // vec2 (8 bytes)
    R32G32B32_SFLOAT,    // vec3 (12 bytes)
    R32G32B32A32_SFLOAT, // vec4 (16 bytes)
    R32_UINT,
}

impl BufferFormat {
    /// Returns size in bytes for this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT | BufferFormat::R32_UINT => 4,
            BufferFormat::R32G32_SFLOAT => 8,
            BufferFormat::R32G32B32_SFLOAT => 12,
            BufferFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}

/// Round `size` up to the next multiple of `alignment`
///
/// `alignment` must be a power of two; 0 is treated as 1. `None` when the
/// rounded size does not fit in a `u64`.
pub fn align_size(size: u64, alignment: u64) -> Option<u64> {
    if alignment <= 1 {
        return Some(size);
    }
    size.checked_add(alignment - 1).map(|padded| padded & !(alignment - 1))
}

/// GPU buffer and its backing memory, created and destroyed as a pair
///
/// A `GpuBuffer` is owned by exactly one place (a drawable object, a staging
/// transfer) and is never cloned. GPU objects are not freed on drop: the owner
/// calls [`GpuBuffer::release`] once the device no longer uses the buffer.
#[derive(Debug, Default)]
pub struct GpuBuffer {
    buffer: BufferHandle,
    memory: MemoryHandle,
    size: u64,
}

impl GpuBuffer {
    /// Wrap a bound buffer/memory pair of `size` bytes
    pub fn new(buffer: BufferHandle, memory: MemoryHandle, size: u64) -> Self {
        Self { buffer, memory, size }
    }

    /// Buffer handle
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Memory handle
    pub fn memory(&self) -> MemoryHandle {
        self.memory
    }

    /// Allocated (aligned) size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// True while both handles are live
    pub fn is_valid(&self) -> bool {
        !self.buffer.is_null() && !self.memory.is_null()
    }

    /// Destroy the buffer, then free its memory, and null both handles
    ///
    /// Releasing an already released buffer does nothing.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if !self.buffer.is_null() {
            device.destroy_buffer(self.buffer);
            self.buffer = BufferHandle::NULL;
        }
        if !self.memory.is_null() {
            device.free_memory(self.memory);
            self.memory = MemoryHandle::NULL;
        }
        self.size = 0;
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
