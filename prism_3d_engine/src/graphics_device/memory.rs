/// Memory type selection
///
/// Physical devices expose a list of memory types, each with a set of property
/// flags. A resource reports which of those types it can live in as a bitmask
/// (`memory_type_bits`); the selector picks the first compatible type that has
/// every required property.

use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::engine_error;

bitflags! {
    /// Memory property flags (bit values match Vulkan's `VkMemoryPropertyFlagBits`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryPropertyFlags: u32 {
        /// Fastest memory for device access
        const DEVICE_LOCAL = 0x1;
        /// Can be mapped for host access
        const HOST_VISIBLE = 0x2;
        /// Host writes are visible without explicit flushes
        const HOST_COHERENT = 0x4;
        /// Host reads are cached
        const HOST_CACHED = 0x8;
    }
}

/// One memory type of the physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    /// Properties of this memory type
    pub property_flags: MemoryPropertyFlags,
    /// Heap this type allocates from
    pub heap_index: u32,
}

impl MemoryType {
    pub fn new(property_flags: MemoryPropertyFlags, heap_index: u32) -> Self {
        Self { property_flags, heap_index }
    }
}

/// Memory requirements of a GPU resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRequirements {
    /// Allocation size in bytes (may exceed the requested buffer size)
    pub size: u64,
    /// Required alignment of the allocation
    pub alignment: u64,
    /// Bit `i` set means memory type `i` is allowed
    pub memory_type_bits: u32,
}

/// Find the lowest memory type index allowed by `type_filter` whose flags
/// contain all of `required`
///
/// # Errors
///
/// `Error::NoSuitableMemoryType` when no type matches. The failure is logged
/// with file:line because GPU initialization cannot continue without it.
pub fn find_memory_type(
    memory_types: &[MemoryType],
    type_filter: u32,
    required: MemoryPropertyFlags,
) -> Result<u32> {
    for (index, memory_type) in memory_types.iter().enumerate().take(32) {
        let allowed = type_filter & (1u32 << index) != 0;
        if allowed && memory_type.property_flags.contains(required) {
            return Ok(index as u32);
        }
    }

    engine_error!(
        "prism3d::memory",
        "No memory type matches filter {:#b} with properties {:?} ({} types available)",
        type_filter, required, memory_types.len()
    );
    Err(Error::NoSuitableMemoryType { type_filter, required })
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
