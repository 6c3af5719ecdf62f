//! Error types for the Prism3D engine
//!
//! Every GPU-side failure in this engine is non-transient: errors are raised,
//! logged once at the point of failure, and propagated up to the application,
//! which aborts initialization or stops the frame loop.

use std::fmt;

use crate::graphics_device::MemoryPropertyFlags;

/// Result type for Prism3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan call failed, device lost, ...)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (null handle, missing buffer, bad shader blob, ...)
    InvalidResource(String),

    /// Initialization failed (shader load, pipeline build, device creation)
    InitializationFailed(String),

    /// No physical-memory type matches the requested filter and properties
    NoSuitableMemoryType {
        /// Bitmask of memory type indices allowed by the resource
        type_filter: u32,
        /// Properties every candidate type must have
        required: MemoryPropertyFlags,
    },

    /// Operation called in the wrong frame or lifecycle state
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NoSuitableMemoryType { type_filter, required } => write!(
                f,
                "No suitable memory type (filter: {:#b}, required: {:?})",
                type_filter, required
            ),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
