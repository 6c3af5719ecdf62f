/// Shader stages and SPIR-V helpers

use crate::graphics_device::ShaderModuleHandle;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment/Pixel shader
    Fragment,
}

/// One programmable stage of a graphics pipeline
#[derive(Debug, Clone)]
pub struct ShaderStageDesc {
    /// Shader stage
    pub stage: ShaderStage,
    /// Compiled module
    pub module: ShaderModuleHandle,
    /// Entry point function name
    pub entry_point: String,
}

/// Reinterpret a SPIR-V blob as 32-bit words
///
/// Returns `None` when the blob is empty or its length is not a multiple of 4.
/// SPIR-V is little-endian on every platform we target.
pub fn spirv_words(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return None;
    }
    let words: Vec<u32> = bytemuck::pod_collect_to_vec(bytes);
    Some(words.into_iter().map(u32::from_le).collect())
}
