/// GraphicsDevice trait - explicit GPU device capabilities used by the core

use crate::error::Result;
use crate::graphics_device::{
    BufferHandle, BufferUsageFlags, CommandBufferHandle, GraphicsPipelineDesc, MemoryHandle,
    MemoryRequirements, MemoryType, PipelineCacheHandle, PipelineHandle, PipelineLayoutDesc,
    PipelineLayoutHandle, ShaderModuleHandle,
};

/// Device limits relevant to buffer uploads and pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum push constant block size in bytes
    pub max_push_constants_size: u32,
    /// Alignment applied to every upload size
    pub min_buffer_offset_alignment: u64,
    /// Framebuffer sample counts, as a mask where each set bit equals the count
    pub supported_sample_counts: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_push_constants_size: 128,
            min_buffer_offset_alignment: 64,
            supported_sample_counts: 0b1,
        }
    }
}

/// Static information about the active physical device
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    /// Number of physical devices visible to the instance
    pub physical_device_count: u32,
    /// Device name reported by the driver
    pub device_name: String,
    /// Driver version (major, minor, patch)
    pub driver_version: (u32, u32, u32),
    /// Supported API version (major, minor, patch)
    pub api_version: (u32, u32, u32),
    /// Memory types, indexed as in `MemoryRequirements::memory_type_bits`
    pub memory_types: Vec<MemoryType>,
    /// Device limits
    pub limits: DeviceLimits,
}

impl DeviceInfo {
    /// Sample counts supported by the framebuffer, ascending
    pub fn supported_sample_counts(&self) -> Vec<u32> {
        [1u32, 2, 4, 8, 16, 32, 64]
            .into_iter()
            .filter(|count| self.limits.supported_sample_counts & count != 0)
            .collect()
    }

    /// Human-readable hardware report, one line per entry
    pub fn report(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(6 + self.memory_types.len());
        lines.push(format!("Number of physical devices: {}", self.physical_device_count));
        lines.push(format!(
            "Active physical device name: '{}' version {}.{}.{}",
            self.device_name, self.driver_version.0, self.driver_version.1, self.driver_version.2
        ));
        lines.push(format!(
            "API version {}.{}.{}",
            self.api_version.0, self.api_version.1, self.api_version.2
        ));

        let counts: Vec<String> = self
            .supported_sample_counts()
            .iter()
            .map(|count| count.to_string())
            .collect();
        lines.push(format!("Supported sample counts: {}", counts.join(" ")));
        lines.push(format!("Maximum push constants size: {}", self.limits.max_push_constants_size));
        lines.push(format!(
            "Minimum buffer offset alignment: {}",
            self.limits.min_buffer_offset_alignment
        ));

        for (index, memory_type) in self.memory_types.iter().enumerate() {
            lines.push(format!(
                "Memory type {}: heap {} {:?}",
                index, memory_type.heap_index, memory_type.property_flags
            ));
        }
        lines
    }
}

/// GPU device used to create, fill and destroy resources
///
/// Every component receives the device explicitly as `&mut dyn GraphicsDevice`;
/// there is no global device. Destroy/free calls accept null handles and do
/// nothing for them.
pub trait GraphicsDevice {
    /// Static device information
    fn info(&self) -> &DeviceInfo;

    /// Device limits
    fn limits(&self) -> DeviceLimits {
        self.info().limits
    }

    /// Memory types of the physical device
    fn memory_types(&self) -> &[MemoryType] {
        &self.info().memory_types
    }

    // ===== BUFFERS & MEMORY =====

    /// Create an unbound buffer of `size` bytes
    fn create_buffer(&mut self, size: u64, usage: BufferUsageFlags) -> Result<BufferHandle>;

    /// Memory requirements of a buffer
    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> Result<MemoryRequirements>;

    /// Allocate `size` bytes from memory type `memory_type_index`
    fn allocate_memory(&mut self, size: u64, memory_type_index: u32) -> Result<MemoryHandle>;

    /// Bind memory to a buffer at `offset`
    fn bind_buffer_memory(&mut self, buffer: BufferHandle, memory: MemoryHandle, offset: u64) -> Result<()>;

    /// Map host-visible memory, copy `data` at `offset`, unmap
    fn write_memory(&mut self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Map host-visible memory, copy `len` bytes from `offset`, unmap
    fn read_memory(&mut self, memory: MemoryHandle, offset: u64, len: usize) -> Result<Vec<u8>>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Free a memory allocation
    fn free_memory(&mut self, memory: MemoryHandle);

    // ===== ONE-SHOT TRANSFERS =====

    /// Allocate a primary command buffer and begin it for one-time submission
    fn begin_one_shot(&mut self) -> Result<CommandBufferHandle>;

    /// Record a copy of `size` bytes from the start of `src` to the start of `dst`
    fn cmd_copy_buffer(
        &mut self,
        command_buffer: CommandBufferHandle,
        src: BufferHandle,
        dst: BufferHandle,
        size: u64,
    ) -> Result<()>;

    /// End, submit to the graphics queue and wait until the device is idle
    ///
    /// The command buffer is freed on every exit path.
    fn submit_one_shot_and_wait(&mut self, command_buffer: CommandBufferHandle) -> Result<()>;

    /// Free a one-shot command buffer that will not be submitted
    fn free_command_buffer(&mut self, command_buffer: CommandBufferHandle);

    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;

    // ===== SHADERS & PIPELINES =====

    /// Create a shader module from SPIR-V words
    fn create_shader_module(&mut self, code: &[u32]) -> Result<ShaderModuleHandle>;

    /// Destroy a shader module
    fn destroy_shader_module(&mut self, module: ShaderModuleHandle);

    /// Create an empty pipeline cache
    fn create_pipeline_cache(&mut self) -> Result<PipelineCacheHandle>;

    /// Destroy a pipeline cache
    fn destroy_pipeline_cache(&mut self, cache: PipelineCacheHandle);

    /// Create a pipeline layout
    fn create_pipeline_layout(&mut self, desc: &PipelineLayoutDesc) -> Result<PipelineLayoutHandle>;

    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&mut self, layout: PipelineLayoutHandle);

    /// Create a graphics pipeline through `cache`
    fn create_graphics_pipeline(
        &mut self,
        cache: PipelineCacheHandle,
        desc: &GraphicsPipelineDesc,
    ) -> Result<PipelineHandle>;

    /// Destroy a pipeline
    fn destroy_pipeline(&mut self, pipeline: PipelineHandle);
}
