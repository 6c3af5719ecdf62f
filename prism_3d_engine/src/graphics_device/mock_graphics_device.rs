/// Mock graphics device for unit tests (no GPU required)
///
/// Emulates buffers, memory contents, one-shot copies and pipeline objects,
/// records every device call in order, and can be told to fail specific calls.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    find_memory_type, BufferHandle, BufferUsageFlags, ClearValue, CommandBufferHandle,
    CommandList, DeviceInfo, DeviceLimits, Extent2D, FramebufferHandle, GraphicsDevice,
    GraphicsPipelineDesc, IndexType, MemoryHandle, MemoryPropertyFlags, MemoryRequirements,
    MemoryType, PipelineCacheHandle, PipelineHandle, PipelineLayoutDesc, PipelineLayoutHandle,
    Rect2D, RenderPassHandle, SampleCount, ShaderModuleHandle, ShaderStage, SurfaceProvider,
    Viewport,
};

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

#[derive(Debug)]
struct MockBuffer {
    size: u64,
    usage: BufferUsageFlags,
    memory: Option<MemoryHandle>,
}

#[derive(Debug)]
struct MockMemory {
    type_index: u32,
    data: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct MockCopy {
    src: BufferHandle,
    dst: BufferHandle,
    size: u64,
}

pub struct MockGraphicsDevice {
    info: DeviceInfo,
    memory_type_bits: u32,
    next_handle: u64,
    buffers: FxHashMap<u64, MockBuffer>,
    memories: FxHashMap<u64, MockMemory>,
    command_buffers: FxHashMap<u64, Vec<MockCopy>>,
    shader_modules: FxHashMap<u64, usize>,
    pipeline_caches: FxHashMap<u64, ()>,
    pipeline_layouts: FxHashMap<u64, PipelineLayoutDesc>,
    pipelines: FxHashMap<u64, (PipelineCacheHandle, GraphicsPipelineDesc)>,
    calls: Vec<String>,
    call_counts: FxHashMap<&'static str, usize>,
    /// (operation, nth call) pairs that fail; nth == 0 fails every call
    failures: Vec<(&'static str, usize)>,
}

impl MockGraphicsDevice {
    /// Device with three memory types: device-local, host-visible+coherent,
    /// host-visible+coherent+cached, and a 64-byte upload alignment
    pub fn new() -> Self {
        Self::with_memory_types(vec![
            MemoryType::new(MemoryPropertyFlags::DEVICE_LOCAL, 0),
            MemoryType::new(MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT, 1),
            MemoryType::new(
                MemoryPropertyFlags::HOST_VISIBLE
                    | MemoryPropertyFlags::HOST_COHERENT
                    | MemoryPropertyFlags::HOST_CACHED,
                1,
            ),
        ])
    }

    pub fn with_memory_types(memory_types: Vec<MemoryType>) -> Self {
        let memory_type_bits = if memory_types.len() >= 32 {
            u32::MAX
        } else {
            (1u32 << memory_types.len()) - 1
        };
        Self {
            info: DeviceInfo {
                physical_device_count: 1,
                device_name: "Mock Device".to_string(),
                driver_version: (1, 0, 0),
                api_version: (1, 3, 0),
                memory_types,
                limits: DeviceLimits {
                    max_push_constants_size: 128,
                    min_buffer_offset_alignment: 64,
                    supported_sample_counts: 0b1_0101,
                },
            },
            memory_type_bits,
            next_handle: 1,
            buffers: FxHashMap::default(),
            memories: FxHashMap::default(),
            command_buffers: FxHashMap::default(),
            shader_modules: FxHashMap::default(),
            pipeline_caches: FxHashMap::default(),
            pipeline_layouts: FxHashMap::default(),
            pipelines: FxHashMap::default(),
            calls: Vec::new(),
            call_counts: FxHashMap::default(),
            failures: Vec::new(),
        }
    }

    // ===== CONFIGURATION =====

    pub fn set_min_buffer_offset_alignment(&mut self, alignment: u64) {
        self.info.limits.min_buffer_offset_alignment = alignment;
    }

    /// Restrict the memory types every buffer may use
    pub fn set_memory_type_bits(&mut self, bits: u32) {
        self.memory_type_bits = bits;
    }

    /// Make every call to `operation` fail
    pub fn fail_on(&mut self, operation: &'static str) {
        self.failures.push((operation, 0));
    }

    /// Make the `nth` (1-based) call to `operation` fail
    pub fn fail_on_nth(&mut self, operation: &'static str, nth: usize) {
        self.failures.push((operation, nth));
    }

    // ===== INSPECTION =====

    /// Ordered log of successful device calls
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Position of the first call starting with `prefix`
    pub fn call_position(&self, prefix: &str) -> Option<usize> {
        self.calls.iter().position(|call| call.starts_with(prefix))
    }

    /// Number of logged calls starting with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|call| call.starts_with(prefix)).count()
    }

    /// First memory type index having `flags`
    pub fn memory_type_index(&self, flags: MemoryPropertyFlags) -> u32 {
        find_memory_type(&self.info.memory_types, self.memory_type_bits, flags).unwrap_or(0)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_memory_count(&self) -> usize {
        self.memories.len()
    }

    pub fn live_command_buffer_count(&self) -> usize {
        self.command_buffers.len()
    }

    pub fn live_shader_module_count(&self) -> usize {
        self.shader_modules.len()
    }

    pub fn live_pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn live_pipeline_layout_count(&self) -> usize {
        self.pipeline_layouts.len()
    }

    pub fn live_pipeline_cache_count(&self) -> usize {
        self.pipeline_caches.len()
    }

    pub fn buffer_size(&self, buffer: BufferHandle) -> Option<u64> {
        self.buffers.get(&buffer.0).map(|b| b.size)
    }

    pub fn buffer_usage(&self, buffer: BufferHandle) -> Option<BufferUsageFlags> {
        self.buffers.get(&buffer.0).map(|b| b.usage)
    }

    pub fn buffer_memory(&self, buffer: BufferHandle) -> Option<MemoryHandle> {
        self.buffers.get(&buffer.0).and_then(|b| b.memory)
    }

    pub fn memory_properties(&self, memory: MemoryHandle) -> Option<MemoryPropertyFlags> {
        let type_index = self.memories.get(&memory.0)?.type_index;
        self.info.memory_types.get(type_index as usize).map(|t| t.property_flags)
    }

    pub fn memory_contents(&self, memory: MemoryHandle) -> Option<&[u8]> {
        self.memories.get(&memory.0).map(|m| m.data.as_slice())
    }

    pub fn pipeline_desc(&self, pipeline: PipelineHandle) -> Option<&GraphicsPipelineDesc> {
        self.pipelines.get(&pipeline.0).map(|(_, desc)| desc)
    }

    pub fn pipeline_cache_of(&self, pipeline: PipelineHandle) -> Option<PipelineCacheHandle> {
        self.pipelines.get(&pipeline.0).map(|(cache, _)| *cache)
    }

    pub fn pipeline_layout_desc(&self, layout: PipelineLayoutHandle) -> Option<&PipelineLayoutDesc> {
        self.pipeline_layouts.get(&layout.0)
    }

    // ===== INTERNALS =====

    fn check(&mut self, operation: &'static str) -> Result<()> {
        let count = self.call_counts.entry(operation).or_insert(0);
        *count += 1;
        let count = *count;

        let fails = self
            .failures
            .iter()
            .any(|&(op, nth)| op == operation && (nth == 0 || nth == count));
        if fails {
            return Err(Error::BackendError(format!("injected failure in {}", operation)));
        }
        Ok(())
    }

    fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn host_visible_memory(&mut self, memory: MemoryHandle) -> Result<&mut MockMemory> {
        let memory_types = &self.info.memory_types;
        let entry = self
            .memories
            .get_mut(&memory.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown memory {}", memory.0)))?;
        let host_visible = memory_types
            .get(entry.type_index as usize)
            .map(|t| t.property_flags.contains(MemoryPropertyFlags::HOST_VISIBLE))
            .unwrap_or(false);
        if !host_visible {
            return Err(Error::BackendError(format!("memory {} is not host visible", memory.0)));
        }
        Ok(entry)
    }

    fn execute_copy(&mut self, copy: MockCopy) -> Result<()> {
        let src_memory = self.buffer_memory(copy.src)
            .ok_or_else(|| Error::InvalidResource(format!("copy source {} not bound", copy.src.0)))?;
        let dst_memory = self.buffer_memory(copy.dst)
            .ok_or_else(|| Error::InvalidResource(format!("copy destination {} not bound", copy.dst.0)))?;

        let bytes: Vec<u8> = match self.memories.get(&src_memory.0) {
            Some(memory) => memory.data[..copy.size as usize].to_vec(),
            None => return Err(Error::InvalidResource("copy source memory freed".to_string())),
        };
        match self.memories.get_mut(&dst_memory.0) {
            Some(memory) => memory.data[..bytes.len()].copy_from_slice(&bytes),
            None => return Err(Error::InvalidResource("copy destination memory freed".to_string())),
        }
        Ok(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn create_buffer(&mut self, size: u64, usage: BufferUsageFlags) -> Result<BufferHandle> {
        self.check("create_buffer")?;
        if size == 0 {
            return Err(Error::BackendError("zero-sized buffer".to_string()));
        }
        let handle = self.allocate_handle();
        self.buffers.insert(handle, MockBuffer { size, usage, memory: None });
        self.calls.push(format!("create_buffer({})", handle));
        Ok(BufferHandle(handle))
    }

    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> Result<MemoryRequirements> {
        let entry = self.buffers.get(&buffer.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {}", buffer.0)))?;
        Ok(MemoryRequirements {
            size: entry.size,
            alignment: 16,
            memory_type_bits: self.memory_type_bits,
        })
    }

    fn allocate_memory(&mut self, size: u64, memory_type_index: u32) -> Result<MemoryHandle> {
        self.check("allocate_memory")?;
        if memory_type_index as usize >= self.info.memory_types.len() {
            return Err(Error::InvalidResource(format!("memory type {} out of range", memory_type_index)));
        }
        let handle = self.allocate_handle();
        self.memories.insert(handle, MockMemory {
            type_index: memory_type_index,
            data: vec![0u8; size as usize],
        });
        self.calls.push(format!("allocate_memory({})", handle));
        Ok(MemoryHandle(handle))
    }

    fn bind_buffer_memory(&mut self, buffer: BufferHandle, memory: MemoryHandle, offset: u64) -> Result<()> {
        self.check("bind_buffer_memory")?;
        if offset != 0 || !self.memories.contains_key(&memory.0) {
            return Err(Error::InvalidResource(format!("cannot bind memory {}", memory.0)));
        }
        let entry = self.buffers.get_mut(&buffer.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {}", buffer.0)))?;
        entry.memory = Some(memory);
        self.calls.push(format!("bind_buffer_memory({},{})", buffer.0, memory.0));
        Ok(())
    }

    fn write_memory(&mut self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()> {
        self.check("write_memory")?;
        let entry = self.host_visible_memory(memory)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > entry.data.len() {
            return Err(Error::InvalidResource("write past end of allocation".to_string()));
        }
        entry.data[start..end].copy_from_slice(data);
        self.calls.push(format!("write_memory({})", memory.0));
        Ok(())
    }

    fn read_memory(&mut self, memory: MemoryHandle, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.check("read_memory")?;
        let entry = self.host_visible_memory(memory)?;
        let start = offset as usize;
        let end = start + len;
        if end > entry.data.len() {
            return Err(Error::InvalidResource("read past end of allocation".to_string()));
        }
        let bytes = entry.data[start..end].to_vec();
        self.calls.push(format!("read_memory({})", memory.0));
        Ok(bytes)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if buffer.is_null() {
            return;
        }
        self.buffers.remove(&buffer.0);
        self.calls.push(format!("destroy_buffer({})", buffer.0));
    }

    fn free_memory(&mut self, memory: MemoryHandle) {
        if memory.is_null() {
            return;
        }
        self.memories.remove(&memory.0);
        self.calls.push(format!("free_memory({})", memory.0));
    }

    fn begin_one_shot(&mut self) -> Result<CommandBufferHandle> {
        self.check("begin_one_shot")?;
        let handle = self.allocate_handle();
        self.command_buffers.insert(handle, Vec::new());
        self.calls.push(format!("begin_one_shot({})", handle));
        Ok(CommandBufferHandle(handle))
    }

    fn cmd_copy_buffer(
        &mut self,
        command_buffer: CommandBufferHandle,
        src: BufferHandle,
        dst: BufferHandle,
        size: u64,
    ) -> Result<()> {
        self.check("cmd_copy_buffer")?;
        let usable = |b: Option<&MockBuffer>, usage: BufferUsageFlags| {
            b.map(|b| b.size >= size && b.usage.contains(usage)).unwrap_or(false)
        };
        if !usable(self.buffers.get(&src.0), BufferUsageFlags::TRANSFER_SRC)
            || !usable(self.buffers.get(&dst.0), BufferUsageFlags::TRANSFER_DST)
        {
            return Err(Error::InvalidResource("copy region exceeds buffer or usage".to_string()));
        }
        let copies = self.command_buffers.get_mut(&command_buffer.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown command buffer {}", command_buffer.0)))?;
        copies.push(MockCopy { src, dst, size });
        self.calls.push(format!("cmd_copy_buffer({},{},{})", src.0, dst.0, size));
        Ok(())
    }

    fn submit_one_shot_and_wait(&mut self, command_buffer: CommandBufferHandle) -> Result<()> {
        let copies = self.command_buffers.remove(&command_buffer.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown command buffer {}", command_buffer.0)))?;
        self.check("submit_one_shot_and_wait")?;
        for copy in copies {
            self.execute_copy(copy)?;
        }
        self.calls.push(format!("submit_one_shot_and_wait({})", command_buffer.0));
        Ok(())
    }

    fn free_command_buffer(&mut self, command_buffer: CommandBufferHandle) {
        if self.command_buffers.remove(&command_buffer.0).is_some() {
            self.calls.push(format!("free_command_buffer({})", command_buffer.0));
        }
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.check("wait_idle")?;
        self.calls.push("wait_idle".to_string());
        Ok(())
    }

    fn create_shader_module(&mut self, code: &[u32]) -> Result<ShaderModuleHandle> {
        self.check("create_shader_module")?;
        let handle = self.allocate_handle();
        self.shader_modules.insert(handle, code.len());
        self.calls.push(format!("create_shader_module({})", handle));
        Ok(ShaderModuleHandle(handle))
    }

    fn destroy_shader_module(&mut self, module: ShaderModuleHandle) {
        if module.is_null() {
            return;
        }
        self.shader_modules.remove(&module.0);
        self.calls.push(format!("destroy_shader_module({})", module.0));
    }

    fn create_pipeline_cache(&mut self) -> Result<PipelineCacheHandle> {
        self.check("create_pipeline_cache")?;
        let handle = self.allocate_handle();
        self.pipeline_caches.insert(handle, ());
        self.calls.push(format!("create_pipeline_cache({})", handle));
        Ok(PipelineCacheHandle(handle))
    }

    fn destroy_pipeline_cache(&mut self, cache: PipelineCacheHandle) {
        if cache.is_null() {
            return;
        }
        self.pipeline_caches.remove(&cache.0);
        self.calls.push(format!("destroy_pipeline_cache({})", cache.0));
    }

    fn create_pipeline_layout(&mut self, desc: &PipelineLayoutDesc) -> Result<PipelineLayoutHandle> {
        self.check("create_pipeline_layout")?;
        let handle = self.allocate_handle();
        self.pipeline_layouts.insert(handle, desc.clone());
        self.calls.push(format!("create_pipeline_layout({})", handle));
        Ok(PipelineLayoutHandle(handle))
    }

    fn destroy_pipeline_layout(&mut self, layout: PipelineLayoutHandle) {
        if layout.is_null() {
            return;
        }
        self.pipeline_layouts.remove(&layout.0);
        self.calls.push(format!("destroy_pipeline_layout({})", layout.0));
    }

    fn create_graphics_pipeline(
        &mut self,
        cache: PipelineCacheHandle,
        desc: &GraphicsPipelineDesc,
    ) -> Result<PipelineHandle> {
        self.check("create_graphics_pipeline")?;
        let handle = self.allocate_handle();
        self.pipelines.insert(handle, (cache, desc.clone()));
        self.calls.push(format!("create_graphics_pipeline({})", handle));
        Ok(PipelineHandle(handle))
    }

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle) {
        if pipeline.is_null() {
            return;
        }
        self.pipelines.remove(&pipeline.0);
        self.calls.push(format!("destroy_pipeline({})", pipeline.0));
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

/// One recorded command
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    BeginRenderPass {
        render_pass: RenderPassHandle,
        framebuffer: FramebufferHandle,
        extent: Extent2D,
        clear_values: Vec<ClearValue>,
    },
    EndRenderPass,
    SetViewport(Viewport),
    SetScissor(Rect2D),
    BindPipeline(PipelineHandle),
    PushConstants {
        layout: PipelineLayoutHandle,
        stages: Vec<ShaderStage>,
        offset: u32,
        data: Vec<u8>,
    },
    BindVertexBuffer { buffer: BufferHandle, offset: u64 },
    BindIndexBuffer { buffer: BufferHandle, offset: u64, index_type: IndexType },
    Draw { vertex_count: u32, first_vertex: u32 },
    DrawIndexed { index_count: u32, first_index: u32, vertex_offset: i32 },
}

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub commands: Vec<RecordedCommand>,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self { commands: Vec::new() }
    }

    /// Only the draw and draw_indexed commands, in order
    pub fn draws(&self) -> Vec<RecordedCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::Draw { .. } | RecordedCommand::DrawIndexed { .. }))
            .cloned()
            .collect()
    }
}

impl CommandList for MockCommandList {
    fn begin_render_pass(
        &mut self,
        render_pass: RenderPassHandle,
        framebuffer: FramebufferHandle,
        extent: Extent2D,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        self.commands.push(RecordedCommand::BeginRenderPass {
            render_pass,
            framebuffer,
            extent,
            clear_values: clear_values.to_vec(),
        });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.commands.push(RecordedCommand::EndRenderPass);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(RecordedCommand::SetViewport(viewport));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.commands.push(RecordedCommand::SetScissor(scissor));
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        self.commands.push(RecordedCommand::BindPipeline(pipeline));
        Ok(())
    }

    fn push_constants(
        &mut self,
        layout: PipelineLayoutHandle,
        stages: &[ShaderStage],
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        self.commands.push(RecordedCommand::PushConstants {
            layout,
            stages: stages.to_vec(),
            offset,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, offset: u64) -> Result<()> {
        self.commands.push(RecordedCommand::BindVertexBuffer { buffer, offset });
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle, offset: u64, index_type: IndexType) -> Result<()> {
        self.commands.push(RecordedCommand::BindIndexBuffer { buffer, offset, index_type });
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.commands.push(RecordedCommand::Draw { vertex_count, first_vertex });
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.commands.push(RecordedCommand::DrawIndexed { index_count, first_index, vertex_offset });
        Ok(())
    }
}

// ============================================================================
// Mock Surface
// ============================================================================

pub struct MockSurface {
    pub extent: Extent2D,
    pub sample_count: SampleCount,
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    pub command_list: MockCommandList,
    /// "frame_ready" / "request_update" in call order
    pub events: Vec<&'static str>,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: Extent2D::new(width, height),
            sample_count: SampleCount::S1,
            render_pass: RenderPassHandle(900),
            framebuffer: FramebufferHandle(901),
            command_list: MockCommandList::new(),
            events: Vec::new(),
        }
    }

    pub fn with_sample_count(mut self, sample_count: SampleCount) -> Self {
        self.sample_count = sample_count;
        self
    }
}

impl SurfaceProvider for MockSurface {
    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn command_list(&mut self) -> &mut dyn CommandList {
        &mut self.command_list
    }

    fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    fn render_pass(&self) -> RenderPassHandle {
        self.render_pass
    }

    fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    fn frame_ready(&mut self) {
        self.events.push("frame_ready");
    }

    fn request_update(&mut self) {
        self.events.push("request_update");
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
