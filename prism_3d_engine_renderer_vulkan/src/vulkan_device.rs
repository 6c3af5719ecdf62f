/// VulkanGraphicsDevice - ash implementation of the engine's GraphicsDevice trait
///
/// Owns the instance, the logical device, one graphics queue and the command
/// pool used for one-shot uploads. Created headless: the presentation layer
/// owns swapchain, render pass and framebuffers.

use ash::vk;
use ash::vk::Handle;
use std::ffi::{CStr, CString};

use prism_3d_engine::prism3d::render::{
    BufferHandle, BufferUsageFlags, CommandBufferHandle, DeviceInfo, DeviceLimits, GraphicsDevice,
    GraphicsPipelineDesc, MemoryHandle, MemoryRequirements, PipelineCacheHandle, PipelineHandle,
    PipelineLayoutDesc, PipelineLayoutHandle, RendererConfig, ShaderModuleHandle,
};
use prism_3d_engine::prism3d::{Error, Result};
use prism_3d_engine::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_warn};

use crate::vulkan_command_list::VulkanCommandList;
use crate::vulkan_format::*;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Headless device creation parameters
#[derive(Debug, Clone)]
pub struct VulkanDeviceConfig {
    /// Request VK_LAYER_KHRONOS_validation and install the debug messenger
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Requested Vulkan API version
    pub api_version: u32,
}

impl Default for VulkanDeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions) || cfg!(feature = "vulkan-validation"),
            app_name: "Prism3D Application".to_string(),
            app_version: (1, 0, 0),
            api_version: vk::API_VERSION_1_1,
        }
    }
}

impl VulkanDeviceConfig {
    pub fn from_renderer_config(config: &RendererConfig) -> Self {
        Self {
            enable_validation: config.enable_validation || cfg!(feature = "vulkan-validation"),
            app_name: config.app_name.clone(),
            app_version: config.app_version,
            ..Self::default()
        }
    }
}

/// Log a failed Vulkan call and convert it; allocation failures become `OutOfMemory`
fn vk_error(operation: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            engine_error!("prism3d::vulkan", "{} failed: out of memory ({:?})", operation, result);
            Error::OutOfMemory
        }
        _ => engine_err!("prism3d::vulkan", "{} failed: {:?}", operation, result),
    }
}

fn init_error(operation: &str, result: vk::Result) -> Error {
    engine_error!("prism3d::vulkan", "{} failed: {:?}", operation, result);
    Error::InitializationFailed(format!("{} failed: {:?}", operation, result))
}

/// Vulkan device implementation
pub struct VulkanGraphicsDevice {
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    graphics_queue: vk::Queue,
    graphics_queue_family: u32,
    /// Command pool for one-shot uploads (TRANSIENT)
    upload_command_pool: vk::CommandPool,
    debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    info: DeviceInfo,
    /// wideLines feature enabled on the logical device
    wide_lines: bool,
    line_width_range: [f32; 2],
}

impl VulkanGraphicsDevice {
    /// Create an instance and a logical device on the first GPU with a
    /// graphics queue
    pub fn new_headless(config: VulkanDeviceConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("prism3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let app_name = CString::new(config.app_name.clone())
                .map_err(|_| Error::InitializationFailed("application name contains NUL".to_string()))?;
            let (major, minor, patch) = config.app_version;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Prism3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(config.api_version);

            let validation = config.enable_validation && Self::validation_layer_available(&entry);
            if config.enable_validation && !validation {
                engine_warn!(
                    "prism3d::vulkan",
                    "{} not installed, continuing without validation",
                    VALIDATION_LAYER.to_string_lossy()
                );
            }

            let layer_names = if validation { vec![VALIDATION_LAYER.as_ptr()] } else { vec![] };
            let extension_names = if validation {
                vec![ash::ext::debug_utils::NAME.as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| init_error("vkCreateInstance", e))?;

            let (debug_utils_loader, debug_messenger) = if validation {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);
                crate::debug::reset_validation_stats();
                match debug_utils.create_debug_utils_messenger(&crate::debug::messenger_create_info(), None) {
                    Ok(messenger) => (Some(debug_utils), Some(messenger)),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(init_error("vkCreateDebugUtilsMessengerEXT", e));
                    }
                }
            } else {
                (None, None)
            };

            match Self::create_device(entry.clone(), instance.clone(), debug_utils_loader.clone(), debug_messenger) {
                Ok(device) => Ok(device),
                Err(e) => {
                    if let (Some(debug_utils), Some(messenger)) = (&debug_utils_loader, debug_messenger) {
                        debug_utils.destroy_debug_utils_messenger(messenger, None);
                    }
                    instance.destroy_instance(None);
                    Err(e)
                }
            }
        }
    }

    unsafe fn validation_layer_available(entry: &ash::Entry) -> bool {
        entry
            .enumerate_instance_layer_properties()
            .map(|layers| {
                layers
                    .iter()
                    .any(|layer| layer.layer_name_as_c_str().map(|name| name == VALIDATION_LAYER).unwrap_or(false))
            })
            .unwrap_or(false)
    }

    unsafe fn create_device(
        entry: ash::Entry,
        instance: ash::Instance,
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Result<Self> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| init_error("vkEnumeratePhysicalDevices", e))?;

        let (physical_device, graphics_queue_family) = physical_devices
            .iter()
            .find_map(|&candidate| {
                instance
                    .get_physical_device_queue_family_properties(candidate)
                    .iter()
                    .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|index| (candidate, index as u32))
            })
            .ok_or_else(|| {
                engine_error!("prism3d::vulkan", "No Vulkan-capable GPU with a graphics queue found");
                Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
            })?;

        let properties = instance.get_physical_device_properties(physical_device);
        let memory_properties = instance.get_physical_device_memory_properties(physical_device);
        let supported_features = instance.get_physical_device_features(physical_device);
        let wide_lines = supported_features.wide_lines == vk::TRUE;

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_queue_family)
            .queue_priorities(&queue_priorities)];

        let device_features = vk::PhysicalDeviceFeatures::default()
            .wide_lines(wide_lines)
            .fill_mode_non_solid(supported_features.fill_mode_non_solid == vk::TRUE);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_features(&device_features);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| init_error("vkCreateDevice", e))?;

        let graphics_queue = device.get_device_queue(graphics_queue_family, 0);

        let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT);
        let upload_command_pool = match device.create_command_pool(&upload_pool_create_info, None) {
            Ok(pool) => pool,
            Err(e) => {
                device.destroy_device(None);
                return Err(init_error("vkCreateCommandPool", e));
            }
        };

        let limits = &properties.limits;
        let info = DeviceInfo {
            physical_device_count: physical_devices.len() as u32,
            device_name: properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            driver_version: version_triplet(properties.driver_version),
            api_version: version_triplet(properties.api_version),
            memory_types: memory_types_from_vk(&memory_properties),
            limits: DeviceLimits {
                max_push_constants_size: limits.max_push_constants_size,
                min_buffer_offset_alignment: limits.min_uniform_buffer_offset_alignment,
                supported_sample_counts: sample_count_mask_from_vk(
                    limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts,
                ),
            },
        };

        engine_info!("prism3d::vulkan", "Vulkan device created on '{}'", info.device_name);
        if !wide_lines {
            engine_debug!("prism3d::vulkan", "wideLines not supported, line width is clamped to 1.0");
        }

        Ok(Self {
            _entry: entry,
            instance,
            physical_device,
            device,
            graphics_queue,
            graphics_queue_family,
            upload_command_pool,
            debug_utils_loader,
            debug_messenger,
            info,
            wide_lines,
            line_width_range: limits.line_width_range,
        })
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }

    /// Command list recording into a command buffer owned by the caller
    pub fn command_list(&self, command_buffer: vk::CommandBuffer) -> VulkanCommandList {
        VulkanCommandList::new(self.device.clone(), command_buffer)
    }

    /// Line width the device can rasterize
    fn effective_line_width(&self, requested: f32) -> f32 {
        if !self.wide_lines {
            return 1.0;
        }
        requested.clamp(self.line_width_range[0], self.line_width_range[1])
    }

    unsafe fn end_submit_and_wait(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        self.device
            .end_command_buffer(command_buffer)
            .map_err(|e| vk_error("vkEndCommandBuffer", e))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        self.device
            .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
            .map_err(|e| vk_error("vkQueueSubmit", e))?;

        self.device
            .device_wait_idle()
            .map_err(|e| vk_error("vkDeviceWaitIdle", e))
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    // ===== BUFFERS & MEMORY =====

    fn create_buffer(&mut self, size: u64, usage: BufferUsageFlags) -> Result<BufferHandle> {
        if size == 0 {
            engine_bail!("prism3d::vulkan", "Cannot create a zero-sized buffer");
        }
        let create_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(buffer_usage_to_vk(usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { self.device.create_buffer(&create_info, None) }
            .map_err(|e| vk_error("vkCreateBuffer", e))?;
        Ok(BufferHandle::from_raw(buffer.as_raw()))
    }

    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> Result<MemoryRequirements> {
        if buffer.is_null() {
            return Err(Error::InvalidResource("memory requirements of a null buffer".to_string()));
        }
        let requirements = unsafe { self.device.get_buffer_memory_requirements(vk_handle(buffer.as_raw())) };
        Ok(MemoryRequirements {
            size: requirements.size,
            alignment: requirements.alignment,
            memory_type_bits: requirements.memory_type_bits,
        })
    }

    fn allocate_memory(&mut self, size: u64, memory_type_index: u32) -> Result<MemoryHandle> {
        let allocate_info = vk::MemoryAllocateInfo::default()
            .allocation_size(size)
            .memory_type_index(memory_type_index);

        let memory = unsafe { self.device.allocate_memory(&allocate_info, None) }
            .map_err(|e| vk_error("vkAllocateMemory", e))?;
        Ok(MemoryHandle::from_raw(memory.as_raw()))
    }

    fn bind_buffer_memory(&mut self, buffer: BufferHandle, memory: MemoryHandle, offset: u64) -> Result<()> {
        unsafe {
            self.device
                .bind_buffer_memory(vk_handle(buffer.as_raw()), vk_handle(memory.as_raw()), offset)
                .map_err(|e| vk_error("vkBindBufferMemory", e))
        }
    }

    fn write_memory(&mut self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let memory: vk::DeviceMemory = vk_handle(memory.as_raw());
        unsafe {
            let mapped = self
                .device
                .map_memory(memory, offset, data.len() as u64, vk::MemoryMapFlags::empty())
                .map_err(|e| vk_error("vkMapMemory", e))?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.cast::<u8>(), data.len());
            self.device.unmap_memory(memory);
        }
        Ok(())
    }

    fn read_memory(&mut self, memory: MemoryHandle, offset: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let memory: vk::DeviceMemory = vk_handle(memory.as_raw());
        let mut bytes = vec![0u8; len];
        unsafe {
            let mapped = self
                .device
                .map_memory(memory, offset, len as u64, vk::MemoryMapFlags::empty())
                .map_err(|e| vk_error("vkMapMemory", e))?;
            std::ptr::copy_nonoverlapping(mapped.cast::<u8>(), bytes.as_mut_ptr(), len);
            self.device.unmap_memory(memory);
        }
        Ok(bytes)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if !buffer.is_null() {
            unsafe { self.device.destroy_buffer(vk_handle(buffer.as_raw()), None) };
        }
    }

    fn free_memory(&mut self, memory: MemoryHandle) {
        if !memory.is_null() {
            unsafe { self.device.free_memory(vk_handle(memory.as_raw()), None) };
        }
    }

    // ===== ONE-SHOT TRANSFERS =====

    fn begin_one_shot(&mut self) -> Result<CommandBufferHandle> {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.upload_command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        unsafe {
            let command_buffer = self
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| vk_error("vkAllocateCommandBuffers", e))?
                .into_iter()
                .next()
                .ok_or_else(|| engine_err!("prism3d::vulkan", "vkAllocateCommandBuffers returned no buffer"))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            if let Err(e) = self.device.begin_command_buffer(command_buffer, &begin_info) {
                self.device.free_command_buffers(self.upload_command_pool, &[command_buffer]);
                return Err(vk_error("vkBeginCommandBuffer", e));
            }
            Ok(CommandBufferHandle::from_raw(command_buffer.as_raw()))
        }
    }

    fn cmd_copy_buffer(
        &mut self,
        command_buffer: CommandBufferHandle,
        src: BufferHandle,
        dst: BufferHandle,
        size: u64,
    ) -> Result<()> {
        if command_buffer.is_null() || src.is_null() || dst.is_null() {
            return Err(Error::InvalidResource("copy with a null handle".to_string()));
        }
        let region = vk::BufferCopy { src_offset: 0, dst_offset: 0, size };
        unsafe {
            self.device.cmd_copy_buffer(
                vk_handle(command_buffer.as_raw()),
                vk_handle(src.as_raw()),
                vk_handle(dst.as_raw()),
                &[region],
            );
        }
        Ok(())
    }

    fn submit_one_shot_and_wait(&mut self, command_buffer: CommandBufferHandle) -> Result<()> {
        let handle: vk::CommandBuffer = vk_handle(command_buffer.as_raw());
        let result = unsafe { self.end_submit_and_wait(handle) };
        self.free_command_buffer(command_buffer);
        result
    }

    fn free_command_buffer(&mut self, command_buffer: CommandBufferHandle) {
        if !command_buffer.is_null() {
            unsafe {
                self.device
                    .free_command_buffers(self.upload_command_pool, &[vk_handle(command_buffer.as_raw())]);
            }
        }
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| vk_error("vkDeviceWaitIdle", e))
        }
    }

    // ===== SHADERS & PIPELINES =====

    fn create_shader_module(&mut self, code: &[u32]) -> Result<ShaderModuleHandle> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(code);
        let module = unsafe { self.device.create_shader_module(&create_info, None) }
            .map_err(|e| vk_error("vkCreateShaderModule", e))?;
        Ok(ShaderModuleHandle::from_raw(module.as_raw()))
    }

    fn destroy_shader_module(&mut self, module: ShaderModuleHandle) {
        if !module.is_null() {
            unsafe { self.device.destroy_shader_module(vk_handle(module.as_raw()), None) };
        }
    }

    fn create_pipeline_cache(&mut self) -> Result<PipelineCacheHandle> {
        let create_info = vk::PipelineCacheCreateInfo::default();
        let cache = unsafe { self.device.create_pipeline_cache(&create_info, None) }
            .map_err(|e| vk_error("vkCreatePipelineCache", e))?;
        Ok(PipelineCacheHandle::from_raw(cache.as_raw()))
    }

    fn destroy_pipeline_cache(&mut self, cache: PipelineCacheHandle) {
        if !cache.is_null() {
            unsafe { self.device.destroy_pipeline_cache(vk_handle(cache.as_raw()), None) };
        }
    }

    fn create_pipeline_layout(&mut self, desc: &PipelineLayoutDesc) -> Result<PipelineLayoutHandle> {
        let push_constant_ranges: Vec<vk::PushConstantRange> = desc
            .push_constant_ranges
            .iter()
            .map(|range| vk::PushConstantRange {
                stage_flags: shader_stages_to_vk(&range.stages),
                offset: range.offset,
                size: range.size,
            })
            .collect();

        let create_info = vk::PipelineLayoutCreateInfo::default().push_constant_ranges(&push_constant_ranges);
        let layout = unsafe { self.device.create_pipeline_layout(&create_info, None) }
            .map_err(|e| vk_error("vkCreatePipelineLayout", e))?;
        Ok(PipelineLayoutHandle::from_raw(layout.as_raw()))
    }

    fn destroy_pipeline_layout(&mut self, layout: PipelineLayoutHandle) {
        if !layout.is_null() {
            unsafe { self.device.destroy_pipeline_layout(vk_handle(layout.as_raw()), None) };
        }
    }

    fn create_graphics_pipeline(
        &mut self,
        cache: PipelineCacheHandle,
        desc: &GraphicsPipelineDesc,
    ) -> Result<PipelineHandle> {
        let entry_points = desc
            .stages
            .iter()
            .map(|stage| CString::new(stage.entry_point.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidResource("shader entry point contains NUL".to_string()))?;

        let shader_stages: Vec<vk::PipelineShaderStageCreateInfo> = desc
            .stages
            .iter()
            .zip(&entry_points)
            .map(|(stage, name)| {
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(shader_stage_to_vk(stage.stage))
                    .module(vk_handle(stage.module.as_raw()))
                    .name(name)
            })
            .collect();

        // Vertex input state
        let vertex_bindings: Vec<vk::VertexInputBindingDescription> = desc
            .vertex_layout
            .bindings
            .iter()
            .map(|binding| vk::VertexInputBindingDescription {
                binding: binding.binding,
                stride: binding.stride,
                input_rate: input_rate_to_vk(binding.input_rate),
            })
            .collect();

        let vertex_attributes: Vec<vk::VertexInputAttributeDescription> = desc
            .vertex_layout
            .attributes
            .iter()
            .map(|attribute| vk::VertexInputAttributeDescription {
                location: attribute.location,
                binding: attribute.binding,
                format: buffer_format_to_vk(attribute.format),
                offset: attribute.offset,
            })
            .collect();

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology_to_vk(desc.topology))
            .primitive_restart_enable(false);

        // Viewport and scissor are dynamic; only the counts matter here
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(polygon_mode_to_vk(desc.rasterization.polygon_mode))
            .line_width(self.effective_line_width(desc.rasterization.line_width))
            .cull_mode(cull_mode_to_vk(desc.rasterization.cull_mode))
            .front_face(front_face_to_vk(desc.rasterization.front_face))
            .depth_bias_enable(false);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth_stencil.depth_test_enable)
            .depth_write_enable(desc.depth_stencil.depth_write_enable)
            .depth_compare_op(compare_op_to_vk(desc.depth_stencil.depth_compare_op))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(desc.depth_stencil.stencil_test_enable);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(sample_count_to_vk(desc.multisample.sample_count));

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(color_write_mask_to_vk(desc.color_blend.color_write_mask))
            .blend_enable(desc.color_blend.blend_enable);

        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(std::slice::from_ref(&color_blend_attachment));

        let dynamic_states: Vec<vk::DynamicState> =
            desc.dynamic_states.iter().map(|state| dynamic_state_to_vk(*state)).collect();
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(vk_handle(desc.layout.as_raw()))
            .render_pass(vk_handle(desc.render_pass.as_raw()))
            .subpass(desc.subpass);

        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(vk_handle(cache.as_raw()), &[pipeline_create_info], None)
        }
        .map_err(|(_, e)| vk_error("vkCreateGraphicsPipelines", e))?;

        pipelines
            .first()
            .map(|pipeline| PipelineHandle::from_raw(pipeline.as_raw()))
            .ok_or_else(|| engine_err!("prism3d::vulkan", "vkCreateGraphicsPipelines returned no pipeline"))
    }

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle) {
        if !pipeline.is_null() {
            unsafe { self.device.destroy_pipeline(vk_handle(pipeline.as_raw()), None) };
        }
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            self.device.destroy_command_pool(self.upload_command_pool, None);
            self.device.destroy_device(None);

            // Messenger before the instance it was created from
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils_loader, self.debug_messenger) {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}
