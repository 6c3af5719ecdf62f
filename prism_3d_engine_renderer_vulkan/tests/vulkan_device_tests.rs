//! Integration tests for VulkanGraphicsDevice
//!
//! All tests require a GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_device_tests -- --ignored

use prism_3d_engine::prism3d::render::{
    find_memory_type, BufferTransferEngine, BufferUsageFlags, GraphicsDevice, MemoryPropertyFlags,
    PipelineLayoutDesc, RendererConfig,
};
use prism_3d_engine::prism3d::scene::primitives;
use prism_3d_engine_renderer_vulkan::prism3d::{VulkanDeviceConfig, VulkanGraphicsDevice};

fn create_device() -> VulkanGraphicsDevice {
    let config = VulkanDeviceConfig {
        enable_validation: false,
        ..VulkanDeviceConfig::default()
    };
    VulkanGraphicsDevice::new_headless(config).unwrap()
}

// ============================================================================
// CONFIG (no GPU)
// ============================================================================

#[test]
fn test_device_config_from_renderer_config() {
    let renderer_config = RendererConfig {
        app_name: "Axis Viewer".to_string(),
        app_version: (2, 1, 0),
        ..RendererConfig::default()
    };
    let config = VulkanDeviceConfig::from_renderer_config(&renderer_config);
    assert_eq!(config.app_name, "Axis Viewer");
    assert_eq!(config.app_version, (2, 1, 0));
}

// ============================================================================
// DEVICE INFO
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_device_info() {
    let device = create_device();
    let info = device.info();

    assert!(info.physical_device_count >= 1);
    assert!(!info.device_name.is_empty());
    assert!(!info.memory_types.is_empty());
    assert!(info.limits.max_push_constants_size >= 128);
    assert!(info.supported_sample_counts().contains(&1));
    assert!(!info.report().is_empty());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_has_device_local_and_host_visible_memory() {
    let device = create_device();
    let types = device.memory_types();

    assert!(find_memory_type(types, u32::MAX, MemoryPropertyFlags::DEVICE_LOCAL).is_ok());
    assert!(find_memory_type(
        types,
        u32::MAX,
        MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT
    )
    .is_ok());
}

// ============================================================================
// UPLOADS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_upload_and_download() {
    let mut device = create_device();
    let transfer = BufferTransferEngine::new(&device).with_readback();

    let data: Vec<u8> = (0..=255).collect();
    let mut buffer = transfer
        .upload_to_device(&mut device, &data, BufferUsageFlags::VERTEX)
        .unwrap();
    assert!(buffer.size() >= data.len() as u64);

    let read_back = transfer.download_from_device(&mut device, &buffer, data.len()).unwrap();
    assert_eq!(read_back, data);

    buffer.release(&mut device);
    assert!(!buffer.is_valid());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_upload_scene() {
    let mut device = create_device();
    let mut scene = primitives::default_scene();

    let uploaded = BufferTransferEngine::new(&device)
        .upload_scene(&mut device, &mut scene)
        .unwrap();
    assert_eq!(uploaded, 4);

    device.wait_idle().unwrap();
    assert_eq!(scene.release_buffers(&mut device), 4);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_zero_sized_buffer_is_rejected() {
    let mut device = create_device();
    assert!(device.create_buffer(0, BufferUsageFlags::VERTEX).is_err());
}

// ============================================================================
// PIPELINE OBJECTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_pipeline_cache_and_layout() {
    let mut device = create_device();

    let cache = device.create_pipeline_cache().unwrap();
    let layout = device
        .create_pipeline_layout(&prism_3d_engine::prism3d::render::pipeline_layout_desc())
        .unwrap();
    let empty_layout = device.create_pipeline_layout(&PipelineLayoutDesc::default()).unwrap();

    assert!(!cache.is_null());
    assert!(!layout.is_null());

    device.destroy_pipeline_layout(empty_layout);
    device.destroy_pipeline_layout(layout);
    device.destroy_pipeline_cache(cache);
}
