/// Tests for Scene
///
/// These tests validate ordering, on-demand name lookups and buffer release.

use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{BufferUsageFlags, GpuBuffer};
use crate::scene::{DrawStyle, Vertex};

// ============================================================================
// Helper Functions
// ============================================================================

fn object(name: &str) -> DrawableObject {
    DrawableObject::new(name, vec![Vertex::default(); 3], DrawStyle::Fill)
}

fn three_object_scene() -> Scene {
    let mut scene = Scene::new();
    scene.push(object("tri"));
    scene.push(object("quad"));
    scene.push(object("axis"));
    scene
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_new_scene_is_empty() {
    let scene = Scene::new();
    assert!(scene.is_empty());
    assert_eq!(scene.len(), 0);
    assert!(scene.name_index().is_empty());
}

#[test]
fn test_push_preserves_insertion_order() {
    let scene = three_object_scene();
    let names: Vec<&str> = scene.objects().iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["tri", "quad", "axis"]);
    assert_eq!(scene.get(1).unwrap().name(), "quad");
    assert!(scene.get(3).is_none());
}

#[test]
fn test_push_returns_position() {
    let mut scene = Scene::new();
    assert_eq!(scene.push(object("a")), 0);
    assert_eq!(scene.push(object("b")), 1);
}

// ============================================================================
// Name lookups
// ============================================================================

#[test]
fn test_name_index_maps_to_positions() {
    let scene = three_object_scene();
    let index = scene.name_index();
    assert_eq!(index.len(), 3);
    assert_eq!(index["tri"], 0);
    assert_eq!(index["quad"], 1);
    assert_eq!(index["axis"], 2);
}

#[test]
fn test_name_index_first_duplicate_wins() {
    let mut scene = three_object_scene();
    scene.push(object("tri"));
    assert_eq!(scene.name_index()["tri"], 0);
    assert_eq!(scene.len(), 4);
}

#[test]
fn test_name_index_reflects_renames() {
    let mut scene = three_object_scene();
    scene.get_mut(0).unwrap().set_name("triangle");
    let index = scene.name_index();
    assert!(index.get("tri").is_none());
    assert_eq!(index["triangle"], 0);
}

#[test]
fn test_get_by_name() {
    let mut scene = three_object_scene();
    assert_eq!(scene.get_by_name("axis").unwrap().name(), "axis");
    assert!(scene.get_by_name("suzanne").is_none());

    scene.get_by_name_mut("quad").unwrap().set_tag("floor");
    assert_eq!(scene.get(1).unwrap().tag(), "floor");
}

#[test]
fn test_rotate_object() {
    let mut scene = three_object_scene();
    assert!(scene.rotate_object("quad", 90.0, Vec3::Z));
    assert!(!scene.rotate_object("missing", 90.0, Vec3::Z));
    assert_ne!(scene.get(1).unwrap().transform(), glam::Mat4::IDENTITY);
    assert_eq!(scene.get(0).unwrap().transform(), glam::Mat4::IDENTITY);
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_release_buffers_counts_live_buffers() {
    let mut device = MockGraphicsDevice::new();
    let mut scene = three_object_scene();
    for object in scene.objects_mut() {
        let buffer = device.create_buffer(96, BufferUsageFlags::VERTEX).unwrap();
        let memory = device.allocate_memory(96, 0).unwrap();
        object.attach_vertex_buffer(GpuBuffer::new(buffer, memory, 96));
    }

    assert_eq!(scene.release_buffers(&mut device), 3);
    assert_eq!(device.live_buffer_count(), 0);
    assert_eq!(device.live_memory_count(), 0);
    assert_eq!(scene.release_buffers(&mut device), 0);
}
