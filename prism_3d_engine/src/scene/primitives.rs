//! Built-in primitives and the default scene.

use glam::Vec3;
use super::{DrawStyle, DrawableObject, Scene, Vertex};

/// Single RGB triangle in the XY plane
pub fn triangle() -> DrawableObject {
    DrawableObject::new(
        "tri",
        vec![
            Vertex::with_uv([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex::with_uv([0.5, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::with_uv([0.0, 0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ],
        DrawStyle::Fill,
    )
}

/// Unit quad centered on the origin, drawn as two indexed triangles
pub fn quad() -> DrawableObject {
    DrawableObject::with_indices(
        "quad",
        vec![
            Vertex::with_uv([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex::with_uv([0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::with_uv([0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::with_uv([-0.5, 0.5, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0]),
        ],
        vec![0, 1, 2, 2, 3, 0],
        DrawStyle::Fill,
    )
}

/// X, Y and Z unit axes as red, green and blue line segments
pub fn world_axis() -> DrawableObject {
    let red = [1.0, 0.0, 0.0];
    let green = [0.0, 1.0, 0.0];
    let blue = [0.0, 0.0, 1.0];
    DrawableObject::new(
        "axis",
        vec![
            Vertex::new([0.0, 0.0, 0.0], red),
            Vertex::new([1.0, 0.0, 0.0], red),
            Vertex::new([0.0, 0.0, 0.0], green),
            Vertex::new([0.0, 1.0, 0.0], green),
            Vertex::new([0.0, 0.0, 0.0], blue),
            Vertex::new([0.0, 0.0, 1.0], blue),
        ],
        DrawStyle::Line,
    )
}

/// Box 1 wide, 2 high, 3 deep in a single color, as 12 unindexed triangles
///
/// The model matrix scales by 0.5 and then moves by (0.5, 0.1, 0.1) in the
/// scaled frame.
pub fn wall(color: [f32; 3]) -> DrawableObject {
    let corner = |x: f32, y: f32, z: f32| Vertex::new([x, y, z], color);
    let v1 = corner(-0.5, -1.0, -1.5);
    let v2 = corner(-0.5, -1.0, 1.5);
    let v3 = corner(-0.5, 1.0, -1.5);
    let v4 = corner(0.5, 1.0, 1.5);
    let v5 = corner(-0.5, 1.0, 1.5);
    let v6 = corner(0.5, -1.0, 1.5);
    let v7 = corner(0.5, 1.0, -1.5);
    let v8 = corner(0.5, -1.0, -1.5);

    let vertices = vec![
        v1, v3, v5, v5, v2, v1, // front
        v2, v5, v4, v4, v6, v2, // right
        v6, v4, v7, v7, v8, v6, // back
        v7, v8, v1, v1, v3, v7, // left
        v3, v7, v5, v5, v4, v7, // top
        v1, v8, v6, v6, v2, v1, // bottom
    ];

    let mut object = DrawableObject::new("wall", vertices, DrawStyle::Fill);
    object.scale(0.5);
    object.translate(Vec3::new(0.5, 0.1, 0.1));
    object
}

/// Triangle, quad and world axis, in that order
pub fn default_scene() -> Scene {
    let mut scene = Scene::new();
    scene.push(triangle());
    scene.push(quad());
    scene.push(world_axis());
    scene
}

#[cfg(test)]
#[path = "primitives_tests.rs"]
mod tests;
