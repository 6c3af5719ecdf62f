//! Scene module
//!
//! Provides the vertex format, drawable objects with their GPU buffer slots,
//! the ordered scene and the built-in primitives.

mod vertex;
mod drawable;
mod scene;
pub mod primitives;

pub use vertex::Vertex;
pub use drawable::{DrawStyle, DrawableObject, DEFAULT_TAG};
pub use scene::Scene;
