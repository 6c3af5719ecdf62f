/// Scene - the ordered collection of drawable objects.
///
/// The object list is the single source of truth: iteration (and therefore draw
/// order) follows insertion order. Name lookups go through an index built on
/// demand, so no second container has to be kept in sync.

use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::graphics_device::GraphicsDevice;
use super::drawable::DrawableObject;

/// An ordered list of drawable objects.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<DrawableObject>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self { objects: Vec::new() }
    }

    /// Append an object and return its position
    pub fn push(&mut self, object: DrawableObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [DrawableObject] {
        &mut self.objects
    }

    pub fn get(&self, index: usize) -> Option<&DrawableObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DrawableObject> {
        self.objects.get_mut(index)
    }

    /// Map object names to positions
    ///
    /// When several objects share a name, the first one wins.
    pub fn name_index(&self) -> FxHashMap<&str, usize> {
        let mut index = FxHashMap::default();
        for (position, object) in self.objects.iter().enumerate() {
            index.entry(object.name()).or_insert(position);
        }
        index
    }

    /// First object called `name`
    pub fn get_by_name(&self, name: &str) -> Option<&DrawableObject> {
        self.objects.iter().find(|object| object.name() == name)
    }

    /// First object called `name`, mutably
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|object| object.name() == name)
    }

    /// Rotate the named object in place; returns false if no object has that name
    pub fn rotate_object(&mut self, name: &str, degrees: f32, axis: Vec3) -> bool {
        match self.get_by_name_mut(name) {
            Some(object) => {
                object.rotate(degrees, axis);
                true
            }
            None => false,
        }
    }

    /// Release the GPU buffers of every object, in scene order
    ///
    /// Returns the number of live buffers destroyed.
    pub fn release_buffers(&mut self, device: &mut dyn GraphicsDevice) -> usize {
        self.objects
            .iter_mut()
            .map(|object| object.release_buffers(device))
            .sum()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
