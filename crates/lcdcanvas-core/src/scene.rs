//! Ordered layer storage.
//!
//! Layer order is draw order: index 0 is drawn first, the last layer ends up
//! on top. The same order is what the layer list shows, so "up" moves a
//! layer toward index 0 and "down" toward the end.

use std::fmt;

use crate::shape::Shape;

/// Stable handle of a shape within one scene. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shape together with its handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub id: ShapeId,
    pub shape: Shape,
}

/// The ordered collection of every shape in a design
#[derive(Debug, Clone, Default)]
pub struct Scene {
    layers: Vec<Layer>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut scene = Self::new();
        for shape in shapes {
            scene.insert(shape);
        }
        scene
    }

    fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a shape on top of everything else
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = self.allocate_id();
        self.layers.push(Layer { id, shape });
        id
    }

    /// Remove a shape by identity
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.position(id)?;
        Some(self.layers.remove(index).shape)
    }

    /// Replace every shape (clear, load). Ids are never reused.
    pub fn replace_all(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.layers.clear();
        for shape in shapes {
            self.insert(shape);
        }
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Swap with the previous layer. Returns false at the top boundary or
    /// for an unknown id.
    pub fn move_up(&mut self, id: ShapeId) -> bool {
        match self.position(id) {
            Some(index) if index > 0 => {
                self.layers.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap with the next layer. Returns false at the bottom boundary or
    /// for an unknown id.
    pub fn move_down(&mut self, id: ShapeId) -> bool {
        match self.position(id) {
            Some(index) if index + 1 < self.layers.len() => {
                self.layers.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn position(&self, id: ShapeId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.layers.iter().find(|layer| layer.id == id).map(|layer| &layer.shape)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .map(|layer| &mut layer.shape)
    }

    /// Id of the layer at a 0-based draw-order index
    pub fn id_at(&self, index: usize) -> Option<ShapeId> {
        self.layers.get(index).map(|layer| layer.id)
    }

    /// Layers in draw order
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Shapes in draw order
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.layers.iter().map(|layer| &layer.shape)
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.layers.iter().map(|layer| layer.id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer-list line for a 0-based index, numbered from 1
    pub fn describe(&self, index: usize) -> Option<String> {
        self.layers
            .get(index)
            .map(|layer| format!("{}. {}", index + 1, layer.shape.summary()))
    }
}

/// Scenes compare by content and order; handles are not part of a design.
impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.shapes().eq(other.shapes())
    }
}

impl Eq for Scene {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::shape::{Bounds, Point};

    fn rect(x: i32) -> Shape {
        Shape::Rect { bounds: Bounds::new(x, 0, x + 10, 10), color: Rgb::WHITE }
    }

    fn xs(scene: &Scene) -> Vec<i32> {
        scene.shapes().map(|s| s.anchor().x).collect()
    }

    #[test]
    fn insert_appends_on_top() {
        let mut scene = Scene::new();
        let a = scene.insert(rect(0));
        let b = scene.insert(rect(1));
        assert_ne!(a, b);
        assert_eq!(scene.position(b), Some(1));
        assert_eq!(xs(&scene), vec![0, 1]);
    }

    #[test]
    fn move_down_then_up_restores_order() {
        let mut scene = Scene::from_shapes([rect(0), rect(1), rect(2)]);
        let first = scene.id_at(0).unwrap();
        assert!(scene.move_down(first));
        assert_eq!(xs(&scene), vec![1, 0, 2]);
        assert!(scene.move_up(first));
        assert_eq!(xs(&scene), vec![0, 1, 2]);
    }

    #[test]
    fn moves_at_boundaries_are_noops() {
        let mut scene = Scene::from_shapes([rect(0), rect(1), rect(2)]);
        let first = scene.id_at(0).unwrap();
        let last = scene.id_at(2).unwrap();
        assert!(!scene.move_up(first));
        assert!(!scene.move_down(last));
        assert_eq!(xs(&scene), vec![0, 1, 2]);
        assert!(!scene.move_up(ShapeId(99)));
    }

    #[test]
    fn remove_by_identity() {
        let mut scene = Scene::from_shapes([rect(0), rect(1), rect(2)]);
        let middle = scene.id_at(1).unwrap();
        assert_eq!(scene.remove(middle), Some(rect(1)));
        assert_eq!(scene.remove(middle), None);
        assert_eq!(xs(&scene), vec![0, 2]);
    }

    #[test]
    fn replace_all_never_reuses_ids() {
        let mut scene = Scene::from_shapes([rect(0)]);
        let old = scene.id_at(0).unwrap();
        scene.replace_all([rect(5)]);
        assert_ne!(scene.id_at(0), Some(old));
        assert!(scene.get(old).is_none());
    }

    #[test]
    fn equality_ignores_ids() {
        let mut a = Scene::from_shapes([rect(0)]);
        a.insert(rect(1));
        let mut b = Scene::new();
        b.replace_all([rect(9)]);
        b.replace_all([rect(0), rect(1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn describe_numbers_from_one() {
        let scene = Scene::from_shapes([
            rect(3),
            Shape::Text { pos: Point::new(4, 5), text: "Hello".into(), size: 1, color: Rgb::WHITE },
        ]);
        assert_eq!(scene.describe(0).as_deref(), Some("1. rect at (3, 0)"));
        assert_eq!(scene.describe(1).as_deref(), Some("2. text - 'Hello' at (4, 5)"));
        assert_eq!(scene.describe(2), None);
    }
}
