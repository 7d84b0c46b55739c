//! Read-only per-shape cache used for picking.
//!
//! `SceneView` is rebuilt from a [`Scene`] whenever the caller needs it and
//! never writes back. Front ends hang their own display handles off the
//! same `ShapeId` keys.

use std::collections::HashMap;

use crate::scene::{Scene, ShapeId};
use crate::shape::{GLYPH_HEIGHT, GLYPH_WIDTH, Point, Segment, Shape, qr_extent};

/// A click closer than this to a line selects it
pub const LINE_PICK_DISTANCE: f64 = 5.0;

/// Resize handles react within this many pixels on each axis
pub const HANDLE_REACH: i32 = 10;

/// Precomputed bounds for one shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedShape {
    pub id: ShapeId,
    pub shape: Shape,
    /// (min_x, min_y, max_x, max_y)
    bounds: (i32, i32, i32, i32),
}

impl CachedShape {
    pub fn new(id: ShapeId, shape: Shape) -> Self {
        let bounds = Self::compute_bounds(&shape);
        Self { id, shape, bounds }
    }

    /// Bounding box as drawn on the panel
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        self.bounds
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let (min_x, min_y, max_x, max_y) = self.bounds;
        min_x <= x && x <= max_x && min_y <= y && y <= max_y
    }

    /// Whether a click at `(x, y)` lands on this shape
    pub fn contains(&self, x: i32, y: i32) -> bool {
        match &self.shape {
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => {
                let dx = i128::from(x) - i128::from(disc.center.x);
                let dy = i128::from(y) - i128::from(disc.center.y);
                let r = i128::from(disc.r);
                dx * dx + dy * dy <= r * r
            }
            Shape::Line { segment, .. } => {
                segment_distance(segment, Point::new(x, y)) < LINE_PICK_DISTANCE
            }
            _ => self.in_bounds(x, y),
        }
    }

    /// Where the resize handle sits, for kinds that have one
    pub fn resize_handle(&self) -> Option<Point> {
        match &self.shape {
            Shape::Rect { bounds, .. }
            | Shape::FilledRect { bounds, .. }
            | Shape::RoundRect { bounds, .. }
            | Shape::FilledRoundRect { bounds, .. } => Some(Point::new(bounds.x2, bounds.y2)),
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => {
                Some(Point::new(disc.center.x.saturating_add(disc.r), disc.center.y))
            }
            Shape::Line { .. } | Shape::Text { .. } | Shape::QrCode { .. } => None,
        }
    }

    pub fn is_over_resize_handle(&self, x: i32, y: i32) -> bool {
        let reach = HANDLE_REACH.unsigned_abs();
        self.resize_handle()
            .is_some_and(|h| x.abs_diff(h.x) < reach && y.abs_diff(h.y) < reach)
    }

    fn compute_bounds(shape: &Shape) -> (i32, i32, i32, i32) {
        match shape {
            Shape::Rect { bounds, .. }
            | Shape::FilledRect { bounds, .. }
            | Shape::RoundRect { bounds, .. }
            | Shape::FilledRoundRect { bounds, .. } => {
                (bounds.x1, bounds.y1, bounds.x2, bounds.y2)
            }
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => {
                let (c, r) = (disc.center, disc.r);
                (
                    c.x.saturating_sub(r),
                    c.y.saturating_sub(r),
                    c.x.saturating_add(r),
                    c.y.saturating_add(r),
                )
            }
            Shape::Line { segment, .. } => {
                let (a, b) = (segment.from, segment.to);
                (a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
            }
            Shape::Text { pos, text, size, .. } => {
                let size = i32::from(*size);
                let glyphs = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
                let width = glyphs.saturating_mul(GLYPH_WIDTH * size);
                let height = GLYPH_HEIGHT * size;
                (pos.x, pos.y, pos.x.saturating_add(width), pos.y.saturating_add(height))
            }
            Shape::QrCode { pos, module_size, .. } => {
                let extent = qr_extent(*module_size);
                (pos.x, pos.y, pos.x.saturating_add(extent), pos.y.saturating_add(extent))
            }
        }
    }
}

/// Distance from `p` to the closest point of the segment
fn segment_distance(segment: &Segment, p: Point) -> f64 {
    let (ax, ay) = (f64::from(segment.from.x), f64::from(segment.from.y));
    let (bx, by) = (f64::from(segment.to.x), f64::from(segment.to.y));
    let (px, py) = (f64::from(p.x), f64::from(p.y));

    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}

/// Picking cache over a scene, in draw order
#[derive(Debug, Clone, Default)]
pub struct SceneView {
    shapes: Vec<CachedShape>,
    by_id: HashMap<ShapeId, usize>,
}

impl SceneView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scene(scene: &Scene) -> Self {
        let mut view = Self::new();
        view.rebuild(scene);
        view
    }

    /// Refresh the cache from the scene
    pub fn rebuild(&mut self, scene: &Scene) {
        self.shapes.clear();
        self.by_id.clear();
        for (index, layer) in scene.iter().enumerate() {
            self.shapes.push(CachedShape::new(layer.id, layer.shape.clone()));
            self.by_id.insert(layer.id, index);
        }
    }

    /// Cached shapes in draw order
    pub fn iter(&self) -> impl Iterator<Item = &CachedShape> {
        self.shapes.iter()
    }

    /// Topmost shape under the point
    pub fn shape_at(&self, x: i32, y: i32) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.contains(x, y))
            .map(|shape| shape.id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&CachedShape> {
        self.by_id.get(&id).map(|&index| &self.shapes[index])
    }

    pub fn is_over_resize_handle(&self, id: ShapeId, x: i32, y: i32) -> bool {
        self.get(id).is_some_and(|shape| shape.is_over_resize_handle(x, y))
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::shape::{Bounds, Disc};

    fn cached(shape: Shape) -> CachedShape {
        CachedShape::new(ShapeId(0), shape)
    }

    #[test]
    fn rect_containment_is_inclusive() {
        let rect = cached(Shape::FilledRoundRect {
            bounds: Bounds::new(10, 10, 20, 20),
            radius: Some(3),
            color: Rgb::WHITE,
        });
        assert!(rect.contains(10, 10));
        assert!(rect.contains(20, 20));
        assert!(!rect.contains(21, 15));
    }

    #[test]
    fn circle_uses_radius() {
        let circle = cached(Shape::Circle {
            disc: Disc::new(Point::new(0, 0), 5),
            color: Rgb::WHITE,
        });
        assert!(circle.contains(3, 4));
        assert!(!circle.contains(4, 4));
    }

    #[test]
    fn line_pick_distance() {
        let line = cached(Shape::Line {
            segment: Segment::new(Point::new(0, 0), Point::new(100, 0)),
            color: Rgb::WHITE,
        });
        assert!(line.contains(50, 4));
        assert!(!line.contains(50, 5));
        assert!(!line.contains(110, 0));

        let dot = cached(Shape::Line {
            segment: Segment::new(Point::new(7, 7), Point::new(7, 7)),
            color: Rgb::WHITE,
        });
        assert!(dot.contains(9, 9));
        assert!(!dot.contains(12, 7));
    }

    #[test]
    fn text_box_scales_with_size() {
        let text = cached(Shape::Text {
            pos: Point::new(0, 0),
            text: "abc".into(),
            size: 2,
            color: Rgb::WHITE,
        });
        assert_eq!(text.bounds(), (0, 0, 48, 24));
        assert!(text.contains(48, 24));
        assert!(!text.contains(49, 0));
    }

    #[test]
    fn qr_box_uses_module_scale() {
        let qr = cached(Shape::QrCode {
            pos: Point::new(5, 5),
            data: "hi".into(),
            module_size: 2,
            fg_color: Rgb::BLACK,
            bg_color: Rgb::WHITE,
        });
        assert_eq!(qr.bounds(), (5, 5, 55, 55));
    }

    #[test]
    fn topmost_shape_wins() {
        let mut scene = Scene::new();
        let below = scene.insert(Shape::FilledRect {
            bounds: Bounds::new(0, 0, 50, 50),
            color: Rgb::WHITE,
        });
        let above = scene.insert(Shape::FilledRect {
            bounds: Bounds::new(25, 25, 75, 75),
            color: Rgb::BLACK,
        });

        let view = SceneView::from_scene(&scene);
        assert_eq!(view.shape_at(30, 30), Some(above));
        assert_eq!(view.shape_at(10, 10), Some(below));
        assert_eq!(view.shape_at(100, 100), None);

        scene.move_down(below);
        let view = SceneView::from_scene(&scene);
        assert_eq!(view.shape_at(30, 30), Some(below));
    }

    #[test]
    fn resize_handles() {
        let mut scene = Scene::new();
        let rect = scene.insert(Shape::Rect {
            bounds: Bounds::new(0, 0, 40, 30),
            color: Rgb::WHITE,
        });
        let circle = scene.insert(Shape::Circle {
            disc: Disc::new(Point::new(100, 100), 20),
            color: Rgb::WHITE,
        });
        let line = scene.insert(Shape::Line {
            segment: Segment::from([0, 0, 5, 5]),
            color: Rgb::WHITE,
        });

        let view = SceneView::from_scene(&scene);
        assert!(view.is_over_resize_handle(rect, 45, 25));
        assert!(!view.is_over_resize_handle(rect, 50, 30));
        assert!(view.is_over_resize_handle(circle, 120, 100));
        assert!(!view.is_over_resize_handle(line, 5, 5));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let mut scene = Scene::new();
        let circle = scene.insert(Shape::Circle {
            disc: Disc::new(Point::new(2_147_483_000, 0), 1000),
            color: Rgb::WHITE,
        });
        scene.insert(Shape::QrCode {
            pos: Point::new(i32::MAX, i32::MAX),
            data: "x".into(),
            module_size: 10,
            fg_color: Rgb::BLACK,
            bg_color: Rgb::WHITE,
        });

        let view = SceneView::from_scene(&scene);
        assert_eq!(
            view.get(circle).map(CachedShape::bounds),
            Some((2_147_482_000, -1000, i32::MAX, 1000))
        );
        assert_eq!(view.shape_at(i32::MIN, i32::MIN), None);
        assert!(!view.is_over_resize_handle(circle, i32::MIN, 0));
    }
}
