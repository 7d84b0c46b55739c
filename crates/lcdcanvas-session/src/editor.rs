//! Editing state and the operations a front end drives.
//!
//! Prompts that the user can dismiss (text, QR payload, radius, colors) are
//! passed in as `Option`s. A dismissed prompt is a silent no-op: the
//! operation returns `Ok(None)` or `Ok(false)` and records no history.

use std::path::Path;

use lcdcanvas_core::file_io;
use lcdcanvas_core::shape::{MODULE_SIZES, TEXT_SIZES};
use lcdcanvas_core::{
    Bounds, Disc, FileError, Point, Rgb, Scene, SceneView, Segment, Shape, ShapeError, ShapeId,
    ShapeKind,
};
use tracing::{debug, info};

use crate::error::EditError;
use crate::undo::UndoManager;

/// Pixels moved by one nudge
pub const NUDGE_STEP: i32 = 1;
/// Pixels moved by one nudge with shift held
pub const NUDGE_STEP_FAST: i32 = 10;

/// Active tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Draw(ShapeKind),
}

/// Nudge direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self, step: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -step),
            Direction::Down => (0, step),
            Direction::Left => (-step, 0),
            Direction::Right => (step, 0),
        }
    }
}

/// Everything an editing operation reads or changes
pub struct EditorSession {
    scene: Scene,
    view: SceneView,
    view_stale: bool,
    history: UndoManager,
    selected: Option<ShapeId>,
    pub tool: Tool,
    pub color: Rgb,
    text_size: u8,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::with_scene(Scene::new())
    }

    pub fn with_scene(scene: Scene) -> Self {
        Self {
            view: SceneView::from_scene(&scene),
            scene,
            view_stale: false,
            history: UndoManager::default(),
            selected: None,
            tool: Tool::default(),
            color: Rgb::WHITE,
            text_size: 2,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.scene.get(id))
    }

    pub fn text_size(&self) -> u8 {
        self.text_size
    }

    /// Size used for newly placed text
    pub fn set_text_size(&mut self, size: u8) -> Result<(), EditError> {
        if !TEXT_SIZES.contains(&size) {
            return Err(ShapeError::TextSizeOutOfRange(size).into());
        }
        self.text_size = size;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Picking cache, refreshed if the scene changed since the last call
    pub fn view(&mut self) -> &SceneView {
        if self.view_stale {
            self.view.rebuild(&self.scene);
            self.view_stale = false;
        }
        &self.view
    }

    /// Record the current scene for undo; call right before mutating it
    fn checkpoint(&mut self) {
        self.history.save_state(&self.scene);
        self.view_stale = true;
    }

    fn add(&mut self, shape: Shape) -> Result<ShapeId, EditError> {
        shape.validate()?;
        self.checkpoint();
        let kind = shape.kind();
        let id = self.scene.insert(shape);
        debug!(%id, %kind, "shape added");
        Ok(id)
    }

    /// Append a fully specified shape on top of the scene
    pub fn add_shape(&mut self, shape: Shape) -> Result<ShapeId, EditError> {
        self.add(shape)
    }

    /// Create a shape with the active drawing tool from a drag.
    ///
    /// Boxes span both corners, circles are centered on `from` and pass
    /// through `to`, lines join them. Round rectangles start without a
    /// radius until `confirm_radius` is called.
    pub fn draw(&mut self, from: Point, to: Point) -> Result<Option<ShapeId>, EditError> {
        let Tool::Draw(kind) = self.tool else {
            return Ok(None);
        };
        let color = self.color;
        let shape = match kind {
            ShapeKind::Rect => Shape::Rect { bounds: Bounds::from_corners(from, to), color },
            ShapeKind::FilledRect => Shape::FilledRect {
                bounds: Bounds::from_corners(from, to),
                color,
            },
            ShapeKind::RoundRect => Shape::RoundRect {
                bounds: Bounds::from_corners(from, to),
                radius: None,
                color,
            },
            ShapeKind::FilledRoundRect => Shape::FilledRoundRect {
                bounds: Bounds::from_corners(from, to),
                radius: None,
                color,
            },
            ShapeKind::Circle => Shape::Circle { disc: Disc::through(from, to), color },
            ShapeKind::FilledCircle => Shape::FilledCircle { disc: Disc::through(from, to), color },
            ShapeKind::Line => Shape::Line { segment: Segment::new(from, to), color },
            ShapeKind::Text | ShapeKind::QrCode => return Err(EditError::NotDraggable(kind)),
        };
        self.add(shape).map(Some)
    }

    /// Apply the answer of the radius prompt for a freshly drawn round rectangle.
    ///
    /// `None` means the prompt was dismissed and the corners stay square.
    /// Returns whether a radius was set.
    pub fn confirm_radius(&mut self, id: ShapeId, radius: Option<i32>) -> Result<bool, EditError> {
        let Some(r) = radius else {
            debug!(%id, "radius prompt dismissed, corners stay square");
            return Ok(false);
        };
        let Some(shape) = self.scene.get(id) else {
            return Ok(false);
        };
        let (Shape::RoundRect { bounds, .. } | Shape::FilledRoundRect { bounds, .. }) = shape else {
            return Ok(false);
        };
        let max = bounds.max_radius();
        if r < 1 || r > max {
            return Err(ShapeError::RadiusOutOfRange { radius: r, max }.into());
        }

        self.checkpoint();
        if let Some(Shape::RoundRect { radius, .. } | Shape::FilledRoundRect { radius, .. }) =
            self.scene.get_mut(id)
        {
            *radius = Some(r);
        }
        Ok(true)
    }

    /// Place text at a point with the current color and text size
    pub fn place_text(
        &mut self,
        at: Point,
        text: Option<String>,
    ) -> Result<Option<ShapeId>, EditError> {
        let Some(text) = text.filter(|text| !text.is_empty()) else {
            return Ok(None);
        };
        let shape = Shape::Text { pos: at, text, size: self.text_size, color: self.color };
        self.add(shape).map(Some)
    }

    /// Place a QR placeholder, black on white, at a point
    pub fn place_qr(
        &mut self,
        at: Point,
        data: Option<String>,
        module_size: Option<u8>,
    ) -> Result<Option<ShapeId>, EditError> {
        let data = data.filter(|data| !data.is_empty());
        let (Some(data), Some(module_size)) = (data, module_size) else {
            return Ok(None);
        };
        let shape = Shape::QrCode {
            pos: at,
            data,
            module_size,
            fg_color: Rgb::BLACK,
            bg_color: Rgb::WHITE,
        };
        self.add(shape).map(Some)
    }

    /// Select the topmost shape under the point, or clear the selection
    pub fn select_at(&mut self, at: Point) -> Option<ShapeId> {
        self.selected = self.view().shape_at(at.x, at.y);
        self.selected
    }

    /// Select by id; unknown ids clear the selection
    pub fn select(&mut self, id: ShapeId) -> bool {
        self.selected = self.scene.get(id).map(|_| id);
        self.selected.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Whether the point grabs the selected shape's resize handle
    pub fn is_over_resize_handle(&mut self, at: Point) -> bool {
        match self.selected {
            Some(id) => self.view().is_over_resize_handle(id, at.x, at.y),
            None => false,
        }
    }

    /// Replace the selected shape with an edited copy. Returns false if
    /// nothing is selected or the edit changed nothing. An edit that fails
    /// or produces an invalid shape leaves the scene and history alone.
    fn edit_selected(
        &mut self,
        edit: impl FnOnce(&Shape) -> Result<Shape, ShapeError>,
    ) -> Result<bool, EditError> {
        let Some(id) = self.selected else {
            return Ok(false);
        };
        let Some(current) = self.scene.get(id) else {
            return Ok(false);
        };
        let edited = edit(current)?;
        if edited == *current {
            return Ok(false);
        }
        edited.validate()?;

        self.checkpoint();
        if let Some(shape) = self.scene.get_mut(id) {
            *shape = edited;
        }
        Ok(true)
    }

    /// Translate the selected shape
    pub fn move_selected(&mut self, dx: i32, dy: i32) -> Result<bool, EditError> {
        self.edit_selected(|shape| shape.translated(dx, dy))
    }

    /// Arrow-key move: one pixel, ten with shift
    pub fn nudge_selected(&mut self, direction: Direction, fast: bool) -> Result<bool, EditError> {
        let step = if fast { NUDGE_STEP_FAST } else { NUDGE_STEP };
        let (dx, dy) = direction.delta(step);
        self.move_selected(dx, dy)
    }

    /// Drag the selected shape's resize handle to a point
    pub fn resize_selected(&mut self, to: Point) -> Result<bool, EditError> {
        self.edit_selected(|shape| Ok(shape.resized_to(to)))
    }

    /// Recolor the selected shape. QR codes keep their own colors.
    pub fn recolor_selected(&mut self, color: Option<Rgb>) -> Result<bool, EditError> {
        let Some(color) = color else {
            return Ok(false);
        };
        self.edit_selected(|shape| Ok(shape.clone().with_color(color)))
    }

    /// Replace the text of the selected text shape
    pub fn retext_selected(&mut self, text: Option<String>) -> Result<bool, EditError> {
        let Some(text) = text.filter(|text| !text.is_empty()) else {
            return Ok(false);
        };
        if !matches!(self.selected_shape(), Some(Shape::Text { .. })) {
            return Ok(false);
        }
        self.edit_selected(|shape| {
            let mut edited = shape.clone();
            if let Shape::Text { text: current, .. } = &mut edited {
                *current = text;
            }
            Ok(edited)
        })
    }

    /// Change the size of the selected text shape
    pub fn resize_selected_text(&mut self, size: Option<u8>) -> Result<bool, EditError> {
        let Some(size) = size else {
            return Ok(false);
        };
        if !TEXT_SIZES.contains(&size) {
            return Err(ShapeError::TextSizeOutOfRange(size).into());
        }
        if !matches!(self.selected_shape(), Some(Shape::Text { .. })) {
            return Ok(false);
        }
        self.edit_selected(|shape| {
            let mut edited = shape.clone();
            if let Shape::Text { size: current, .. } = &mut edited {
                *current = size;
            }
            Ok(edited)
        })
    }

    /// Change the module size of the selected QR placeholder
    pub fn resize_selected_qr(&mut self, module_size: Option<u8>) -> Result<bool, EditError> {
        let Some(module_size) = module_size else {
            return Ok(false);
        };
        if !MODULE_SIZES.contains(&module_size) {
            return Err(ShapeError::ModuleSizeOutOfRange(module_size).into());
        }
        self.edit_selected(|shape| {
            let mut edited = shape.clone();
            if let Shape::QrCode { module_size: current, .. } = &mut edited {
                *current = module_size;
            }
            Ok(edited)
        })
    }

    /// Delete the selected shape and clear the selection
    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.selected.take()?;
        self.scene.get(id)?;
        self.checkpoint();
        let removed = self.scene.remove(id);
        debug!(%id, "shape deleted");
        removed
    }

    /// Move the selected layer one step toward the top of the layer list
    pub fn raise_selected(&mut self) -> bool {
        self.reorder_selected(Scene::move_up)
    }

    /// Move the selected layer one step toward the bottom of the layer list
    pub fn lower_selected(&mut self) -> bool {
        self.reorder_selected(Scene::move_down)
    }

    fn reorder_selected(&mut self, reorder: fn(&mut Scene, ShapeId) -> bool) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let mut reordered = self.scene.clone();
        if !reorder(&mut reordered, id) {
            return false;
        }
        self.checkpoint();
        self.scene = reordered;
        true
    }

    /// Remove every shape
    pub fn clear(&mut self) {
        if self.scene.is_empty() {
            return;
        }
        self.checkpoint();
        self.scene.clear();
        self.selected = None;
        info!("scene cleared");
    }

    /// Replace the scene with a design file. On failure the current scene
    /// and selection are left exactly as they were.
    pub fn load(&mut self, path: &Path) -> Result<(), FileError> {
        let shapes = file_io::load_shapes(path)?;
        self.checkpoint();
        self.scene.replace_all(shapes);
        self.selected = None;
        info!(path = %path.display(), layers = self.scene.len(), "design loaded");
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), FileError> {
        file_io::save_scene(&self.scene, path)?;
        info!(path = %path.display(), layers = self.scene.len(), "design saved");
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.scene) else {
            return false;
        };
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.scene) else {
            return false;
        };
        self.restore(next);
        true
    }

    fn restore(&mut self, scene: Scene) {
        self.scene = scene;
        self.view_stale = true;
        self.selected = self.selected.filter(|&id| self.scene.get(id).is_some());
    }
}
