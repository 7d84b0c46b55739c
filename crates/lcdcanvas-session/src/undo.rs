//! Undo/redo manager using scene snapshots.
//!
//! Snapshots are whole scene clones, so shape ids survive an undo and the
//! selection can be kept when its shape still exists.

use lcdcanvas_core::Scene;

/// Manages undo/redo with scene snapshots
pub struct UndoManager {
    /// Scenes as they were before each edit
    undo_stack: Vec<Scene>,
    /// Scenes undone since the last edit
    redo_stack: Vec<Scene>,
    /// Maximum history size
    max_history: usize,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Save current state before mutation
    pub fn save_state(&mut self, scene: &Scene) {
        self.undo_stack.push(scene.clone());
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    /// Step back, returning the scene to restore
    pub fn undo(&mut self, current: &Scene) -> Option<Scene> {
        let prev = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(prev)
    }

    /// Step forward again, returning the scene to restore
    pub fn redo(&mut self, current: &Scene) -> Option<Scene> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(100)
    }
}
