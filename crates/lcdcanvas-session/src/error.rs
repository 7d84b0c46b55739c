use lcdcanvas_core::{ShapeError, ShapeKind};
use thiserror::Error;

/// An editing operation given a value the shape cannot hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Invalid(#[from] ShapeError),

    #[error("{0} shapes are placed with a click, not drawn by dragging")]
    NotDraggable(ShapeKind),
}
