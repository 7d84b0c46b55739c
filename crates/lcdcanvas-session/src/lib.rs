//! Editor session for lcdcanvas.
//!
//! Holds the state every editing operation works against: the scene, the
//! active tool and color, the selection and undo history.

pub mod editor;
pub mod error;
pub mod undo;

pub use editor::{Direction, EditorSession, Tool};
pub use error::EditError;
pub use undo::UndoManager;
