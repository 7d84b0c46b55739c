//! Core types for lcdcanvas: shape records, the ordered scene, picking and
//! design files.

pub mod color;
pub mod error;
pub mod file_io;
pub mod scene;
pub mod shape;
pub mod view;

pub use color::Rgb;
pub use error::{FileError, ShapeError};
pub use scene::{Layer, Scene, ShapeId};
pub use shape::{Bounds, Disc, Point, Segment, Shape, ShapeKind};
pub use view::SceneView;

/// Panel resolution of the target display
pub const SCREEN_WIDTH: i32 = 480;
pub const SCREEN_HEIGHT: i32 = 320;
