//! Error types for shape validation and design file loading.

use std::path::PathBuf;

use thiserror::Error;

/// A shape record that violates one of its geometric or content invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("corners ({x1}, {y1}) / ({x2}, {y2}) are not normalized")]
    Unnormalized { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("corner radius {radius} outside 1..={max}")]
    RadiusOutOfRange { radius: i32, max: i32 },

    #[error("circle radius {0} is negative")]
    NegativeRadius(i32),

    #[error("coordinate {0} outside -32768..=32767")]
    CoordinateOutOfRange(i64),

    #[error("text must not be empty")]
    EmptyText,

    #[error("text size {0} outside 1..=5")]
    TextSizeOutOfRange(u8),

    #[error("QR module size {0} outside 1..=10")]
    ModuleSizeOutOfRange(u8),

    #[error("{field} contains '|' or a line break")]
    ReservedCharacter { field: &'static str },

    #[error("invalid color '{0}' (expected r,g,b or #rrggbb)")]
    BadColor(String),

    #[error("unknown shape type '{0}'")]
    UnknownKind(String),
}

/// Errors that can occur when reading or writing a design file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed design file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("layer {layer} in {path} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        layer: usize,
        #[source]
        source: ShapeError,
    },
}
