//! Design files: a JSON array of shape records in draw order.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::FileError;
use crate::scene::Scene;
use crate::shape::Shape;

/// Parse and validate design file contents. `path` only labels errors.
pub fn parse_shapes(content: &str, path: &Path) -> Result<Vec<Shape>, FileError> {
    let shapes: Vec<Shape> = serde_json::from_str(content).map_err(|source| FileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for (index, shape) in shapes.iter().enumerate() {
        shape.validate().map_err(|source| FileError::Invalid {
            path: path.to_path_buf(),
            layer: index + 1,
            source,
        })?;
    }

    Ok(shapes)
}

/// Read every shape of a design file. Nothing is returned unless the whole
/// file is valid, so a failed load never touches the caller's scene.
pub fn load_shapes(path: &Path) -> Result<Vec<Shape>, FileError> {
    let content = fs::read_to_string(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_shapes(&content, path)
}

/// Read a design file into a fresh scene
pub fn load_scene(path: &Path) -> Result<Scene, FileError> {
    load_shapes(path).map(Scene::from_shapes)
}

/// Render a scene in design file form, indented by four spaces
pub fn scene_to_json(scene: &Scene, path: &Path) -> Result<String, FileError> {
    let shapes: Vec<&Shape> = scene.shapes().collect();
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    shapes.serialize(&mut ser).map_err(|source| FileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write a scene to a design file
pub fn save_scene(scene: &Scene, path: &Path) -> Result<(), FileError> {
    let content = scene_to_json(scene, path)?;
    fs::write(path, content).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
