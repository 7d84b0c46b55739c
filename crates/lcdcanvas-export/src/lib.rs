//! Display controller protocol for lcdcanvas.
//!
//! - [`command`]: typed command lines and their wire grammar
//! - [`translate`]: shapes and scenes to command groups
//! - [`listing`]: scenes to drawing library call statements

pub mod command;
pub mod error;
pub mod listing;
pub mod translate;

pub use command::{Command, Verb};
pub use error::ProtocolError;
pub use listing::{export_listing, save_commands, save_listing};
pub use translate::{scene_lines, shape_lines, translate_scene, translate_shape};
