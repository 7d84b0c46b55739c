//! Source listing export.
//!
//! Turns a scene into call statements for the controller's drawing library,
//! one per line: `screen.fillRect(10,20,100,50);`. The library takes color
//! per call, so `setColor` and `flush` lines are dropped from the listing.

use std::path::Path;

use anyhow::{Context, Result};
use lcdcanvas_core::Scene;

use crate::command::{FIELD_SEPARATOR, Verb};
use crate::translate::scene_lines;

/// Protocol verb to drawing library function
pub const EXPORT_FUNCTIONS: [(Verb, &str); 9] = [
    (Verb::DrawRect, "screen.drawRect"),
    (Verb::DrawFillRect, "screen.fillRect"),
    (Verb::DrawRoundRect, "screen.drawRoundRect"),
    (Verb::DrawFillRoundRect, "screen.fillRoundRect"),
    (Verb::DrawCircleOutline, "screen.drawCircle"),
    (Verb::DrawFillCircle, "screen.fillCircle"),
    (Verb::DrawLine, "screen.drawLine"),
    (Verb::Prt, "screen.drawString"),
    (Verb::DrawQrCode, "screen.qrcode"),
];

/// Library function for a wire verb; verbs without a mapping keep their name
pub fn export_function(verb: &str) -> &str {
    EXPORT_FUNCTIONS
        .iter()
        .find(|(v, _)| v.as_str() == verb)
        .map_or(verb, |&(_, function)| function)
}

/// Statement for one command line, or `None` for state-only commands
pub fn listing_statement(line: &str) -> Option<String> {
    let mut parts = line.split(FIELD_SEPARATOR);
    let verb = parts.next()?;
    if verb.is_empty() || verb == Verb::SetColor.as_str() || verb == Verb::Flush.as_str() {
        return None;
    }
    let args: Vec<&str> = parts.collect();
    Some(format!("{}({});", export_function(verb), args.join(",")))
}

/// Export a scene as a listing, each statement newline-terminated
pub fn export_listing(scene: &Scene) -> String {
    let mut output = String::new();
    for statement in scene_lines(scene).iter().filter_map(|line| listing_statement(line)) {
        output.push_str(&statement);
        output.push('\n');
    }
    output
}

/// Save a listing to a file
pub fn save_listing(scene: &Scene, path: &Path) -> Result<()> {
    std::fs::write(path, export_listing(scene))
        .with_context(|| format!("Failed to export to {:?}", path))?;
    Ok(())
}

/// Save the raw command lines to a file, e.g. for replay with another tool
pub fn save_commands(scene: &Scene, path: &Path) -> Result<()> {
    let mut content = scene_lines(scene).join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to save commands to {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcdcanvas_core::{Bounds, Point, Rgb, Shape};

    #[test]
    fn plain_rect_is_one_statement() {
        let scene = Scene::from_shapes([Shape::Rect {
            bounds: Bounds::new(0, 0, 10, 10),
            color: Rgb::WHITE,
        }]);
        assert_eq!(export_listing(&scene), "screen.drawRect(0,0,10,10);\n");
    }

    #[test]
    fn every_mapped_verb() {
        let scene = Scene::from_shapes([
            Shape::FilledRect { bounds: Bounds::new(10, 20, 110, 70), color: Rgb::new(255, 0, 0) },
            Shape::FilledRoundRect {
                bounds: Bounds::new(0, 0, 50, 50),
                radius: Some(5),
                color: Rgb::WHITE,
            },
            Shape::Text {
                pos: Point::new(1, 2),
                text: "Hi there".into(),
                size: 2,
                color: Rgb::WHITE,
            },
            Shape::QrCode {
                pos: Point::new(5, 5),
                data: "hi".into(),
                module_size: 2,
                fg_color: Rgb::BLACK,
                bg_color: Rgb::WHITE,
            },
        ]);
        let listing = export_listing(&scene);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(
            lines,
            [
                "screen.fillRect(10,20,100,50);",
                "screen.fillRoundRect(0,0,50,50,5);",
                "screen.drawString(Hi there,1,2,2);",
                "screen.qrcode(hi,5,5,2,255,255,255,0,0,0);",
            ]
        );
    }

    #[test]
    fn state_commands_are_dropped() {
        assert_eq!(listing_statement("setColor|1|2|3"), None);
        assert_eq!(listing_statement("flush"), None);
        assert_eq!(listing_statement(""), None);
        assert_eq!(listing_statement("clear|0|0|0").as_deref(), Some("clear(0,0,0);"));
    }

    #[test]
    fn function_table() {
        assert_eq!(export_function("drawCircleOutline"), "screen.drawCircle");
        assert_eq!(export_function("drawFillCircle"), "screen.fillCircle");
        assert_eq!(export_function("drawLine"), "screen.drawLine");
        assert_eq!(export_function("drawRoundRect"), "screen.drawRoundRect");
        assert_eq!(export_function("beep"), "beep");
    }

    #[test]
    fn empty_scene_exports_nothing() {
        assert_eq!(export_listing(&Scene::new()), "");
    }

    #[test]
    fn writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::from_shapes([Shape::Rect {
            bounds: Bounds::new(0, 0, 10, 10),
            color: Rgb::WHITE,
        }]);

        let listing = dir.path().join("design.ino.txt");
        save_listing(&scene, &listing).unwrap();
        assert_eq!(std::fs::read_to_string(&listing).unwrap(), "screen.drawRect(0,0,10,10);\n");

        let commands = dir.path().join("design.cmd");
        save_commands(&scene, &commands).unwrap();
        assert_eq!(
            std::fs::read_to_string(&commands).unwrap(),
            "setColor|255|255|255\ndrawRect|0|0|10|10\nflush\n"
        );
    }
}
