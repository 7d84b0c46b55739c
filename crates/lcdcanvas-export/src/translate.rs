//! Shape to command translation.
//!
//! Every shape except a QR code becomes `setColor`, one draw command and
//! `flush`, in that order: the controller draws with whatever color was set
//! last. QR codes carry both of their colors inline and skip `setColor`.
//! Boxes go out as origin plus width/height, which is what the controller's
//! drawing primitives take.

use lcdcanvas_core::{Bounds, Scene, Shape};

use crate::command::Command;

/// Draw command for a box, rounded only once a radius was confirmed
fn boxed(bounds: &Bounds, radius: Option<i32>, filled: bool) -> Command {
    let (x, y, w, h) = (bounds.x1, bounds.y1, bounds.width(), bounds.height());
    match (radius, filled) {
        (Some(radius), false) => Command::DrawRoundRect { x, y, w, h, radius },
        (Some(radius), true) => Command::DrawFillRoundRect { x, y, w, h, radius },
        (None, false) => Command::DrawRect { x, y, w, h },
        (None, true) => Command::DrawFillRect { x, y, w, h },
    }
}

/// Command group for one shape
pub fn translate_shape(shape: &Shape) -> Vec<Command> {
    let draw = match shape {
        Shape::QrCode { pos, data, module_size, fg_color, bg_color } => {
            return vec![
                Command::DrawQrCode {
                    data: data.clone(),
                    x: pos.x,
                    y: pos.y,
                    module_size: *module_size,
                    bg: *bg_color,
                    fg: *fg_color,
                },
                Command::Flush,
            ];
        }
        Shape::Rect { bounds, .. } => boxed(bounds, None, false),
        Shape::FilledRect { bounds, .. } => boxed(bounds, None, true),
        Shape::RoundRect { bounds, radius, .. } => boxed(bounds, *radius, false),
        Shape::FilledRoundRect { bounds, radius, .. } => boxed(bounds, *radius, true),
        Shape::Circle { disc, .. } => Command::DrawCircleOutline {
            cx: disc.center.x,
            cy: disc.center.y,
            r: disc.r,
        },
        Shape::FilledCircle { disc, .. } => Command::DrawFillCircle {
            cx: disc.center.x,
            cy: disc.center.y,
            r: disc.r,
        },
        Shape::Line { segment, .. } => Command::DrawLine {
            x1: segment.from.x,
            y1: segment.from.y,
            x2: segment.to.x,
            y2: segment.to.y,
        },
        Shape::Text { pos, text, size, .. } => Command::Print {
            text: text.clone(),
            x: pos.x,
            y: pos.y,
            size: *size,
        },
    };

    // Every remaining kind has a drawing color
    let color = shape.color().unwrap_or_default();
    vec![Command::SetColor(color), draw, Command::Flush]
}

/// Wire lines for one shape
pub fn shape_lines(shape: &Shape) -> Vec<String> {
    translate_shape(shape).iter().map(Command::to_string).collect()
}

/// One command group per shape, in draw order
pub fn translate_scene(scene: &Scene) -> Vec<Vec<Command>> {
    scene.shapes().map(translate_shape).collect()
}

/// Every wire line of the scene, in transmission order
pub fn scene_lines(scene: &Scene) -> Vec<String> {
    scene.shapes().flat_map(shape_lines).collect()
}
