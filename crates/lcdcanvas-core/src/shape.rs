//! Shape records for the LCD canvas.
//!
//! `Shape` is the closed set of primitives the display controller can draw.
//! Each variant carries only its own fields. The serde form is the tagged
//! object stored in design files:
//! `{"type": "rect", "coords": [x1, y1, x2, y2], "color": [r, g, b]}`.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ShapeError;

/// QR placeholders are `module_size * QR_SCALE` pixels square
pub const QR_SCALE: i32 = 25;

pub const TEXT_SIZES: RangeInclusive<u8> = 1..=5;
pub const MODULE_SIZES: RangeInclusive<u8> = 1..=10;

/// Glyph cell of the device font at text size 1
pub const GLYPH_WIDTH: i32 = 8;
pub const GLYPH_HEIGHT: i32 = 12;

/// Coordinates and radii the controller's drawing library can take (`int16_t`)
pub const COORD_MIN: i32 = i16::MIN as i32;
pub const COORD_MAX: i32 = i16::MAX as i32;

/// Move one coordinate, staying inside the controller's range
fn shift(value: i32, delta: i32) -> Result<i32, ShapeError> {
    value
        .checked_add(delta)
        .filter(|moved| (COORD_MIN..=COORD_MAX).contains(moved))
        .ok_or(ShapeError::CoordinateOutOfRange(i64::from(value) + i64::from(delta)))
}

fn check_coords(values: &[i32]) -> Result<(), ShapeError> {
    match values.iter().find(|v| !(COORD_MIN..=COORD_MAX).contains(*v)) {
        Some(&v) => Err(ShapeError::CoordinateOutOfRange(i64::from(v))),
        None => Ok(()),
    }
}

/// A pixel position on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Moved copy, or an error if it would leave the coordinate range
    pub fn offset(self, dx: i32, dy: i32) -> Result<Self, ShapeError> {
        Ok(Self::new(shift(self.x, dx)?, shift(self.y, dy)?))
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned box given by two corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Bounds {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box spanned by two arbitrary drag points, top-left corner first
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn is_normalized(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Largest corner radius the device accepts for this box
    pub fn max_radius(&self) -> i32 {
        (self.width() / 2).min(self.height() / 2)
    }

    /// Inclusive containment
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }

    fn offset(self, dx: i32, dy: i32) -> Result<Self, ShapeError> {
        Ok(Self::new(
            shift(self.x1, dx)?,
            shift(self.y1, dy)?,
            shift(self.x2, dx)?,
            shift(self.y2, dy)?,
        ))
    }
}

impl From<[i32; 4]> for Bounds {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<Bounds> for [i32; 4] {
    fn from(b: Bounds) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Line endpoints, kept in drawing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

impl From<[i32; 4]> for Segment {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }
}

impl From<Segment> for [i32; 4] {
    fn from(s: Segment) -> Self {
        [s.from.x, s.from.y, s.to.x, s.to.y]
    }
}

/// Circle center and radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Disc {
    pub center: Point,
    pub r: i32,
}

impl Disc {
    pub const fn new(center: Point, r: i32) -> Self {
        Self { center, r }
    }

    /// Disc centered at `center` whose edge passes through `edge`
    pub fn through(center: Point, edge: Point) -> Self {
        Self::new(center, distance(center, edge))
    }
}

impl From<[i32; 3]> for Disc {
    fn from([cx, cy, r]: [i32; 3]) -> Self {
        Self::new(Point::new(cx, cy), r)
    }
}

impl From<Disc> for [i32; 3] {
    fn from(d: Disc) -> Self {
        [d.center.x, d.center.y, d.r]
    }
}

/// Whole-pixel Euclidean distance, rounded down
fn distance(a: Point, b: Point) -> i32 {
    let dx = f64::from(b.x) - f64::from(a.x);
    let dy = f64::from(b.y) - f64::from(a.y);
    dx.hypot(dy).floor() as i32
}

/// Discriminant of [`Shape`], named the way design files name it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rect,
    FilledRect,
    RoundRect,
    FilledRoundRect,
    Circle,
    FilledCircle,
    Line,
    Text,
    QrCode,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 9] = [
        ShapeKind::Rect,
        ShapeKind::FilledRect,
        ShapeKind::RoundRect,
        ShapeKind::FilledRoundRect,
        ShapeKind::Circle,
        ShapeKind::FilledCircle,
        ShapeKind::Line,
        ShapeKind::Text,
        ShapeKind::QrCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::FilledRect => "fillrect",
            ShapeKind::RoundRect => "roundrect",
            ShapeKind::FilledRoundRect => "fillroundrect",
            ShapeKind::Circle => "circle",
            ShapeKind::FilledCircle => "fillcircle",
            ShapeKind::Line => "line",
            ShapeKind::Text => "text",
            ShapeKind::QrCode => "qrcode",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ShapeError::UnknownKind(s.to_string()))
    }
}

fn default_qr_fg() -> Rgb {
    Rgb::BLACK
}

fn default_qr_bg() -> Rgb {
    Rgb::WHITE
}

/// One drawable element of a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    /// Outlined rectangle
    #[serde(rename = "rect")]
    Rect {
        #[serde(rename = "coords")]
        bounds: Bounds,
        color: Rgb,
    },
    /// Solid rectangle
    #[serde(rename = "fillrect")]
    FilledRect {
        #[serde(rename = "coords")]
        bounds: Bounds,
        color: Rgb,
    },
    /// Outlined rectangle with rounded corners; square until a radius is confirmed
    #[serde(rename = "roundrect")]
    RoundRect {
        #[serde(rename = "coords")]
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<i32>,
        color: Rgb,
    },
    /// Solid rectangle with rounded corners; square until a radius is confirmed
    #[serde(rename = "fillroundrect")]
    FilledRoundRect {
        #[serde(rename = "coords")]
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<i32>,
        color: Rgb,
    },
    #[serde(rename = "circle")]
    Circle {
        #[serde(rename = "coords")]
        disc: Disc,
        color: Rgb,
    },
    #[serde(rename = "fillcircle")]
    FilledCircle {
        #[serde(rename = "coords")]
        disc: Disc,
        color: Rgb,
    },
    #[serde(rename = "line")]
    Line {
        #[serde(rename = "coords")]
        segment: Segment,
        color: Rgb,
    },
    /// Text anchored at its top-left corner
    #[serde(rename = "text")]
    Text {
        #[serde(rename = "coords")]
        pos: Point,
        text: String,
        size: u8,
        color: Rgb,
    },
    /// QR placeholder; the controller firmware encodes `data` itself
    #[serde(rename = "qrcode")]
    QrCode {
        #[serde(rename = "coords")]
        pos: Point,
        data: String,
        module_size: u8,
        #[serde(default = "default_qr_fg")]
        fg_color: Rgb,
        #[serde(default = "default_qr_bg")]
        bg_color: Rgb,
    },
}

/// Rejects content that would break a `|`-delimited command line
fn check_field(field: &'static str, value: &str) -> Result<(), ShapeError> {
    if value.contains(['|', '\n', '\r']) {
        return Err(ShapeError::ReservedCharacter { field });
    }
    Ok(())
}

fn check_bounds(bounds: &Bounds) -> Result<(), ShapeError> {
    check_coords(&[bounds.x1, bounds.y1, bounds.x2, bounds.y2])?;
    if bounds.is_normalized() {
        Ok(())
    } else {
        Err(ShapeError::Unnormalized {
            x1: bounds.x1,
            y1: bounds.y1,
            x2: bounds.x2,
            y2: bounds.y2,
        })
    }
}

/// Keeps a corner radius legal after the box changed size
fn fit_radius(radius: Option<i32>, bounds: &Bounds) -> Option<i32> {
    let max = bounds.max_radius();
    radius.and_then(|r| if max > 0 { Some(r.min(max)) } else { None })
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::FilledRect { .. } => ShapeKind::FilledRect,
            Shape::RoundRect { .. } => ShapeKind::RoundRect,
            Shape::FilledRoundRect { .. } => ShapeKind::FilledRoundRect,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::FilledCircle { .. } => ShapeKind::FilledCircle,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Text { .. } => ShapeKind::Text,
            Shape::QrCode { .. } => ShapeKind::QrCode,
        }
    }

    /// Drawing color; QR codes carry their own pair of colors instead
    pub fn color(&self) -> Option<Rgb> {
        match self {
            Shape::Rect { color, .. }
            | Shape::FilledRect { color, .. }
            | Shape::RoundRect { color, .. }
            | Shape::FilledRoundRect { color, .. }
            | Shape::Circle { color, .. }
            | Shape::FilledCircle { color, .. }
            | Shape::Line { color, .. }
            | Shape::Text { color, .. } => Some(*color),
            Shape::QrCode { .. } => None,
        }
    }

    /// Recolored copy. QR codes are returned unchanged.
    pub fn with_color(mut self, new_color: Rgb) -> Self {
        match &mut self {
            Shape::Rect { color, .. }
            | Shape::FilledRect { color, .. }
            | Shape::RoundRect { color, .. }
            | Shape::FilledRoundRect { color, .. }
            | Shape::Circle { color, .. }
            | Shape::FilledCircle { color, .. }
            | Shape::Line { color, .. }
            | Shape::Text { color, .. } => *color = new_color,
            Shape::QrCode { .. } => {}
        }
        self
    }

    /// First coordinate pair of the record: top-left, center, start point or anchor
    pub fn anchor(&self) -> Point {
        match self {
            Shape::Rect { bounds, .. }
            | Shape::FilledRect { bounds, .. }
            | Shape::RoundRect { bounds, .. }
            | Shape::FilledRoundRect { bounds, .. } => Point::new(bounds.x1, bounds.y1),
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => disc.center,
            Shape::Line { segment, .. } => segment.from,
            Shape::Text { pos, .. } | Shape::QrCode { pos, .. } => *pos,
        }
    }

    /// Check every invariant of the record
    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Shape::Rect { bounds, .. } | Shape::FilledRect { bounds, .. } => check_bounds(bounds),
            Shape::RoundRect { bounds, radius, .. }
            | Shape::FilledRoundRect { bounds, radius, .. } => {
                check_bounds(bounds)?;
                match *radius {
                    Some(r) if r < 1 || r > bounds.max_radius() => {
                        Err(ShapeError::RadiusOutOfRange {
                            radius: r,
                            max: bounds.max_radius(),
                        })
                    }
                    _ => Ok(()),
                }
            }
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => {
                if disc.r < 0 {
                    return Err(ShapeError::NegativeRadius(disc.r));
                }
                check_coords(&[disc.center.x, disc.center.y, disc.r])
            }
            Shape::Line { segment, .. } => check_coords(&[
                segment.from.x,
                segment.from.y,
                segment.to.x,
                segment.to.y,
            ]),
            Shape::Text { pos, text, size, .. } => {
                check_coords(&[pos.x, pos.y])?;
                if text.is_empty() {
                    return Err(ShapeError::EmptyText);
                }
                check_field("text", text)?;
                if !TEXT_SIZES.contains(size) {
                    return Err(ShapeError::TextSizeOutOfRange(*size));
                }
                Ok(())
            }
            Shape::QrCode { pos, data, module_size, .. } => {
                check_coords(&[pos.x, pos.y])?;
                check_field("QR data", data)?;
                if !MODULE_SIZES.contains(module_size) {
                    return Err(ShapeError::ModuleSizeOutOfRange(*module_size));
                }
                Ok(())
            }
        }
    }

    /// Create a translated copy of this shape. Fails instead of wrapping
    /// when a coordinate would leave the controller's range.
    pub fn translated(&self, dx: i32, dy: i32) -> Result<Self, ShapeError> {
        let mut moved = self.clone();
        match &mut moved {
            Shape::Rect { bounds, .. }
            | Shape::FilledRect { bounds, .. }
            | Shape::RoundRect { bounds, .. }
            | Shape::FilledRoundRect { bounds, .. } => *bounds = bounds.offset(dx, dy)?,
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => {
                disc.center = disc.center.offset(dx, dy)?;
            }
            Shape::Line { segment, .. } => {
                segment.from = segment.from.offset(dx, dy)?;
                segment.to = segment.to.offset(dx, dy)?;
            }
            Shape::Text { pos, .. } | Shape::QrCode { pos, .. } => *pos = pos.offset(dx, dy)?,
        }
        Ok(moved)
    }

    /// Copy with the resize handle dragged to `to`.
    ///
    /// Boxes move their bottom-right corner (and are re-normalized), circles
    /// take the distance from the center as the new radius. Other kinds have
    /// no resize handle and come back unchanged.
    pub fn resized_to(&self, to: Point) -> Self {
        let mut resized = self.clone();
        match &mut resized {
            Shape::Rect { bounds, .. } | Shape::FilledRect { bounds, .. } => {
                *bounds = Bounds::from_corners(Point::new(bounds.x1, bounds.y1), to);
            }
            Shape::RoundRect { bounds, radius, .. }
            | Shape::FilledRoundRect { bounds, radius, .. } => {
                *bounds = Bounds::from_corners(Point::new(bounds.x1, bounds.y1), to);
                *radius = fit_radius(*radius, bounds);
            }
            Shape::Circle { disc, .. } | Shape::FilledCircle { disc, .. } => {
                *disc = Disc::through(disc.center, to);
            }
            Shape::Line { .. } | Shape::Text { .. } | Shape::QrCode { .. } => {}
        }
        resized
    }

    /// One-line description used in layer listings, e.g. `text - 'Hi' at (5, 5)`
    pub fn summary(&self) -> String {
        let detail = match self {
            Shape::Text { text, .. } => format!(" - '{text}'"),
            Shape::QrCode { data, .. } => format!(" - '{data}'"),
            _ => String::new(),
        };
        format!("{}{} at {}", self.kind(), detail, self.anchor())
    }
}

/// Pixel extent of a QR placeholder
pub fn qr_extent(module_size: u8) -> i32 {
    i32::from(module_size) * QR_SCALE
}
