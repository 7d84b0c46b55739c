//! Display controller command lines.
//!
//! Each command is one line of `|`-separated fields, verb first:
//! `drawFillRect|10|20|100|50`. The controller keeps the active color as
//! state, so geometry commands carry no color of their own.

use std::fmt;
use std::str::FromStr;

use lcdcanvas_core::Rgb;

use crate::error::ProtocolError;

pub const FIELD_SEPARATOR: char = '|';

/// Protocol verbs, spelled as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    SetColor,
    DrawRect,
    DrawFillRect,
    DrawRoundRect,
    DrawFillRoundRect,
    DrawCircleOutline,
    DrawFillCircle,
    DrawLine,
    Prt,
    DrawQrCode,
    Flush,
    Clear,
}

impl Verb {
    pub const ALL: [Verb; 12] = [
        Verb::SetColor,
        Verb::DrawRect,
        Verb::DrawFillRect,
        Verb::DrawRoundRect,
        Verb::DrawFillRoundRect,
        Verb::DrawCircleOutline,
        Verb::DrawFillCircle,
        Verb::DrawLine,
        Verb::Prt,
        Verb::DrawQrCode,
        Verb::Flush,
        Verb::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::SetColor => "setColor",
            Verb::DrawRect => "drawRect",
            Verb::DrawFillRect => "drawFillRect",
            Verb::DrawRoundRect => "drawRoundRect",
            Verb::DrawFillRoundRect => "drawFillRoundRect",
            Verb::DrawCircleOutline => "drawCircleOutline",
            Verb::DrawFillCircle => "drawFillCircle",
            Verb::DrawLine => "drawLine",
            Verb::Prt => "prt",
            Verb::DrawQrCode => "drawQRCode",
            Verb::Flush => "flush",
            Verb::Clear => "clear",
        }
    }

    /// Number of fields after the verb
    pub fn arity(self) -> usize {
        match self {
            Verb::Flush => 0,
            Verb::SetColor | Verb::Clear => 3,
            Verb::DrawCircleOutline | Verb::DrawFillCircle => 3,
            Verb::DrawRect | Verb::DrawFillRect | Verb::DrawLine | Verb::Prt => 4,
            Verb::DrawRoundRect | Verb::DrawFillRoundRect => 5,
            Verb::DrawQrCode => 10,
        }
    }

    /// Verbs that change device state instead of drawing
    pub fn is_state(self) -> bool {
        matches!(self, Verb::SetColor | Verb::Flush)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownVerb(s.to_string()))
    }
}

/// One command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetColor(Rgb),
    DrawRect { x: i32, y: i32, w: i32, h: i32 },
    DrawFillRect { x: i32, y: i32, w: i32, h: i32 },
    DrawRoundRect { x: i32, y: i32, w: i32, h: i32, radius: i32 },
    DrawFillRoundRect { x: i32, y: i32, w: i32, h: i32, radius: i32 },
    DrawCircleOutline { cx: i32, cy: i32, r: i32 },
    DrawFillCircle { cx: i32, cy: i32, r: i32 },
    DrawLine { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// `prt`: text with its top-left corner at (x, y)
    Print { text: String, x: i32, y: i32, size: u8 },
    /// Self-contained QR draw; colors travel with the command
    DrawQrCode { data: String, x: i32, y: i32, module_size: u8, bg: Rgb, fg: Rgb },
    Flush,
    /// Fill the whole panel with a color
    Clear(Rgb),
}

impl Command {
    /// `clear|0|0|0`
    pub const CLEAR_BLACK: Command = Command::Clear(Rgb::BLACK);

    pub fn verb(&self) -> Verb {
        match self {
            Command::SetColor(_) => Verb::SetColor,
            Command::DrawRect { .. } => Verb::DrawRect,
            Command::DrawFillRect { .. } => Verb::DrawFillRect,
            Command::DrawRoundRect { .. } => Verb::DrawRoundRect,
            Command::DrawFillRoundRect { .. } => Verb::DrawFillRoundRect,
            Command::DrawCircleOutline { .. } => Verb::DrawCircleOutline,
            Command::DrawFillCircle { .. } => Verb::DrawFillCircle,
            Command::DrawLine { .. } => Verb::DrawLine,
            Command::Print { .. } => Verb::Prt,
            Command::DrawQrCode { .. } => Verb::DrawQrCode,
            Command::Flush => Verb::Flush,
            Command::Clear(_) => Verb::Clear,
        }
    }

    /// Fields after the verb, in wire order
    pub fn args(&self) -> Vec<String> {
        fn rgb(c: &Rgb) -> [String; 3] {
            [c.r.to_string(), c.g.to_string(), c.b.to_string()]
        }

        match self {
            Command::SetColor(c) | Command::Clear(c) => rgb(c).to_vec(),
            Command::DrawRect { x, y, w, h } | Command::DrawFillRect { x, y, w, h } => {
                vec![x.to_string(), y.to_string(), w.to_string(), h.to_string()]
            }
            Command::DrawRoundRect { x, y, w, h, radius }
            | Command::DrawFillRoundRect { x, y, w, h, radius } => {
                vec![x.to_string(), y.to_string(), w.to_string(), h.to_string(), radius.to_string()]
            }
            Command::DrawCircleOutline { cx, cy, r } | Command::DrawFillCircle { cx, cy, r } => {
                vec![cx.to_string(), cy.to_string(), r.to_string()]
            }
            Command::DrawLine { x1, y1, x2, y2 } => {
                vec![x1.to_string(), y1.to_string(), x2.to_string(), y2.to_string()]
            }
            Command::Print { text, x, y, size } => {
                vec![text.clone(), x.to_string(), y.to_string(), size.to_string()]
            }
            Command::DrawQrCode { data, x, y, module_size, bg, fg } => {
                let mut args =
                    vec![data.clone(), x.to_string(), y.to_string(), module_size.to_string()];
                args.extend(rgb(bg));
                args.extend(rgb(fg));
                args
            }
            Command::Flush => Vec::new(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb().as_str())?;
        for arg in self.args() {
            write!(f, "{FIELD_SEPARATOR}{arg}")?;
        }
        Ok(())
    }
}

/// Field cursor for parsing one line
struct Fields<'a> {
    verb: Verb,
    fields: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn text(&self, index: usize) -> String {
        self.fields[index].to_string()
    }

    fn num<T: FromStr>(&self, index: usize) -> Result<T, ProtocolError> {
        let value = self.fields[index];
        value.trim().parse().map_err(|_| ProtocolError::BadNumber {
            verb: self.verb.as_str(),
            index: index + 1,
            value: value.to_string(),
        })
    }

    fn rgb(&self, first: usize) -> Result<Rgb, ProtocolError> {
        Ok(Rgb::new(self.num(first)?, self.num(first + 1)?, self.num(first + 2)?))
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ProtocolError::Empty);
        }

        let mut parts = line.split(FIELD_SEPARATOR);
        let verb: Verb = parts.next().unwrap_or_default().parse()?;
        let fields: Vec<&str> = parts.collect();
        if fields.len() != verb.arity() {
            return Err(ProtocolError::FieldCount {
                verb: verb.as_str(),
                expected: verb.arity(),
                found: fields.len(),
            });
        }

        let f = Fields { verb, fields };
        let command = match verb {
            Verb::SetColor => Command::SetColor(f.rgb(0)?),
            Verb::Clear => Command::Clear(f.rgb(0)?),
            Verb::Flush => Command::Flush,
            Verb::DrawRect => Command::DrawRect {
                x: f.num(0)?,
                y: f.num(1)?,
                w: f.num(2)?,
                h: f.num(3)?,
            },
            Verb::DrawFillRect => Command::DrawFillRect {
                x: f.num(0)?,
                y: f.num(1)?,
                w: f.num(2)?,
                h: f.num(3)?,
            },
            Verb::DrawRoundRect => Command::DrawRoundRect {
                x: f.num(0)?,
                y: f.num(1)?,
                w: f.num(2)?,
                h: f.num(3)?,
                radius: f.num(4)?,
            },
            Verb::DrawFillRoundRect => Command::DrawFillRoundRect {
                x: f.num(0)?,
                y: f.num(1)?,
                w: f.num(2)?,
                h: f.num(3)?,
                radius: f.num(4)?,
            },
            Verb::DrawCircleOutline => Command::DrawCircleOutline {
                cx: f.num(0)?,
                cy: f.num(1)?,
                r: f.num(2)?,
            },
            Verb::DrawFillCircle => Command::DrawFillCircle {
                cx: f.num(0)?,
                cy: f.num(1)?,
                r: f.num(2)?,
            },
            Verb::DrawLine => Command::DrawLine {
                x1: f.num(0)?,
                y1: f.num(1)?,
                x2: f.num(2)?,
                y2: f.num(3)?,
            },
            Verb::Prt => Command::Print {
                text: f.text(0),
                x: f.num(1)?,
                y: f.num(2)?,
                size: f.num(3)?,
            },
            Verb::DrawQrCode => Command::DrawQrCode {
                data: f.text(0),
                x: f.num(1)?,
                y: f.num(2)?,
                module_size: f.num(3)?,
                bg: f.rgb(4)?,
                fg: f.rgb(7)?,
            },
        };
        Ok(command)
    }
}
