mod config;

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use lcdcanvas_core::file_io;
use lcdcanvas_core::{
    Disc, Point, Rgb, SCREEN_HEIGHT, SCREEN_WIDTH, Scene, Shape, ShapeId, ShapeKind,
};
use lcdcanvas_export::{export_listing, save_listing, scene_lines};
use lcdcanvas_link::{BaudRate, LinkSession, SerialOpener, list_ports};
use lcdcanvas_session::{EditorSession, Tool};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;

/// Crates whose logs are shown by default
const LOG_TARGETS: [&str; 5] = [
    "lcdcanvas",
    "lcdcanvas_core",
    "lcdcanvas_export",
    "lcdcanvas_session",
    "lcdcanvas_link",
];

/// Design layouts for a serial LCD and send them to the display
#[derive(Parser, Debug)]
#[command(name = "lcdcanvas")]
#[command(version, about, long_about = None)]
struct Args {
    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports
    Ports,

    /// Print the layers of a design, bottom first
    Layers { design: PathBuf },

    /// Print the command lines a design is sent as
    Commands { design: PathBuf },

    /// Export a design as drawing library calls
    Export {
        design: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Add a shape on top of a design, creating the file if needed
    Add {
        design: PathBuf,
        kind: ShapeKind,
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Delete a layer
    Delete { design: PathBuf, layer: usize },

    /// Move a layer one step toward the top of the list
    Raise { design: PathBuf, layer: usize },

    /// Move a layer one step toward the bottom of the list
    Lower { design: PathBuf, layer: usize },

    /// Move a layer by an offset
    Nudge {
        design: PathBuf,
        layer: usize,
        #[arg(allow_negative_numbers = true)]
        dx: i32,
        #[arg(allow_negative_numbers = true)]
        dy: i32,
    },

    /// Change the drawing color of a layer
    Recolor {
        design: PathBuf,
        layer: usize,
        /// `R,G,B` or `#rrggbb`
        color: Rgb,
    },

    /// Clear the display and draw a design on it
    Send {
        design: PathBuf,
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Clear the display
    Clear {
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Send one raw command line and print the response
    Raw {
        line: String,
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Print the config file location and the settings in effect
    Config {
        /// Write the settings in effect to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct ShapeArgs {
    /// First corner or start point, `X,Y`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: Option<Point>,
    /// Opposite corner or end point, `X,Y`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: Option<Point>,
    /// Circle center, `X,Y`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    center: Option<Point>,
    /// Circle radius or corner radius
    #[arg(long)]
    radius: Option<i32>,
    /// Text or QR position, `X,Y`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    at: Option<Point>,
    #[arg(long)]
    text: Option<String>,
    /// Text size, 1-5
    #[arg(long)]
    size: Option<u8>,
    /// QR payload
    #[arg(long)]
    data: Option<String>,
    /// QR module size in pixels, 1-10
    #[arg(long, default_value_t = 2)]
    module_size: u8,
    /// Drawing color, `R,G,B` or `#rrggbb`
    #[arg(long)]
    color: Option<Rgb>,
}

#[derive(ClapArgs, Debug, Default)]
struct LinkArgs {
    /// Serial port, e.g. /dev/ttyUSB0 or COM3
    #[arg(short, long)]
    port: Option<String>,
    #[arg(short, long)]
    baud: Option<BaudRate>,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|_| format!("expected X,Y, got {s:?}"))
    };
    match s.split_once(',') {
        Some((x, y)) => Ok(Point::new(parse(x)?, parse(y)?)),
        None => Err(format!("expected X,Y, got {s:?}")),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let directives = LOG_TARGETS.map(|target| format!("{target}={level}")).join(",");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::load();
    run(args.command, &config)
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Ports => {
            let ports = list_ports().context("Failed to enumerate serial ports")?;
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for port in ports {
                if port.description.is_empty() {
                    println!("{}", port.name);
                } else {
                    println!("{}\t{}", port.name, port.description);
                }
            }
        }
        Command::Layers { design } => print!("{}", layer_listing(&load(&design)?)),
        Command::Commands { design } => {
            for line in scene_lines(&load(&design)?) {
                println!("{line}");
            }
        }
        Command::Export { design, output } => {
            let scene = load(&design)?;
            match output {
                Some(path) => {
                    save_listing(&scene, &path)?;
                    info!(path = %path.display(), "listing exported");
                }
                None => print!("{}", export_listing(&scene)),
            }
        }
        Command::Add { design, kind, shape } => {
            let mut editor = open_or_create(&design)?;
            let id = add_shape(&mut editor, config, kind, &shape)?;
            editor.save(&design)?;
            let scene = editor.scene();
            if let Some(line) = scene.position(id).and_then(|index| scene.describe(index)) {
                println!("{line}");
            }
        }
        Command::Delete { design, layer } => {
            edit_layer(&design, layer, |editor| Ok(editor.delete_selected().is_some()))?
        }
        Command::Raise { design, layer } => {
            edit_layer(&design, layer, |editor| Ok(editor.raise_selected()))?
        }
        Command::Lower { design, layer } => {
            edit_layer(&design, layer, |editor| Ok(editor.lower_selected()))?
        }
        Command::Nudge { design, layer, dx, dy } => {
            edit_layer(&design, layer, |editor| Ok(editor.move_selected(dx, dy)?))?
        }
        Command::Recolor { design, layer, color } => edit_layer(&design, layer, |editor| {
            if matches!(editor.selected_shape(), Some(Shape::QrCode { .. })) {
                warn!("QR codes keep their own black on white colors");
            }
            Ok(editor.recolor_selected(Some(color))?)
        })?,
        Command::Send { design, link } => {
            let scene = load(&design)?;
            let mut session = connect(config, &link)?;
            let report = session.send_scene(&scene, |item, total| {
                debug!(item, total, "sending shape");
                ControlFlow::Continue(())
            })?;
            session.disconnect();
            println!("sent {} of {} shapes", report.items, report.total);
        }
        Command::Clear { link } => {
            let mut session = connect(config, &link)?;
            session.clear_screen()?;
            session.disconnect();
        }
        Command::Raw { line, link } => {
            let mut session = connect(config, &link)?;
            let response = session.send_command(&line)?;
            session.disconnect();
            println!("{response}");
        }
        Command::Config { init } => {
            let path = Config::config_path();
            if init {
                config.save_to(&path)?;
                info!(path = %path.display(), "config written");
            }
            println!("# {}", path.display());
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

fn load(design: &Path) -> Result<Scene> {
    file_io::load_scene(design).with_context(|| format!("Failed to open design {:?}", design))
}

fn open_or_create(design: &Path) -> Result<EditorSession> {
    let mut editor = EditorSession::new();
    if design.exists() {
        editor
            .load(design)
            .with_context(|| format!("Failed to open design {:?}", design))?;
    }
    Ok(editor)
}

/// One line per layer, numbered from 1 in draw order
fn layer_listing(scene: &Scene) -> String {
    (0..scene.len())
        .filter_map(|index| scene.describe(index))
        .map(|line| line + "\n")
        .collect()
}

fn connect(config: &Config, link: &LinkArgs) -> Result<LinkSession<SerialOpener>> {
    let Some(port) = link.port.as_deref().or(config.port.as_deref()) else {
        bail!(
            "no serial port given; pass --port or set \"port\" in {:?}",
            Config::config_path()
        );
    };
    let baud = link.baud.unwrap_or(config.baud);

    let mut session = LinkSession::new(SerialOpener, config.timing.link_config());
    session.connect(port, baud)?;
    Ok(session)
}

fn required<T: Copy>(value: Option<T>, flag: &str, kind: ShapeKind) -> Result<T> {
    value.with_context(|| format!("{kind} needs --{flag}"))
}

/// Create a shape from command line flags through the editor, the same way a
/// drag or a prompt would
fn add_shape(
    editor: &mut EditorSession,
    config: &Config,
    kind: ShapeKind,
    args: &ShapeArgs,
) -> Result<ShapeId> {
    editor.color = args.color.unwrap_or(config.color);

    let id = match kind {
        ShapeKind::Rect
        | ShapeKind::FilledRect
        | ShapeKind::RoundRect
        | ShapeKind::FilledRoundRect
        | ShapeKind::Line => {
            let from = required(args.from, "from", kind)?;
            let to = required(args.to, "to", kind)?;
            editor.tool = Tool::Draw(kind);
            let id = editor
                .draw(from, to)?
                .with_context(|| format!("{kind} could not be drawn"))?;
            if matches!(kind, ShapeKind::RoundRect | ShapeKind::FilledRoundRect) {
                editor.confirm_radius(id, args.radius)?;
            }
            id
        }
        ShapeKind::Circle | ShapeKind::FilledCircle => {
            let center = required(args.center, "center", kind)?;
            let r = required(args.radius, "radius", kind)?;
            let disc = Disc::new(center, r);
            let color = editor.color;
            let shape = if kind == ShapeKind::Circle {
                Shape::Circle { disc, color }
            } else {
                Shape::FilledCircle { disc, color }
            };
            editor.add_shape(shape)?
        }
        ShapeKind::Text => {
            let at = required(args.at, "at", kind)?;
            editor.set_text_size(args.size.unwrap_or(config.text_size))?;
            editor
                .place_text(at, args.text.clone())?
                .context("text needs a non-empty --text")?
        }
        ShapeKind::QrCode => {
            let at = required(args.at, "at", kind)?;
            editor
                .place_qr(at, args.data.clone(), Some(args.module_size))?
                .context("qrcode needs a non-empty --data")?
        }
    };
    let anchor = editor.scene().get(id).map(Shape::anchor);
    if let Some(anchor) = anchor.filter(|&anchor| !on_screen(anchor)) {
        warn!(%anchor, "{kind} starts outside the {SCREEN_WIDTH}x{SCREEN_HEIGHT} screen");
    }
    Ok(id)
}

fn on_screen(point: Point) -> bool {
    (0..SCREEN_WIDTH).contains(&point.x) && (0..SCREEN_HEIGHT).contains(&point.y)
}

/// Load a design, select a layer by its listed number, apply an edit and
/// save if anything changed
fn edit_layer(
    design: &Path,
    layer: usize,
    edit: impl FnOnce(&mut EditorSession) -> Result<bool>,
) -> Result<()> {
    let mut editor = EditorSession::new();
    editor
        .load(design)
        .with_context(|| format!("Failed to open design {:?}", design))?;

    let Some(id) = layer.checked_sub(1).and_then(|index| editor.scene().id_at(index)) else {
        bail!("{:?} has no layer {layer} (it has {})", design, editor.scene().len());
    };
    editor.select(id);

    if edit(&mut editor)? {
        editor.save(design)?;
    } else {
        info!(layer, "nothing changed");
    }
    print!("{}", layer_listing(editor.scene()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lcdcanvas_core::Bounds;

    fn run_args(args: &[&str]) -> Result<()> {
        let args =
            Args::try_parse_from(std::iter::once("lcdcanvas").chain(args.iter().copied()))?;
        run(args.command, &Config::default())
    }

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn points_parse() {
        assert_eq!(parse_point("10,20"), Ok(Point::new(10, 20)));
        assert_eq!(parse_point(" -5, 7"), Ok(Point::new(-5, 7)));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn listing_numbers_layers_from_one() {
        let scene = Scene::from_shapes([
            Shape::Rect { bounds: Bounds::new(3, 0, 5, 5), color: Rgb::WHITE },
            Shape::Text {
                pos: Point::new(5, 6),
                text: "Hi".into(),
                size: 2,
                color: Rgb::WHITE,
            },
        ]);
        assert_eq!(layer_listing(&scene), "1. rect at (3, 0)\n2. text - 'Hi' at (5, 6)\n");
    }

    #[test]
    fn add_edit_and_reorder_a_design() {
        let dir = tempfile::tempdir().unwrap();
        let design = dir.path().join("design.json");
        let path = design.to_str().unwrap();

        run_args(&[
            "add", path, "fillrect", "--from", "110,70", "--to", "10,20", "--color", "255,0,0",
        ])
        .unwrap();
        run_args(&["add", path, "roundrect", "--from", "0,0", "--to", "100,100", "--radius", "20"])
            .unwrap();
        run_args(&["add", path, "qrcode", "--at", "5,5", "--data", "hi"]).unwrap();

        let scene = file_io::load_scene(&design).unwrap();
        assert_eq!(
            scene_lines(&scene),
            [
                "setColor|255|0|0",
                "drawFillRect|10|20|100|50",
                "flush",
                "setColor|255|255|255",
                "drawRoundRect|0|0|100|100|20",
                "flush",
                "drawQRCode|hi|5|5|2|255|255|255|0|0|0",
                "flush",
            ]
        );

        run_args(&["raise", path, "3"]).unwrap();
        run_args(&["nudge", path, "1", "-10", "5"]).unwrap();
        run_args(&["recolor", path, "1", "0,0,255"]).unwrap();
        run_args(&["delete", path, "3"]).unwrap();

        let scene = file_io::load_scene(&design).unwrap();
        assert_eq!(
            layer_listing(&scene),
            "1. fillrect at (0, 25)\n2. qrcode - 'hi' at (5, 5)\n"
        );
        assert_eq!(scene_lines(&scene)[0], "setColor|0|0|255");
    }

    #[test]
    fn rejected_shapes_leave_the_design_alone() {
        let dir = tempfile::tempdir().unwrap();
        let design = dir.path().join("design.json");
        let path = design.to_str().unwrap();

        run_args(&["add", path, "line", "--from", "0,0", "--to", "10,10"]).unwrap();
        assert!(
            run_args(&["add", path, "roundrect", "--from", "0,0", "--to", "10,10", "--radius", "9"])
                .is_err()
        );
        assert!(run_args(&["add", path, "text", "--at", "0,0", "--text", "a|b"]).is_err());
        assert!(run_args(&["add", path, "circle", "--center", "5,5"]).is_err());
        assert!(run_args(&["delete", path, "2"]).is_err());
        assert!(run_args(&["delete", path, "0"]).is_err());
        assert!(run_args(&["add", path, "circle", "--center", "2147483000,0", "--radius", "1000"])
            .is_err());

        assert_eq!(file_io::load_scene(&design).unwrap().len(), 1);
    }

    #[test]
    fn nudging_past_the_coordinate_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let design = dir.path().join("design.json");
        let path = design.to_str().unwrap();

        run_args(&["add", path, "rect", "--from", "0,0", "--to", "10,10"]).unwrap();
        let before = std::fs::read_to_string(&design).unwrap();

        let err = run_args(&["nudge", path, "1", "40000", "0"]).unwrap_err();
        assert!(err.to_string().contains("outside"), "{err}");
        assert!(run_args(&["nudge", path, "1", "0", "-2147483648"]).is_err());
        assert_eq!(std::fs::read_to_string(&design).unwrap(), before);
    }

    #[test]
    fn text_size_only_applies_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let design = dir.path().join("design.json");
        let path = design.to_str().unwrap();

        let mut editor = EditorSession::new();
        let config = Config { text_size: 9, ..Config::default() };
        let args = ShapeArgs {
            from: Some(Point::new(0, 0)),
            to: Some(Point::new(10, 10)),
            ..ShapeArgs::default()
        };
        assert!(add_shape(&mut editor, &config, ShapeKind::Rect, &args).is_ok());

        run_args(&["add", path, "text", "--at", "0,0", "--text", "Hi", "--size", "4"]).unwrap();
        assert!(run_args(&["add", path, "text", "--at", "0,0", "--text", "Hi", "--size", "6"])
            .is_err());
        assert_eq!(file_io::load_scene(&design).unwrap().len(), 1);
    }

    #[test]
    fn screen_area() {
        assert!(on_screen(Point::new(0, 0)));
        assert!(on_screen(Point::new(SCREEN_WIDTH - 1, SCREEN_HEIGHT - 1)));
        assert!(!on_screen(Point::new(SCREEN_WIDTH, 0)));
        assert!(!on_screen(Point::new(0, -1)));
    }

    #[test]
    fn export_writes_listing() {
        let dir = tempfile::tempdir().unwrap();
        let design = dir.path().join("design.json");
        let output = dir.path().join("design.txt");

        let design = design.to_str().unwrap();

        run_args(&["add", design, "rect", "--from", "0,0", "--to", "10,10"]).unwrap();
        run_args(&["export", design, "-o", output.to_str().unwrap()]).unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "screen.drawRect(0,0,10,10);\n");
    }

    #[test]
    fn sending_needs_a_port() {
        let err = connect(&Config::default(), &LinkArgs::default()).err().unwrap();
        assert!(err.to_string().contains("no serial port given"));
    }
}
