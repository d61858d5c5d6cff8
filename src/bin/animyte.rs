use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use animyte::{Composition, DrawCommand, Paint, Renderer};

#[derive(Parser, Debug)]
#[command(name = "animyte", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of an animation document.
    Info(InfoArgs),
    /// Parse a document and report warnings; fails on invalid input.
    Validate(ValidateArgs),
    /// Evaluate one frame and dump its draw commands.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Normalized progress in [0, 1] to evaluate.
    #[arg(long, default_value_t = 0.0)]
    progress: f32,

    /// Color interpolation space.
    #[arg(long, value_enum, default_value_t = MixingChoice::Straight)]
    mixing: MixingChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MixingChoice {
    /// Interpolate color channels as stored.
    Straight,
    /// Interpolate through linear light.
    Gamma,
}

impl From<MixingChoice> for animyte::ColorMixing {
    fn from(choice: MixingChoice) -> Self {
        match choice {
            MixingChoice::Straight => animyte::ColorMixing::Straight,
            MixingChoice::Gamma => animyte::ColorMixing::Gamma,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_composition(path: &PathBuf) -> anyhow::Result<Composition> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    let composition = Composition::from_json(&json)
        .with_context(|| format!("parse document '{}'", path.display()))?;
    Ok(composition)
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let comp = read_composition(&args.in_path)?;
    println!("name:     {}", comp.name.as_deref().unwrap_or("(unnamed)"));
    if let Some(version) = &comp.version {
        println!("version:  {version}");
    }
    println!("canvas:   {}x{}", comp.canvas.width, comp.canvas.height);
    println!(
        "frames:   [{}, {}] @ {} fps ({:.1} ms)",
        comp.range.start,
        comp.range.end,
        comp.frame_rate,
        comp.duration_ms()
    );
    println!("layers:   {}", comp.layers.len());
    println!("assets:   {}", comp.assets.len());
    for marker in &comp.markers {
        println!(
            "marker:   {:?} [{}, {}]",
            marker.name,
            marker.start_frame,
            marker.end_frame()
        );
    }
    for warning in &comp.warnings {
        println!("warning:  {warning}");
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let comp = read_composition(&args.in_path)?;
    for warning in &comp.warnings {
        println!("warning: {warning}");
    }
    println!(
        "ok: {} ({} layers, {} warnings)",
        args.in_path.display(),
        comp.layers.len(),
        comp.warnings.len()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let comp = Arc::new(read_composition(&args.in_path)?);
    let frame = comp.frame_for_progress(args.progress);
    let mut renderer = Renderer::new(Arc::clone(&comp), args.mixing.into())?;
    renderer.set_progress(args.progress);

    println!("frame {frame} ({} commands)", renderer.display_list().len());
    let mut indent = 0usize;
    for command in renderer.display_list().commands() {
        if matches!(command, DrawCommand::PopLayer | DrawCommand::PopClip) {
            indent = indent.saturating_sub(1);
        }
        println!("{:indent$}{}", "", describe(command), indent = indent * 2);
        if matches!(
            command,
            DrawCommand::PushLayer { .. } | DrawCommand::PushClip { .. }
        ) {
            indent += 1;
        }
    }
    Ok(())
}

fn describe(command: &DrawCommand) -> String {
    match command {
        DrawCommand::Fill { paint, alpha, .. } => {
            format!("fill {} alpha={alpha}", describe_paint(paint))
        }
        DrawCommand::Stroke { paint, style, alpha, .. } => format!(
            "stroke {} width={} alpha={alpha}",
            describe_paint(paint),
            style.width
        ),
        DrawCommand::FillMerged { operands, mode, paint, alpha, .. } => format!(
            "fill-merged {mode:?}({} operands) {} alpha={alpha}",
            operands.len(),
            describe_paint(paint)
        ),
        DrawCommand::StrokeMerged { operands, mode, paint, style, alpha, .. } => format!(
            "stroke-merged {mode:?}({} operands) {} width={} alpha={alpha}",
            operands.len(),
            describe_paint(paint),
            style.width
        ),
        DrawCommand::Image { asset, alpha, .. } => format!("image {asset:?} alpha={alpha}"),
        DrawCommand::PushLayer { alpha, blend, effects } => format!(
            "push-layer alpha={alpha} blend={blend:?} effects={}",
            effects.len()
        ),
        DrawCommand::BeginMatte { mode } => format!("begin-matte {mode:?}"),
        DrawCommand::PopLayer => "pop-layer".into(),
        DrawCommand::PushClip { inverted, alpha, .. } => {
            format!("push-clip inverted={inverted} alpha={alpha}")
        }
        DrawCommand::PopClip => "pop-clip".into(),
    }
}

fn describe_paint(paint: &Paint) -> String {
    match paint {
        Paint::Solid(color) => {
            let [r, g, b, a] = color.to_rgba8();
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
        Paint::Linear { stops, .. } => format!("linear-gradient({} stops)", stops.stop_count()),
        Paint::Radial { stops, .. } => format!("radial-gradient({} stops)", stops.stop_count()),
    }
}
