use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lyricmv", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the computed layout and track summaries as JSON.
    Layout(LayoutArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the project (or a slice of it) as a numbered PNG sequence.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Time in seconds.
    #[arg(long, conflicts_with = "frame")]
    time: Option<f64>,

    /// Frame index (0-based).
    #[arg(long)]
    frame: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Use block glyphs instead of the project font.
    #[arg(long, default_value_t = false)]
    draft: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// First frame to render.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// End frame (exclusive); defaults to the project duration.
    #[arg(long)]
    end: Option<u64>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Enable static-frame elision within chunks.
    #[arg(long, default_value_t = false)]
    static_frame_elision: bool,

    /// Use block glyphs instead of the project font.
    #[arg(long, default_value_t = false)]
    draft: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn backend(draft: bool) -> lyricmv::TextBackend {
    if draft {
        lyricmv::TextBackend::Draft
    } else {
        lyricmv::TextBackend::Font
    }
}

#[derive(serde::Serialize)]
struct LayoutReport<'a> {
    canvas: lyricmv::Canvas,
    layout: &'a lyricmv::LayoutResult,
    tracks: Vec<lyricmv::TrackInfo>,
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let project = lyricmv::Project::from_path(&args.in_path)?;
    let canvas = project.canvas();
    let tracks = project.build_tracks()?;
    let layout = project
        .layout_engine(&tracks)?
        .compute_layout(canvas.width, canvas.height)?;

    let report = LayoutReport {
        canvas,
        layout: &layout,
        tracks: tracks.iter().map(|t| t.info()).collect(),
    };
    let json = serde_json::to_string_pretty(&report).context("serialize layout report")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = lyricmv::Project::from_path(&args.in_path)?;
    let mut scene = project.build(backend(args.draft))?;

    let frame = match (args.time, args.frame) {
        (Some(t), _) => scene.renderer.render_frame(t)?,
        (None, Some(f)) => scene.renderer.render_frame_index(lyricmv::FrameIndex(f))?,
        (None, None) => anyhow::bail!("one of --time or --frame is required"),
    };

    lyricmv::write_png(&args.out, frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = lyricmv::Project::from_path(&args.in_path)?;
    let scene = project.build(backend(args.draft))?;

    let opts = lyricmv::RenderSessionOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        static_frame_elision: args.static_frame_elision,
        channel_capacity: 4,
    };
    let mut sess = lyricmv::RenderSession::new(scene.renderer, opts);
    let mut sink = lyricmv::PngSequenceSink::new(&args.out_dir);

    let end = args.end.unwrap_or_else(|| project.duration_frames());
    let range = lyricmv::FrameRange::new(lyricmv::FrameIndex(args.start), lyricmv::FrameIndex(end))?;
    let stats = sess.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} frames to {} ({} rendered, {} elided)",
        stats.frames_total,
        args.out_dir.display(),
        stats.frames_rendered,
        stats.frames_elided
    );
    Ok(())
}
