use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use webvfx::{
    Consumer, Frame, FrameImage, ImageRequest, PixelFormat, Profile, SceneContentFactory,
    ServiceOpts, Size, TRANSPARENT_PROPERTY,
};

#[derive(Parser, Debug)]
#[command(name = "webvfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a filter to one PNG frame.
    Filter(FilterArgs),
    /// Render one transition frame between two PNG frames.
    Transition(TransitionArgs),
    /// Render a filter over a frame range from a pool of worker threads.
    Sequence(SequenceArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Content resource (`plain:<path>`, `json:<document>`, or a scene JSON path).
    #[arg(long)]
    resource: String,

    /// Effect length in frames.
    #[arg(long, default_value_t = 100)]
    length: i64,

    /// Render wait timeout in milliseconds (0 waits indefinitely).
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Input PNG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG.
    #[arg(long)]
    out: PathBuf,

    /// Frame position within the effect.
    #[arg(long, default_value_t = 0)]
    position: i64,

    /// Render over a transparent white canvas.
    #[arg(long)]
    transparent: bool,
}

#[derive(Parser, Debug)]
struct TransitionArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Frame A (outgoing) PNG.
    #[arg(long)]
    a: PathBuf,

    /// Frame B (incoming) PNG.
    #[arg(long)]
    b: PathBuf,

    /// Output PNG.
    #[arg(long)]
    out: PathBuf,

    /// Frame position within the transition.
    #[arg(long, default_value_t = 0)]
    position: i64,

    /// Output profile as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_profile)]
    profile: Option<Profile>,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Input PNG used for every frame.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Worker threads (defaults to rayon's choice).
    #[arg(long)]
    threads: Option<usize>,

    /// Render over a transparent white canvas.
    #[arg(long)]
    transparent: bool,
}

fn parse_profile(s: &str) -> Result<Profile, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(Profile { width, height })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Filter(args) => cmd_filter(args),
        Command::Transition(args) => cmd_transition(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn service_opts(common: &CommonArgs, profile: Option<Profile>) -> ServiceOpts {
    ServiceOpts {
        profile,
        resource: Some(common.resource.clone()),
        render_timeout: (common.timeout_ms > 0).then(|| Duration::from_millis(common.timeout_ms)),
        ..ServiceOpts::default()
    }
}

fn read_png(path: &Path) -> anyhow::Result<FrameImage> {
    let img = image::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .to_rgba8();
    let size = Size::new(img.width(), img.height());
    Ok(FrameImage::from_bytes(
        img.into_raw(),
        PixelFormat::Rgb24a,
        size,
    )?)
}

fn write_png(path: &Path, frame: &FrameImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let rgba = frame.convert(PixelFormat::Rgb24a);
    image::save_buffer_with_format(
        path,
        &rgba.to_vec(),
        rgba.size.width,
        rgba.size.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let input = read_png(&args.in_path)?;
    let service = webvfx::create_filter(
        Arc::new(SceneContentFactory),
        service_opts(&args.common, None),
    );
    service.set_in_and_out(0, args.common.length - 1);
    if args.transparent {
        service.properties().set_int(TRANSPARENT_PROPERTY, 1);
    }

    let mut frame = Frame::new(args.position, input).with_consumer(Consumer::new());
    service.process_filter(&mut frame)?;
    let out = frame.get_image(ImageRequest::new(PixelFormat::Rgb24a))?;

    write_png(&args.out, &out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_transition(args: TransitionArgs) -> anyhow::Result<()> {
    let a = read_png(&args.a)?;
    let b = read_png(&args.b)?;
    let service = webvfx::create_transition(
        Arc::new(SceneContentFactory),
        service_opts(&args.common, args.profile),
    );
    service.set_in_and_out(0, args.common.length - 1);

    let consumer = Consumer::new();
    let mut a_frame = Frame::new(args.position, a).with_consumer(Arc::clone(&consumer));
    let b_frame = Frame::new(args.position, b).with_consumer(consumer);
    service.process_transition(&mut a_frame, b_frame)?;
    let out = a_frame.get_image(ImageRequest::new(PixelFormat::Rgb24))?;

    write_png(&args.out, &out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let input = read_png(&args.in_path)?;
    let service = webvfx::create_filter(
        Arc::new(SceneContentFactory),
        service_opts(&args.common, None),
    );
    let length = args.common.length.max(1);
    service.set_in_and_out(0, length - 1);
    if args.transparent {
        service.properties().set_int(TRANSPARENT_PROPERTY, 1);
    }
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = args.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("build worker pool")?;
    let consumer = Consumer::new();

    pool.install(|| {
        (0..length).into_par_iter().try_for_each(|position| {
            // Each frame gets its own pixels; the source image is shared read-only.
            let pixels = FrameImage::from_bytes(input.to_vec(), input.format, input.size)?;
            let mut frame = Frame::new(position, pixels).with_consumer(Arc::clone(&consumer));
            service.process_filter(&mut frame)?;
            let out = frame.get_image(ImageRequest::new(PixelFormat::Rgb24a))?;
            write_png(&args.out_dir.join(format!("frame_{position:05}.png")), &out)
        })
    })?;

    consumer.stop();
    eprintln!("wrote {length} frames to {}", args.out_dir.display());
    Ok(())
}
