use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tourline::{
    AnimationOutcome, ConfigProvider, ExternalParams, FixedStepFrames, FrameSource, Hop,
    IntervalFrames, JsonFileSource, MemoryDisplay, PathRole, PointGraphic, SpatialReference,
    TourConfig, TourController, TourOverrides,
};

#[derive(Parser, Debug)]
#[command(name = "tourline", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a tour and print its hops as JSON.
    Hops(TourArgs),
    /// Replay a tour headlessly and print a summary as JSON.
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct TourArgs {
    /// Stop feature set JSON.
    #[arg(long)]
    stops: Option<PathBuf>,

    /// Route point feature set JSON. Enables the actual route.
    #[arg(long)]
    route: Option<PathBuf>,

    /// Overrides JSON (camelCase keys, every field optional).
    #[arg(long)]
    config: Option<PathBuf>,

    /// External parameter as `name=value`; repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Whole-tour duration in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Target frame rate used to densify great-circle hops.
    #[arg(long)]
    fps: Option<f64>,

    /// Ignore the route and draw great-circle hops.
    #[arg(long, default_value_t = false)]
    great_circle: bool,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    tour: TourArgs,

    /// Pace frames in real time instead of on a virtual clock.
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Display frame rate; defaults to the tour's target frame rate.
    #[arg(long)]
    frame_rate: Option<f64>,
}

#[derive(serde::Serialize)]
struct HopSummary {
    index: usize,
    origin: String,
    origin_sequence: i64,
    destination: String,
    destination_sequence: i64,
    display_vertices: usize,
    animation_vertices: usize,
    planar_length: f64,
}

impl From<(usize, &Hop)> for HopSummary {
    fn from((index, hop): (usize, &Hop)) -> Self {
        Self {
            index,
            origin: hop.origin.name.clone(),
            origin_sequence: hop.origin.sequence,
            destination: hop.destination.name.clone(),
            destination_sequence: hop.destination.sequence,
            display_vertices: hop.display_path.vertex_count(),
            animation_vertices: hop.animation_path.vertex_count(),
            planar_length: hop.display_path.planar_length(),
        }
    }
}

#[derive(serde::Serialize)]
struct TourSummary {
    wkid: u32,
    actual_route: bool,
    hop_duration_ms: u128,
    extent: Option<[f64; 4]>,
    hops: Vec<HopSummary>,
}

#[derive(serde::Serialize)]
struct PlaySummary {
    outcome: AnimationOutcome,
    hops: usize,
    progress_events: usize,
    stops_revealed: usize,
    path_graphics_added: usize,
    completed_length: f64,
    wall_ms: u128,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;
    match cli.cmd {
        Command::Hops(args) => rt.block_on(cmd_hops(args)),
        Command::Play(args) => rt.block_on(cmd_play(args)),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(args: &TourArgs) -> anyhow::Result<TourConfig> {
    let mut overrides = match &args.config {
        Some(path) => TourOverrides::from_path(path)?,
        None => TourOverrides::default(),
    };
    if let Some(stops) = &args.stops {
        overrides.stop_source = Some(stops.to_string_lossy().into_owned());
    }
    if let Some(route) = &args.route {
        overrides.route_source = Some(route.to_string_lossy().into_owned());
    }
    if args.great_circle {
        overrides.use_actual_route = Some(false);
    }
    if let Some(duration) = args.duration {
        overrides.animation_duration_secs = Some(duration);
    }
    if let Some(fps) = args.fps {
        overrides.target_frame_rate = Some(fps);
    }

    let provider = ConfigProvider::new(ExternalParams::parse(&args.params));
    Ok(provider.resolve(&overrides)?)
}

async fn load(
    config: TourConfig,
    memory: &MemoryDisplay,
    frames: Rc<dyn FrameSource>,
) -> anyhow::Result<TourController<JsonFileSource>> {
    let sr = config
        .spatial_reference
        .unwrap_or(SpatialReference::WEB_MERCATOR);
    let display = memory.surface(frames).with_spatial_reference(sr).settled();

    let tour = TourController::connect(display, config, JsonFileSource::new("."))
        .await
        .context("create tour")?;
    if let Some(err) = tour.load_error() {
        anyhow::bail!("load tour: {err}");
    }
    Ok(tour)
}

async fn cmd_hops(args: TourArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args).context("resolve tour configuration")?;
    let memory = MemoryDisplay::new();
    let tour = load(config, &memory, Rc::new(FixedStepFrames::per_second(60.0))).await?;

    let summary = TourSummary {
        wkid: tour.spatial_reference().map_or(0, |sr| sr.wkid),
        actual_route: tour.config().use_actual_route(),
        hop_duration_ms: tour.hop_duration().as_millis(),
        extent: tour.extent().map(|r| [r.x0, r.y0, r.x1, r.y1]),
        hops: tour.hops().iter().enumerate().map(HopSummary::from).collect(),
    };
    let json = serde_json::to_string_pretty(&summary).context("serialize hop summary")?;
    println!("{json}");
    Ok(())
}

async fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.tour).context("resolve tour configuration")?;
    let fps = args
        .frame_rate
        .unwrap_or(config.animation.target_frame_rate);
    let frames: Rc<dyn FrameSource> = if args.realtime {
        Rc::new(IntervalFrames::per_second(fps))
    } else {
        Rc::new(FixedStepFrames::per_second(fps))
    };
    let memory = MemoryDisplay::new();
    let tour = load(config, &memory, frames).await?;

    let started = Instant::now();
    let mut handle = tour.animate();
    let mut progress = handle
        .take_progress()
        .context("progress receiver already taken")?;
    let (outcome, progress_events) = tokio::join!(handle, async {
        let mut n = 0;
        while let Some(p) = progress.recv().await {
            eprintln!(
                "hop {}/{} done: {}",
                p.current_hop,
                p.total_hops,
                tour.hops()[p.current_hop - 1].destination.name
            );
            n += 1;
        }
        n
    });

    let completed_length = memory
        .paths
        .graphics()
        .iter()
        .filter(|g| g.role == PathRole::CompletedHops)
        .map(|g| g.path.planar_length())
        .sum();
    let summary = PlaySummary {
        outcome,
        hops: tour.hops().len(),
        progress_events,
        stops_revealed: memory
            .stops
            .added()
            .iter()
            .filter(|g| matches!(g, PointGraphic::Marker(_)))
            .count(),
        path_graphics_added: memory.paths.add_count(),
        completed_length,
        wall_ms: started.elapsed().as_millis(),
    };
    let json = serde_json::to_string_pretty(&summary).context("serialize play summary")?;
    println!("{json}");
    Ok(())
}
