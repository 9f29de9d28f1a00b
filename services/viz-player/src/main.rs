//! Command-line player for gridded-field datasets.
//!
//! - `info`: print a dataset summary
//! - `render`: write a single frame as PNG
//! - `play`: run timed playback and write one PNG per step, catching up
//!   on steps that passed while a slow export was running

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use field_provider::{FieldProvider, QueuedFieldProvider, SyntheticFieldProvider};
use playback::PlaybackStatus;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use viz_common::{Dataset, PlaybackSpeed};
use viz_player::{FrameExporter, PlayerConfig, PngFileExporter, Session, SAMPLE_DESCRIPTOR};

#[derive(Parser, Debug)]
#[command(name = "viz-player")]
#[command(about = "Render and play back time-varying gridded fields")]
struct Args {
    /// Dataset descriptor (JSON). Defaults to the bundled sample
    #[arg(long, env = "VIZ_DATASET")]
    dataset: Option<PathBuf>,

    /// Player configuration (YAML)
    #[arg(long, env = "VIZ_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of the dataset
    Info {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render one frame to a PNG file
    Render {
        /// Variable to render (default: first in the dataset)
        #[arg(short, long)]
        variable: Option<String>,

        /// Timestep index, clamped to the time axis
        #[arg(short, long, default_value = "0")]
        step: i64,

        /// Level, snapped to the nearest available one
        #[arg(long)]
        level: Option<f64>,

        /// Colormap name (unknown names fall back to grayscale)
        #[arg(long)]
        colormap: Option<String>,

        /// Draw the 30° graticule
        #[arg(long)]
        grid: bool,

        /// Skip contour lines
        #[arg(long)]
        no_contours: bool,

        /// Output directory
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,
    },

    /// Play through the time axis, writing one PNG per step
    Play {
        /// Variable to play (default: first in the dataset)
        #[arg(short, long)]
        variable: Option<String>,

        /// Speed multiplier (0.5, 1, 2 or 4)
        #[arg(long)]
        speed: Option<f64>,

        /// Output directory
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let config = match &args.config {
        Some(path) => PlayerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlayerConfig::default(),
    };

    let dataset = Arc::new(load_dataset(args.dataset.as_ref())?);

    match args.command {
        Command::Info { json } => print_info(&dataset, json),
        Command::Render {
            variable,
            step,
            level,
            colormap,
            grid,
            no_contours,
            output,
        } => {
            let mut config = config;
            config.visualization.show_grid |= grid;
            config.visualization.show_contours &= !no_contours;

            let provider: Arc<dyn FieldProvider> = Arc::new(SyntheticFieldProvider::new(dataset.clone()));
            let mut session = Session::new(dataset, provider, &config)?;
            select(&mut session, variable.as_deref(), level)?;
            if let Some(name) = colormap {
                session.set_colormap(&name);
            }
            session.playback_mut().seek(step);

            let exporter = PngFileExporter::new(output);
            let path = session.export_current(&exporter)?;
            info!(path = %path.display(), "Frame written");
            Ok(())
        }
        Command::Play {
            variable,
            speed,
            output,
        } => {
            let mut config = config;
            if let Some(multiplier) = speed {
                config.speed = PlaybackSpeed::new(multiplier)?;
            }
            play(dataset, config, variable.as_deref(), output).await
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn load_dataset(path: Option<&PathBuf>) -> Result<Dataset> {
    match path {
        Some(path) => Dataset::from_descriptor_file(path)
            .with_context(|| format!("failed to load dataset descriptor {}", path.display())),
        None => Dataset::from_descriptor_json(SAMPLE_DESCRIPTOR).context("bundled sample descriptor is invalid"),
    }
}

fn select(session: &mut Session, variable: Option<&str>, level: Option<f64>) -> Result<()> {
    if let Some(name) = variable {
        session.select_variable(name)?;
    }
    if let Some(level) = level {
        let used = session.select_level(level)?;
        if used != level {
            warn!(requested = level, used, "Level not available, using nearest");
        }
    }
    Ok(())
}

fn print_info(dataset: &Dataset, json: bool) -> Result<()> {
    let summary = dataset.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Dataset:    {}", summary.name);
    if let Some(size) = &summary.file_size {
        println!("Size:       {}", size);
    }
    println!("Grid:       {}", summary.grid);
    println!("Projection: {}", summary.projection);
    println!(
        "Extent:     N {} S {} E {} W {}",
        summary.extent.north, summary.extent.south, summary.extent.east, summary.extent.west
    );
    println!(
        "Time:       {} to {} ({} steps, every {})",
        summary.start_time, summary.end_time, summary.total_steps, summary.time_step
    );
    println!("Variables:");
    for var in &summary.variables {
        println!(
            "  {:<6} {:<28} [{}] {} to {}",
            var.name, var.description, var.units, var.min, var.max
        );
    }
    Ok(())
}

/// Play once through the time axis, exporting a frame per step.
async fn play(dataset: Arc<Dataset>, config: PlayerConfig, variable: Option<&str>, output: PathBuf) -> Result<()> {
    let synthetic: Arc<dyn FieldProvider> = Arc::new(SyntheticFieldProvider::new(dataset.clone()));
    let queued = Arc::new(QueuedFieldProvider::spawn(
        synthetic,
        config.field_cache_capacity,
        config.decode_queue_depth,
    ));

    let mut session = Session::new(dataset.clone(), queued.clone(), &config)?;
    select(&mut session, variable, None)?;
    let variable = session.variable().to_string();
    let level = session.level();

    // Decode the first step up front so playback opens on a real frame
    queued
        .fetch(&variable, 0, level)
        .await
        .context("failed to decode first step")?;

    let exporter = PngFileExporter::new(output);
    let mut updates = session.playback().subscribe();
    session.playback_mut().play();

    let step_count = dataset.step_count();
    let mut last_exported = None;
    loop {
        let state = *updates.borrow_and_update();
        let step = state.current_step();

        // The wrap back to step 0 ends playback; finish any steps the
        // receiver skipped before the wrap, step 0 is already on disk
        let finished = state.status() == PlaybackStatus::Stopped && last_exported.is_some();
        let target = if finished { step_count - 1 } else { step };

        for pending in viz_player::steps_to_export(last_exported, target) {
            let ahead = (target + 1..=target + config.prefetch_steps).filter(|s| *s < step_count);
            queued.prefetch(&variable, ahead, level);
            if pending != target {
                if let Err(e) = queued.fetch(&variable, pending, level).await {
                    warn!(step = pending, error = %e, "Catch-up decode failed");
                }
            }
            let frame = session.render_step(pending)?;
            let path = exporter.export(&frame.image, &viz_player::default_file_name(&variable, pending))?;
            info!(
                step = pending,
                valid_time = %frame.valid_time,
                status = ?frame.status,
                path = %path.display(),
                "Frame"
            );
            last_exported = Some(pending);
        }

        if finished {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping playback");
                session.playback_mut().pause();
                break;
            }
        }
    }

    let stats = queued.stats();
    info!(
        frames = session.cached_frames(),
        decoded = stats.decoded,
        hit_rate = %format!("{:.1}%", stats.hit_rate()),
        "Playback finished"
    );
    Ok(())
}
