use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use clusterviz_app::terminal::{WatchOptions, run_watch};
use clusterviz_app::{Frames, Viewer, ViewerConfig};
use clusterviz_core::{AlgorithmId, AlgorithmParams, ResetParams};
use owo_colors::OwoColorize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "clusterviz",
    version,
    about = "Drive a clustering simulation and render its state to PNG frames"
)]
struct Cli {
    /// JSON configuration file; unset fields use built-in defaults.
    #[arg(long, env = "CLUSTERVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the simulation server (overrides the config file).
    #[arg(long, env = "CLUSTERVIZ_URL")]
    base_url: Option<String>,

    /// Directory PNG frames are written to (overrides the config file).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Seed for the cluster palette shuffle.
    #[arg(long)]
    palette_seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the current state and write scene and overlay frames.
    Render {
        /// Point whose matrix row the overlays show.
        #[arg(long, default_value_t = 0)]
        focal: usize,
    },
    /// Advance the simulation, then render.
    Next {
        /// Number of steps; defaults to the configured step size.
        #[arg(long)]
        steps: Option<NonZeroU32>,
    },
    /// Regenerate the point set, then render.
    Reset {
        #[arg(long)]
        num_elems: u32,
        #[arg(long)]
        num_clusters: u32,
        #[arg(long)]
        cluster_radius: f64,
    },
    /// List the clustering algorithms the server offers.
    Algorithms,
    /// Switch the active clustering algorithm, then render.
    Select {
        /// Algorithm id as reported by `algorithms`.
        id: String,
        #[arg(long)]
        num_means: Option<String>,
        #[arg(long)]
        eps: Option<String>,
        #[arg(long)]
        min_pts: Option<String>,
        /// Extra algorithm parameter, repeatable (e.g. --param damping=0.9).
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Launch an interactive dashboard that polls and renders continuously.
    Watch {
        /// Refresh interval in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let mut viewer = Viewer::new(&config).context("failed to create simulation client")?;
    let output_dir = config.output_dir.clone();

    match cli.command {
        Command::Render { focal } => {
            viewer.set_focal_index(focal)?;
            let frames = viewer
                .refresh()
                .await
                .context("failed to render simulation state")?;
            report_frames(frames);
            save(&viewer, &output_dir)?;
        }
        Command::Next { steps } => {
            let steps = match steps {
                Some(steps) => steps,
                None => NonZeroU32::new(config.step_size)
                    .ok_or_else(|| anyhow!("step_size must be at least 1"))?,
            };
            let frames = viewer
                .advance(steps)
                .await
                .with_context(|| format!("failed to advance simulation by {steps} step(s)"))?;
            report_frames(frames);
            save(&viewer, &output_dir)?;
        }
        Command::Reset {
            num_elems,
            num_clusters,
            cluster_radius,
        } => {
            let params = ResetParams::new(num_elems, num_clusters, cluster_radius)
                .context("invalid reset parameters")?;
            let frames = viewer
                .reset(&params)
                .await
                .context("failed to reset simulation")?;
            report_frames(frames);
            save(&viewer, &output_dir)?;
        }
        Command::Algorithms => algorithms_command(&viewer).await?,
        Command::Select {
            id,
            num_means,
            eps,
            min_pts,
            params,
        } => {
            let mut algorithm_params = AlgorithmParams::new();
            for (key, value) in [("num_means", num_means), ("eps", eps), ("min_pts", min_pts)] {
                if let Some(value) = value {
                    algorithm_params = algorithm_params.with(key, value);
                }
            }
            for (key, value) in params {
                algorithm_params = algorithm_params.with(key, value);
            }
            let id = AlgorithmId::new(id);
            let frames = viewer
                .select_algorithm(&id, &algorithm_params)
                .await
                .with_context(|| format!("failed to select algorithm {id}"))?;
            report_frames(frames);
            save(&viewer, &output_dir)?;
        }
        Command::Watch { interval_ms } => {
            let options = WatchOptions {
                interval: Duration::from_millis(interval_ms),
                step_size: NonZeroU32::new(config.step_size)
                    .ok_or_else(|| anyhow!("step_size must be at least 1"))?,
                output_dir,
            };
            let handle = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || run_watch(&mut viewer, &handle, &options))
                .await??;
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if cli.palette_seed.is_some() {
        config.palette_seed = cli.palette_seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

fn report_frames(frames: &Frames) {
    let overlays = [&frames.availability, &frames.responsibility]
        .iter()
        .filter(|overlay| overlay.is_some())
        .count();
    info!(overlays, "frames ready");
}

fn save(viewer: &Viewer, dir: &Path) -> Result<()> {
    let written = viewer
        .save_frames(dir)
        .with_context(|| format!("failed to write frames to {}", dir.display()))?;

    if let Some(snapshot) = viewer.pipeline().snapshot() {
        println!(
            "{} {} points, {} clusters, debug {}",
            "rendered".green().bold(),
            snapshot.point_count(),
            snapshot.cluster_count(),
            snapshot.debug.kind().italic().blue()
        );
    }
    for path in written {
        println!("  {}", path.display().to_string().cyan());
    }
    Ok(())
}

async fn algorithms_command(viewer: &Viewer) -> Result<()> {
    let algorithms = viewer
        .list_algorithms()
        .await
        .context("failed to fetch algorithm list")?;
    if algorithms.is_empty() {
        println!("{}", "No algorithms reported by the simulation".yellow());
        return Ok(());
    }

    println!("{:<8} {}", "ID".bold().cyan(), "NAME".bold().cyan());
    println!("{}", "-".repeat(40).dimmed());
    for algorithm in algorithms {
        println!("{:<8} {}", algorithm.id.to_string().bold(), algorithm.name);
    }
    Ok(())
}
