//! flowgraph - play or render a JSON synthesis patch
//!
//! Run with: cargo run -- play patches/pluck.json

mod app;
mod render;
mod samples;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use flowgraph::{EngineConfig, GraphPatch};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowgraph")]
#[command(about = "Modular synthesis graph engine", long_about = None)]
struct Cli {
    /// Engine config as JSON. Unset fields keep their defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Attach a WAV file to a granular node, as `node=path.wav`. Repeatable.
    #[arg(short = 'S', long = "sample", global = true, value_parser = samples::parse_binding)]
    samples: Vec<samples::SampleBinding>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a patch on the default output device with a live monitor
    Play {
        /// Patch file (JSON)
        patch: PathBuf,

        /// Write logs here; the monitor owns the terminal
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Render a patch to a stereo WAV file
    Render {
        /// Patch file (JSON)
        patch: PathBuf,

        /// Output WAV file path
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "10.0")]
        duration: f32,

        /// Sample rate in Hz, overrides the config file
        #[arg(short, long)]
        sample_rate: Option<u32>,

        /// Frames per render call
        #[arg(short, long, default_value = "128")]
        block_size: usize,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Play { patch, log_file } => {
            init_tracing(log_file.as_ref())?;
            app::play(app::PlaySettings {
                patch: load_patch(&patch)?,
                patch_path: patch,
                config,
                device_rate: cli.config.is_none(),
                samples: cli.samples,
            })
        }
        Commands::Render {
            patch,
            output,
            duration,
            sample_rate,
            block_size,
        } => {
            init_tracing(None)?;
            let mut config = config;
            if let Some(rate) = sample_rate {
                config.sample_rate = rate as f32;
            }
            let settings = render::RenderSettings {
                output,
                duration,
                block_size: block_size.max(1),
            };
            render::render(config, &load_patch(&patch)?, &cli.samples, &settings)
        }
    }
}

/// Stderr by default. With a file, log there instead so the TUI stays clean.
fn init_tracing(log_file: Option<&PathBuf>) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> EyreResult<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))
}

pub(crate) fn load_patch(path: &PathBuf) -> EyreResult<GraphPatch> {
    let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    GraphPatch::from_json(&text).wrap_err_with(|| format!("parsing {}", path.display()))
}
