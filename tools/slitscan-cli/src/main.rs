//! Slit-scan CLI — drive the compositor without a camera.
//!
//! Usage:
//!   slitscan capacity --width W --height H   Show ring-buffer sizing
//!   slitscan render [OPTIONS]                Composite a synthetic feed to PNG
//!   slitscan config [--save]                 Show or write the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slitscan_common::config::AppConfig;
use slitscan_frame_model::Orientation;

mod commands;
mod synthetic;

use synthetic::Pattern;

#[derive(Parser)]
#[command(
    name = "slitscan",
    about = "Real-time slit-scan video compositor",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many frames and bytes a session would hold
    Capacity {
        /// Frame width
        #[arg(long)]
        width: u32,

        /// Frame height
        #[arg(long)]
        height: u32,
    },

    /// Composite a synthetic camera feed and write PNG stills
    Render {
        /// Frame width
        #[arg(long, default_value = "320")]
        width: u32,

        /// Frame height
        #[arg(long, default_value = "240")]
        height: u32,

        /// Number of frames to feed
        #[arg(long, default_value = "480")]
        frames: usize,

        /// Display orientation: landscape|portrait
        #[arg(long, default_value = "landscape")]
        orientation: Orientation,

        /// Synthetic feed
        #[arg(long, value_enum, default_value = "sweep")]
        pattern: Pattern,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write every N-th composited frame (the last is always written)
        #[arg(long, default_value = "0")]
        every: usize,

        /// Display view size as WIDTHxHEIGHT; the surface is sized to cover it
        #[arg(long)]
        view: Option<String>,

        /// Worker threads for the per-pixel sweep
        #[arg(long)]
        threads: Option<usize>,

        /// Run the sweep on the calling thread only
        #[arg(long)]
        sequential: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the standard location
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    slitscan_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Capacity { width, height } => commands::capacity::run(width, height),
        Commands::Render {
            width,
            height,
            frames,
            orientation,
            pattern,
            output,
            every,
            view,
            threads,
            sequential,
        } => {
            if sequential {
                config.compositor.parallel = false;
            }
            if threads.is_some() {
                config.compositor.threads = threads;
            }
            let view = view.as_deref().map(commands::render::parse_size).transpose()?;
            commands::render::run(
                commands::render::RenderOptions {
                    width,
                    height,
                    frames,
                    orientation,
                    pattern,
                    output: output.unwrap_or_else(|| config.output_dir.clone()),
                    every,
                    view,
                },
                config.compositor,
            )
        }
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
