// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Four-shot photo booth with framed collages and share links")]
#[command(version = photobooth::constants::app_info::version())]
struct Cli {
    /// Directory holding the frame overlays (overrides the config file)
    #[arg(long, global = true)]
    frames_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available frames
    Frames,

    /// Compose a collage from four existing photos
    Compose {
        /// Frame id from 'photobooth frames', or a path to an overlay image
        #[arg(short, long)]
        frame: String,

        /// The four photos, in slot order
        #[arg(num_args = 4, required = true)]
        photos: Vec<PathBuf>,

        /// Output file path (default: ~/Pictures/photobooth/collage_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a booth session against image files standing in for the camera
    Run {
        /// Frame id from 'photobooth frames'
        #[arg(short, long)]
        frame: String,

        /// Images or directories of images played back as the camera feed
        #[arg(short, long, required = true, num_args = 1..)]
        source: Vec<PathBuf>,

        /// Seconds between snapshots
        #[arg(short, long, default_value = "3")]
        interval: f64,

        /// Output directory (default: ~/Pictures/photobooth/session_TIMESTAMP)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip uploading even if endpoints are configured
        #[arg(long)]
        no_publish: bool,

        /// Open the collage when done
        #[arg(long)]
        open: bool,
    },

    /// Print a scannable code for some text
    Qr {
        /// Text or URL to encode
        text: String,

        /// Also write the code as a PNG image
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = photobooth::Config::load()?;
    if let Some(frames_dir) = cli.frames_dir {
        config.frames_dir = frames_dir;
    }

    match cli.command {
        Commands::Frames => cli::list_frames(&config),
        Commands::Compose {
            frame,
            photos,
            output,
        } => cli::compose(&config, &frame, &photos, output),
        Commands::Run {
            frame,
            source,
            interval,
            output,
            no_publish,
            open,
        } => {
            if no_publish {
                config.storage_url = None;
            }
            cli::run_session(
                &config,
                cli::SessionOptions {
                    frame,
                    sources: source,
                    interval,
                    output,
                    open,
                },
            )
        }
        Commands::Qr { text, output } => cli::print_code(&text, output),
    }
}
