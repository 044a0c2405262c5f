// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for booth operations
//!
//! This module provides command-line functionality for:
//! - Listing frames
//! - Composing a collage from existing photos
//! - Running a headless session on a virtual camera
//! - Printing scannable codes

use chrono::Local;
use image::DynamicImage;
use photobooth::backends::virtual_camera::VirtualCamera;
use photobooth::booth::{Booth, BoothEvent};
use photobooth::catalog::{FrameAsset, FrameCatalog};
use photobooth::constants::PHOTO_COUNT;
use photobooth::distribution::{ArtifactKind, render_code};
use photobooth::errors::{AppError, CaptureError};
use photobooth::pipelines::photo::{CollageCompositor, EncodingFormat, PhotoEncoder};
use photobooth::session::{CaptureOutcome, CapturedPhoto, FrameId, SessionPhase};
use photobooth::{Config, constants::artifacts};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Arguments of the `run` command
pub struct SessionOptions {
    pub frame: String,
    pub sources: Vec<PathBuf>,
    pub interval: f64,
    pub output: Option<PathBuf>,
    pub open: bool,
}

/// List the stock frames and whether their asset files are present
pub fn list_frames(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = FrameCatalog::stock(&config.frames_dir);

    println!("Frames in {}:", catalog.frames_dir().display());
    println!();
    for entry in catalog.entries() {
        let present = catalog.frames_dir().join(entry.file).is_file();
        println!(
            "  {:<16} {:<16} {}{}",
            entry.id,
            entry.label,
            entry.file,
            if present { "" } else { "  (missing)" }
        );
    }

    Ok(())
}

/// Compose a collage offline from four photo files
pub fn compose(
    config: &Config,
    frame: &str,
    photos: &[PathBuf],
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(compose_async(config, frame, photos, output))
}

async fn compose_async(
    config: &Config,
    frame: &str,
    photos: &[PathBuf],
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_path = Path::new(frame);
    let asset = if frame_path.is_file() {
        FrameAsset::from_file(frame_path).await?
    } else {
        let id = FrameId::new(frame).ok_or("Frame id must not be empty")?;
        FrameCatalog::stock(&config.frames_dir).resolve(&id).await?
    };

    let mut captured = Vec::with_capacity(photos.len());
    for (slot_index, path) in photos.iter().enumerate() {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let (width, height) = image::image_dimensions(path)?;
        captured.push(CapturedPhoto {
            data: Arc::from(data.into_boxed_slice()),
            slot_index,
            width,
            height,
        });
    }

    println!("Composing {} photos with frame '{}'...", captured.len(), asset.id);
    let collage = CollageCompositor::new(config.photo_quality)
        .compose(&captured, &asset)
        .await?;

    let output_path = output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        config
            .output_dir
            .join(format!("collage_{}.jpg", timestamp))
    });
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output_path, &collage.image).await?;

    println!(
        "Collage saved: {} ({}x{})",
        output_path.display(),
        collage.width,
        collage.height
    );
    Ok(())
}

/// Run one full session on a virtual camera
pub fn run_session(
    config: &Config,
    options: SessionOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(options.interval.is_finite() && options.interval > 0.0) {
        return Err(format!("Interval must be positive, got {}", options.interval).into());
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_session_async(config, options))
}

async fn run_session_async(
    config: &Config,
    options: SessionOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera = Arc::new(VirtualCamera::from_paths(&options.sources)?);
    camera.start();

    let mut booth = Booth::from_config(config, camera.clone())?;
    if !booth.select_frame(&options.frame) {
        return Err(format!(
            "Unknown frame '{}' (see 'photobooth frames')",
            options.frame
        )
        .into());
    }

    booth.start().await?;
    println!("Session started with frame '{}'", options.frame);

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(options.interval));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    while booth.phase() == SessionPhase::Capturing {
        ticker.tick().await;
        match booth.take_snapshot().await {
            Ok(CaptureOutcome::Appended { slot_index }) => {
                println!("Photo {}/{}", slot_index + 1, PHOTO_COUNT);
            }
            Ok(CaptureOutcome::Completed { .. }) => {
                println!("Photo {}/{}, collage composed", PHOTO_COUNT, PHOTO_COUNT);
            }
            Ok(CaptureOutcome::Ignored) => {}
            Err(AppError::Capture(CaptureError::FeedNotReady)) => {
                println!("Camera not ready yet, retrying...");
            }
            Err(e) => return Err(e.into()),
        }
    }

    while let Some(event) = booth.next_event().await {
        match event {
            BoothEvent::RecordingReady { frames } => println!("Video ready ({} frames)", frames),
            BoothEvent::RecordingUnavailable => println!("No video recorded"),
            BoothEvent::ShareLinkReady(link) => println!("{} link: {}", link.kind, link.short_url),
            BoothEvent::ShareLinkUnavailable { kind } => println!("{} could not be shared", kind),
        }
    }
    camera.stop();

    let output_dir = options.output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        config.output_dir.join(format!("session_{}", timestamp))
    });
    let saved = booth.save_artifacts(&output_dir).await?;
    for path in &saved {
        println!("Saved: {}", path.display());
    }

    for kind in [ArtifactKind::Collage, ArtifactKind::Video] {
        if let Some(link) = booth.share_link(kind) {
            println!();
            println!("Scan for the {}:", kind);
            println!("{}", link.code()?.to_terminal());
        }
    }

    if options.open
        && let Some(collage) = saved
            .iter()
            .find(|path| path.ends_with(artifacts::COLLAGE_FILENAME))
    {
        open::that(collage)?;
    }

    Ok(())
}

/// Print a scannable code, optionally saving it as PNG
///
/// `output` may be a file path or an existing directory.
pub fn print_code(text: &str, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let code = render_code(text)?;
    println!("{}", code.to_terminal());

    let Some(output) = output else {
        return Ok(());
    };

    let mut encoder = PhotoEncoder::new();
    encoder.set_format(EncodingFormat::Png);

    let (dir, filename) = if output.is_dir() {
        (output, format!("code.{}", encoder.format().extension()))
    } else {
        let filename = output
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| format!("Invalid output path {}", output.display()))?;
        let dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (dir, filename)
    };

    let image = DynamicImage::ImageLuma8(code.to_image(8)).to_rgba8();
    let rt = tokio::runtime::Runtime::new()?;
    let path = rt.block_on(async {
        let encoded = encoder.encode(image).await?;
        encoder.save(&encoded, &dir, &filename).await
    })?;

    println!("Code saved: {}", path.display());
    Ok(())
}
