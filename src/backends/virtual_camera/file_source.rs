// SPDX-License-Identifier: GPL-3.0-only

//! Image file sources for the virtual camera

use crate::backends::camera::types::CameraFrame;
use crate::constants::file_formats;
use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load an image file as a camera frame
pub fn load_image_as_frame(path: &Path) -> AppResult<CameraFrame> {
    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        AppError::Storage(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let frame = CameraFrame::from_image(img.to_rgba8());
    debug!(width = frame.width, height = frame.height, "Image loaded successfully");
    Ok(frame)
}

/// Expand a list of files and directories into the image files they name
///
/// Directories contribute their image files in name order; unsupported
/// extensions are skipped.
pub fn collect_image_paths(sources: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for source in sources {
        if source.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(source)?
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| has_image_extension(path))
                .collect();
            entries.sort();
            paths.extend(entries);
        } else if has_image_extension(source) {
            paths.push(source.clone());
        } else {
            return Err(AppError::Storage(format!(
                "Unsupported file format: {}",
                source.display()
            )));
        }
    }

    Ok(paths)
}

/// Load every image named by `sources` as a frame
pub fn load_frames(sources: &[PathBuf]) -> AppResult<Vec<CameraFrame>> {
    let paths = collect_image_paths(sources)?;
    if paths.is_empty() {
        return Err(AppError::Storage("No image files to stream".into()));
    }
    paths.iter().map(|path| load_image_as_frame(path)).collect()
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(file_formats::is_image_extension)
}
