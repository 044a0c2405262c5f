// SPDX-License-Identifier: GPL-3.0-only

//! Frame asset catalog
//!
//! A static list of decorative overlays. Each entry maps a frame id to an
//! image file inside the frames directory.

use crate::errors::{AppError, AppResult};
use crate::session::FrameId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One selectable overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    /// Stable id used for selection
    pub id: &'static str,
    /// Human readable name
    pub label: &'static str,
    /// File name inside the frames directory
    pub file: &'static str,
}

/// Overlays shipped with the booth
pub const STOCK_FRAMES: &[FrameEntry] = &[
    FrameEntry {
        id: "film",
        label: "Film strip",
        file: "frame1.png",
    },
    FrameEntry {
        id: "xdinary-heroes",
        label: "Xdinary Heroes",
        file: "frame2.png",
    },
    FrameEntry {
        id: "macbook",
        label: "MacBook",
        file: "frame3.png",
    },
    FrameEntry {
        id: "coming-soon",
        label: "Coming soon",
        file: "frame4.png",
    },
];

/// Resolved overlay bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAsset {
    pub id: FrameId,
    /// Encoded image (PNG with transparent slot windows)
    pub data: Arc<[u8]>,
}

impl FrameAsset {
    pub fn new(id: FrameId, data: Vec<u8>) -> Self {
        Self {
            id,
            data: Arc::from(data.into_boxed_slice()),
        }
    }

    /// Load an overlay straight from a file, using the file stem as its id
    pub async fn from_file(path: &Path) -> AppResult<Self> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let id = FrameId::new(stem)
            .ok_or_else(|| AppError::Catalog(format!("Invalid frame path {}", path.display())))?;
        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::Catalog(format!("Failed to read frame {}: {}", path.display(), e))
        })?;
        Ok(Self::new(id, data))
    }
}

/// Static mapping from frame id to asset path
#[derive(Debug, Clone)]
pub struct FrameCatalog {
    frames_dir: PathBuf,
    entries: Vec<FrameEntry>,
}

impl FrameCatalog {
    /// Catalog of the stock frames stored in `frames_dir`
    pub fn stock(frames_dir: impl Into<PathBuf>) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            entries: STOCK_FRAMES.to_vec(),
        }
    }

    pub fn entries(&self) -> &[FrameEntry] {
        &self.entries
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn contains(&self, id: &FrameId) -> bool {
        self.entry(id).is_some()
    }

    fn entry(&self, id: &FrameId) -> Option<&FrameEntry> {
        self.entries.iter().find(|entry| entry.id == id.as_str())
    }

    /// Path of a frame's asset file
    pub fn path_for(&self, id: &FrameId) -> Option<PathBuf> {
        self.entry(id).map(|entry| self.frames_dir.join(entry.file))
    }

    /// Load the asset bytes for a frame id
    pub async fn resolve(&self, id: &FrameId) -> AppResult<FrameAsset> {
        let path = self
            .path_for(id)
            .ok_or_else(|| AppError::Catalog(format!("Unknown frame '{}'", id)))?;

        debug!(frame = %id, path = %path.display(), "Resolving frame asset");
        let data = tokio::fs::read(&path).await.map_err(|e| {
            AppError::Catalog(format!(
                "Failed to read frame '{}' from {}: {}",
                id,
                path.display(),
                e
            ))
        })?;
        info!(frame = %id, bytes = data.len(), "Frame asset loaded");

        Ok(FrameAsset::new(id.clone(), data))
    }
}
