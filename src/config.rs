// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{recording, timing};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodingQuality;
use crate::pipelines::video::RecorderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Directory name used under the XDG config, data and pictures directories
pub const APP_DIR: &str = "photobooth";

/// Name of the configuration file
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upload endpoint for collages and videos (publishing disabled if unset)
    pub storage_url: Option<String>,
    /// Link shortener endpoint (publishing disabled if unset)
    pub shortener_url: Option<String>,
    /// Deadline for one publish, upload and shortening included
    pub request_timeout_secs: u64,
    /// Polling interval for feeds that cannot announce their stream
    pub stream_poll_interval_ms: u64,
    /// JPEG quality preset for snapshots and the collage
    pub photo_quality: EncodingQuality,
    /// Mirror snapshots horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Directory holding the frame overlays
    pub frames_dir: PathBuf,
    /// Where finished collages and videos are written
    pub output_dir: PathBuf,
    /// Frame rate cap of the session video
    pub recorder_max_fps: u32,
    /// Frame count cap of the session video
    pub recorder_max_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_url: None,
            shortener_url: None,
            request_timeout_secs: timing::PUBLISH_TIMEOUT.as_secs(),
            stream_poll_interval_ms: timing::STREAM_POLL_INTERVAL.as_millis() as u64,
            photo_quality: EncodingQuality::default(),
            mirror_preview: true, // Default to mirrored (selfie mode)
            frames_dir: default_frames_dir(),
            output_dir: default_output_dir(),
            recorder_max_fps: recording::DEFAULT_MAX_FPS,
            recorder_max_frames: recording::DEFAULT_MAX_FRAMES,
        }
    }
}

fn default_frames_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("frames")
}

fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    /// `$XDG_CONFIG_HOME/photobooth/config.json`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::Config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| AppError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Both endpoints present and non-blank
    pub fn publishing_enabled(&self) -> bool {
        let set = |url: &Option<String>| url.as_deref().is_some_and(|u| !u.trim().is_empty());
        set(&self.storage_url) && set(&self.shortener_url)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            poll_interval: Duration::from_millis(self.stream_poll_interval_ms.max(1)),
            max_fps: self.recorder_max_fps,
            max_frames: self.recorder_max_frames,
            ..RecorderConfig::default()
        }
    }
}
