// SPDX-License-Identifier: GPL-3.0-only

//! Distribution pipeline
//!
//! Turns a finished artifact into a short, scannable link:
//!
//! ```text
//! Artifact ──▶ ObjectStorage::upload ──▶ remote URL
//!                                            │
//!                                            ▼
//!                             LinkShortener::shorten ──▶ short URL ──▶ QR code
//! ```
//!
//! The collage and the video are published independently. A failure in one
//! never affects the other; it only means that artifact has no link.

pub mod code;
pub mod shortener;
pub mod storage;

pub use code::{ScanCode, render_code};
pub use shortener::{HttpLinkShortener, LinkShortener};
pub use storage::{HttpObjectStorage, ObjectStorage};

use crate::constants::{artifacts, timing};
use crate::errors::PublishError;
use crate::pipelines::photo::Collage;
use crate::pipelines::video::Recording;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which artifact a link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Collage,
    Video,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Collage => write!(f, "collage"),
            ArtifactKind::Video => write!(f, "video"),
        }
    }
}

/// Media ready to be uploaded
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub data: Arc<[u8]>,
    pub filename: &'static str,
    pub mime: &'static str,
}

impl Artifact {
    pub fn collage(collage: &Collage) -> Self {
        Self {
            kind: ArtifactKind::Collage,
            data: Arc::clone(&collage.image),
            filename: artifacts::COLLAGE_FILENAME,
            mime: artifacts::COLLAGE_MIME,
        }
    }

    pub fn video(recording: &Recording) -> Self {
        Self {
            kind: ArtifactKind::Video,
            data: Arc::clone(&recording.blob),
            filename: artifacts::VIDEO_FILENAME,
            mime: artifacts::VIDEO_MIME,
        }
    }
}

/// Published location of one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub kind: ArtifactKind,
    pub remote_url: String,
    pub short_url: String,
}

impl ShareLink {
    /// Scannable code pointing at the short URL
    pub fn code(&self) -> crate::errors::AppResult<ScanCode> {
        render_code(&self.short_url)
    }
}

/// Upload + shorten, with a deadline
#[derive(Clone)]
pub struct DistributionPipeline {
    storage: Arc<dyn ObjectStorage>,
    shortener: Arc<dyn LinkShortener>,
    timeout: Duration,
}

impl DistributionPipeline {
    pub fn new(storage: Arc<dyn ObjectStorage>, shortener: Arc<dyn LinkShortener>) -> Self {
        Self {
            storage,
            shortener,
            timeout: timing::PUBLISH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upload the artifact and shorten its URL
    pub async fn publish(&self, artifact: &Artifact) -> Result<ShareLink, PublishError> {
        info!(
            kind = %artifact.kind,
            bytes = artifact.data.len(),
            "Publishing artifact"
        );

        tokio::time::timeout(self.timeout, self.upload_and_shorten(artifact))
            .await
            .map_err(|_| PublishError::Timeout(self.timeout.as_secs()))?
    }

    async fn upload_and_shorten(&self, artifact: &Artifact) -> Result<ShareLink, PublishError> {
        let remote_url = self
            .storage
            .upload(&artifact.data, artifact.filename, artifact.mime)
            .await?;
        debug!(kind = %artifact.kind, url = %remote_url, "Artifact uploaded");

        let short_url = self.shortener.shorten(&remote_url).await?;
        info!(kind = %artifact.kind, url = %short_url, "Share link ready");

        Ok(ShareLink {
            kind: artifact.kind,
            remote_url,
            short_url,
        })
    }

    /// Publish, logging failures instead of returning them
    pub async fn publish_or_log(&self, artifact: &Artifact) -> Option<ShareLink> {
        match self.publish(artifact).await {
            Ok(link) => Some(link),
            Err(e) => {
                warn!(kind = %artifact.kind, error = %e, "No share link for artifact");
                None
            }
        }
    }
}

/// Extract a URL from an endpoint response body
///
/// Accepts a JSON object carrying the URL under one of `keys`, a bare JSON
/// string, or a plain-text body whose first line is an http(s) URL.
pub(crate) fn parse_url_response(body: &str, keys: &[&str]) -> Option<String> {
    let trimmed = body.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let candidate = match &value {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(map) => keys
                .iter()
                .find_map(|key| map.get(*key).and_then(|v| v.as_str())),
            _ => None,
        };
        return candidate.map(str::trim).filter(|s| is_http_url(s)).map(String::from);
    }

    trimmed
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| is_http_url(line))
        .map(String::from)
}

pub(crate) fn is_http_url(value: &str) -> bool {
    (value.starts_with("http://") || value.starts_with("https://"))
        && !value.contains(char::is_whitespace)
}
