// SPDX-License-Identifier: GPL-3.0-only

//! Booth orchestrator
//!
//! Owns the [`Session`] and wires the pipelines to it:
//!
//! ```text
//!  select_frame ─▶ start ──────▶ take_snapshot x4 ──▶ compose ──▶ publish collage
//!                    │                  │
//!                    ▼                  ▼
//!              recorder.arm      recorder.stop ──▶ finish ──▶ publish video
//!                                         (one background task)
//! ```
//!
//! Background work (video finalization, publishing) reports back over a
//! channel. Each result carries the id of the session that started it;
//! results for a session that has since been reset are dropped.

use crate::backends::camera::CameraFeed;
use crate::catalog::{FrameAsset, FrameCatalog};
use crate::config::Config;
use crate::constants::artifacts;
use crate::distribution::{
    Artifact, ArtifactKind, DistributionPipeline, HttpLinkShortener, HttpObjectStorage, ShareLink,
};
use crate::errors::{AppResult, SessionError};
use crate::pipelines::photo::{Collage, CollageCompositor, PhotoCapture};
use crate::pipelines::video::{Recording, StreamRecorder};
use crate::session::{CaptureOutcome, CapturedPhoto, FrameId, Session, SessionPhase};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Something finished in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoothEvent {
    /// The session video has been finalized
    RecordingReady { frames: usize },
    /// No video for this session (stream never became ready or no frames)
    RecordingUnavailable,
    /// An artifact has been published
    ShareLinkReady(ShareLink),
    /// Publishing an artifact failed; the artifact itself is still available
    ShareLinkUnavailable { kind: ArtifactKind },
}

#[derive(Debug)]
enum TaskResult {
    Recording(Option<Recording>),
    Published {
        kind: ArtifactKind,
        link: Option<ShareLink>,
    },
}

#[derive(Debug)]
struct Tagged {
    session_id: Uuid,
    result: TaskResult,
}

/// One photo booth
pub struct Booth {
    session: Session,
    feed: Arc<dyn CameraFeed>,
    catalog: FrameCatalog,
    frame_asset: Option<FrameAsset>,
    capture: PhotoCapture,
    compositor: CollageCompositor,
    recorder: StreamRecorder,
    distribution: Option<DistributionPipeline>,
    collage: Option<Collage>,
    recording: Option<Recording>,
    collage_link: Option<ShareLink>,
    video_link: Option<ShareLink>,
    results_tx: mpsc::UnboundedSender<Tagged>,
    results_rx: mpsc::UnboundedReceiver<Tagged>,
    pending: usize,
}

impl Booth {
    /// Booth with default pipelines and publishing disabled
    pub fn new(feed: Arc<dyn CameraFeed>, catalog: FrameCatalog) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            feed,
            catalog,
            frame_asset: None,
            capture: PhotoCapture::default(),
            compositor: CollageCompositor::default(),
            recorder: StreamRecorder::default(),
            distribution: None,
            collage: None,
            recording: None,
            collage_link: None,
            video_link: None,
            results_tx,
            results_rx,
            pending: 0,
        }
    }

    /// Booth set up from configuration
    ///
    /// Publishing is enabled only when both endpoints are configured.
    pub fn from_config(config: &Config, feed: Arc<dyn CameraFeed>) -> AppResult<Self> {
        let mut booth = Self::new(feed, FrameCatalog::stock(&config.frames_dir))
            .with_capture(PhotoCapture::new(config.photo_quality, config.mirror_preview))
            .with_compositor(CollageCompositor::new(config.photo_quality))
            .with_recorder(StreamRecorder::new(config.recorder_config()));

        if let (Some(storage_url), Some(shortener_url)) =
            (&config.storage_url, &config.shortener_url)
            && config.publishing_enabled()
        {
            let timeout = config.publish_timeout();
            let storage = HttpObjectStorage::new(storage_url.trim(), timeout)?;
            let shortener = HttpLinkShortener::new(shortener_url.trim(), timeout)?;
            booth = booth.with_distribution(
                DistributionPipeline::new(Arc::new(storage), Arc::new(shortener))
                    .with_timeout(timeout),
            );
        } else {
            info!("Publishing disabled, no storage or shortener endpoint configured");
        }

        Ok(booth)
    }

    pub fn with_capture(mut self, capture: PhotoCapture) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_compositor(mut self, compositor: CollageCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_recorder(mut self, recorder: StreamRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_distribution(mut self, distribution: DistributionPipeline) -> Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn photos(&self) -> &[CapturedPhoto] {
        self.session.photos()
    }

    pub fn catalog(&self) -> &FrameCatalog {
        &self.catalog
    }

    pub fn collage(&self) -> Option<&Collage> {
        self.collage.as_ref()
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    pub fn share_link(&self, kind: ArtifactKind) -> Option<&ShareLink> {
        match kind {
            ArtifactKind::Collage => self.collage_link.as_ref(),
            ArtifactKind::Video => self.video_link.as_ref(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    /// Number of recordings that actually started capturing frames
    pub fn recordings_started(&self) -> usize {
        self.recorder.recordings_started()
    }

    /// Whether background results for this session are still outstanding
    pub fn has_pending_work(&self) -> bool {
        self.pending > 0
    }

    /// Choose a frame from the catalog
    ///
    /// Unknown ids and selections outside `Idle` are ignored.
    pub fn select_frame(&mut self, id: &str) -> bool {
        let Some(frame_id) = FrameId::new(id) else {
            debug!("Ignoring blank frame id");
            return false;
        };
        if !self.catalog.contains(&frame_id) {
            warn!(frame = %frame_id, "Unknown frame");
            return false;
        }
        self.session.select_frame(frame_id)
    }

    /// Begin capturing
    ///
    /// The frame asset is loaded before the session moves on, so a missing
    /// asset leaves the booth idle. Recording begins in the background once
    /// the camera stream is available.
    pub async fn start(&mut self) -> AppResult<()> {
        let frame_id = self.session.check_can_start()?.clone();
        let asset = self.catalog.resolve(&frame_id).await?;

        self.session.start()?;
        self.frame_asset = Some(asset);

        if let Err(e) = self.recorder.arm(Arc::clone(&self.feed)) {
            warn!(error = %e, "Recorder could not be armed, continuing without video");
        }
        Ok(())
    }

    /// Take one photo
    ///
    /// On the fourth photo the recorder is stopped and the collage composed
    /// before this returns. A composition failure is returned as an error;
    /// the session stays `Composed` until reset.
    pub async fn take_snapshot(&mut self) -> AppResult<CaptureOutcome> {
        let outcome = self
            .capture
            .take_snapshot(self.feed.as_ref(), &mut self.session)?;

        if let CaptureOutcome::Completed { photos } = &outcome {
            self.finish_session(photos).await?;
        }
        Ok(outcome)
    }

    async fn finish_session(&mut self, photos: &[CapturedPhoto]) -> AppResult<()> {
        self.spawn_recording_finish();

        let frame = self.frame_asset.clone().ok_or_else(|| {
            SessionError::PreconditionViolation("frame asset not loaded".into())
        })?;
        let collage = self.compositor.compose(photos, &frame).await?;
        info!(
            session = %self.session.id(),
            bytes = collage.image.len(),
            "Collage ready"
        );

        self.spawn_publish(Artifact::collage(&collage));
        self.collage = Some(collage);
        Ok(())
    }

    fn spawn_tagged<F>(&mut self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let session_id = self.session.id();
        let tx = self.results_tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let result = task.await;
            // Receiver lives as long as the booth
            let _ = tx.send(Tagged { session_id, result });
        });
    }

    /// Flush the recording, then publish it from the same task
    ///
    /// The video goes out as soon as it is sealed, whether or not anyone is
    /// draining events. Its `Published` result follows the `Recording` one.
    fn spawn_recording_finish(&mut self) {
        let flush = self.recorder.stop();
        let distribution = self.distribution.clone();
        let session_id = self.session.id();
        let tx = self.results_tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let recording = flush.finish().await;
            let artifact = recording.as_ref().map(Artifact::video);
            let _ = tx.send(Tagged {
                session_id,
                result: TaskResult::Recording(recording),
            });

            let (Some(pipeline), Some(artifact)) = (distribution, artifact) else {
                return;
            };
            let link = pipeline.publish_or_log(&artifact).await;
            let _ = tx.send(Tagged {
                session_id,
                result: TaskResult::Published {
                    kind: artifact.kind,
                    link,
                },
            });
        });
    }

    fn spawn_publish(&mut self, artifact: Artifact) {
        let Some(pipeline) = self.distribution.clone() else {
            debug!(kind = %artifact.kind, "Publishing disabled");
            return;
        };
        self.spawn_tagged(async move {
            let link = pipeline.publish_or_log(&artifact).await;
            TaskResult::Published {
                kind: artifact.kind,
                link,
            }
        });
    }

    /// Wait for the next background result of the current session
    ///
    /// Returns `None` once nothing is outstanding.
    pub async fn next_event(&mut self) -> Option<BoothEvent> {
        while self.pending > 0 {
            let tagged = self.results_rx.recv().await?;
            if tagged.session_id != self.session.id() {
                debug!(session = %tagged.session_id, "Dropping result of a previous session");
                continue;
            }
            self.pending -= 1;
            return Some(self.apply(tagged.result));
        }
        None
    }

    /// Drain every outstanding result
    pub async fn settle(&mut self) -> Vec<BoothEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn apply(&mut self, result: TaskResult) -> BoothEvent {
        match result {
            TaskResult::Recording(Some(recording)) => {
                let frames = recording.frame_count;
                info!(
                    frames,
                    bytes = recording.blob.len(),
                    duration_ms = recording.duration.as_millis() as u64,
                    "Recording ready"
                );
                if self.distribution.is_some() {
                    // Already being published by the finish task
                    self.pending += 1;
                }
                self.recording = Some(recording);
                BoothEvent::RecordingReady { frames }
            }
            TaskResult::Recording(None) => {
                info!("No recording for this session");
                BoothEvent::RecordingUnavailable
            }
            TaskResult::Published {
                kind,
                link: Some(link),
            } => {
                match kind {
                    ArtifactKind::Collage => self.collage_link = Some(link.clone()),
                    ArtifactKind::Video => self.video_link = Some(link.clone()),
                }
                BoothEvent::ShareLinkReady(link)
            }
            TaskResult::Published { kind, link: None } => {
                BoothEvent::ShareLinkUnavailable { kind }
            }
        }
    }

    /// Drop everything and return to a fresh idle session
    ///
    /// In-flight uploads are not cancelled; their results are ignored.
    pub fn reset(&mut self) {
        // Detached: the flush finishes on its own and is discarded as stale
        drop(self.recorder.stop());
        self.session.reset();
        self.frame_asset = None;
        self.collage = None;
        self.recording = None;
        self.collage_link = None;
        self.video_link = None;
        self.pending = 0;
    }

    /// Write the collage and video (whichever exist) into `dir`
    pub async fn save_artifacts(&self, dir: &Path) -> AppResult<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir).await?;
        let mut saved = Vec::new();

        if let Some(collage) = &self.collage {
            let path = dir.join(artifacts::COLLAGE_FILENAME);
            tokio::fs::write(&path, &collage.image).await?;
            saved.push(path);
        }
        if let Some(recording) = &self.recording {
            let path = dir.join(artifacts::VIDEO_FILENAME);
            tokio::fs::write(&path, &recording.blob).await?;
            saved.push(path);
        }

        info!(dir = %dir.display(), files = saved.len(), "Artifacts saved");
        Ok(saved)
    }
}
