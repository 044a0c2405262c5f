// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the booth orchestrator

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use photobooth::backends::camera::CameraFrame;
use photobooth::backends::virtual_camera::VirtualCamera;
use photobooth::constants::layout;
use photobooth::distribution::{ArtifactKind, DistributionPipeline, LinkShortener, ObjectStorage};
use photobooth::errors::{AppError, CaptureError, PublishError, SessionError};
use photobooth::{Booth, BoothEvent, CaptureOutcome, FrameCatalog, SessionPhase};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct MemoryStorage {
    delay: Duration,
    uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        data: &[u8],
        filename: &str,
        _mime: &str,
    ) -> Result<String, PublishError> {
        tokio::time::sleep(self.delay).await;
        self.uploads.lock().unwrap().push(filename.to_string());
        Ok(format!("https://files.example/{}/{}", data.len(), filename))
    }
}

#[derive(Default)]
struct TestShortener {
    fail_on: Option<&'static str>,
}

#[async_trait]
impl LinkShortener for TestShortener {
    async fn shorten(&self, url: &str) -> Result<String, PublishError> {
        if let Some(pattern) = self.fail_on
            && url.contains(pattern)
        {
            return Err(PublishError::ShortenFailed("quota exceeded".into()));
        }
        Ok(format!("https://sho.rt/{}", url.len()))
    }
}

/// Opaque black overlay with transparent slot windows
fn write_frame_asset(dir: &Path) {
    let mut frame = RgbaImage::from_pixel(
        layout::CANVAS_WIDTH,
        layout::CANVAS_HEIGHT,
        Rgba([0, 0, 0, 255]),
    );
    for (x, y) in layout::SLOT_POSITIONS {
        for dy in 0..layout::SLOT_HEIGHT {
            for dx in 0..layout::SLOT_WIDTH {
                frame.put_pixel(x + dx, y + dy, Rgba([0, 0, 0, 0]));
            }
        }
    }
    frame.save(dir.join("frame1.png")).unwrap();
}

fn camera(startup: Duration) -> Arc<VirtualCamera> {
    let still = RgbaImage::from_pixel(64, 48, Rgba([200, 40, 40, 255]));
    let camera = VirtualCamera::new(vec![CameraFrame::from_image(still)])
        .with_startup_delay(startup)
        .with_frame_duration(Duration::from_millis(33));
    camera.start();
    Arc::new(camera)
}

fn booth_with(
    camera: Arc<VirtualCamera>,
    frames_dir: &Path,
    storage: Arc<MemoryStorage>,
    shortener: TestShortener,
) -> Booth {
    Booth::new(camera, FrameCatalog::stock(frames_dir))
        .with_distribution(DistributionPipeline::new(storage, Arc::new(shortener)))
}

async fn take_four(booth: &mut Booth) -> CaptureOutcome {
    let mut last = CaptureOutcome::Ignored;
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_millis(150)).await;
        last = booth.take_snapshot().await.unwrap();
    }
    last
}

#[tokio::test(start_paused = true)]
async fn test_start_without_frame_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut booth = Booth::new(camera(Duration::ZERO), FrameCatalog::stock(dir.path()));

    let err = booth.start().await.unwrap_err();
    let AppError::Session(SessionError::PreconditionViolation(msg)) = &err else {
        panic!("unexpected error: {:?}", err);
    };
    assert_eq!(msg, "frame not selected");
    assert_eq!(booth.phase(), SessionPhase::Idle);
    assert!(!booth.is_recording());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_frame_cannot_be_selected() {
    let dir = tempfile::tempdir().unwrap();
    let mut booth = Booth::new(camera(Duration::ZERO), FrameCatalog::stock(dir.path()));

    assert!(!booth.select_frame("polaroid"));
    assert!(!booth.select_frame("  "));
    assert!(booth.session().selected_frame().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_missing_frame_asset_keeps_booth_idle() {
    let dir = tempfile::tempdir().unwrap();
    let mut booth = Booth::new(camera(Duration::ZERO), FrameCatalog::stock(dir.path()));

    assert!(booth.select_frame("film"));
    assert!(matches!(booth.start().await, Err(AppError::Catalog(_))));
    assert_eq!(booth.phase(), SessionPhase::Idle);
    assert!(!booth.is_recording());
}

#[tokio::test(start_paused = true)]
async fn test_full_session_produces_collage_video_and_links() {
    let dir = tempfile::tempdir().unwrap();
    write_frame_asset(dir.path());
    let storage = Arc::new(MemoryStorage::default());
    let mut booth = booth_with(
        camera(Duration::from_millis(100)),
        dir.path(),
        storage.clone(),
        TestShortener::default(),
    );

    assert!(booth.select_frame("film"));
    booth.start().await.unwrap();
    assert_eq!(booth.phase(), SessionPhase::Capturing);
    assert!(booth.is_recording());

    let last = take_four(&mut booth).await;
    assert!(matches!(last, CaptureOutcome::Completed { .. }));
    assert_eq!(booth.phase(), SessionPhase::Composed);
    assert!(!booth.is_recording());

    let collage = booth.collage().unwrap();
    assert_eq!((collage.width, collage.height), (1800, 1200));
    assert!(collage.to_data_uri().starts_with("data:image/jpeg;base64,"));

    let events = booth.settle().await;
    assert_eq!(events.len(), 3, "{:?}", events);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, BoothEvent::RecordingReady { frames } if *frames > 0))
    );

    assert_eq!(booth.recordings_started(), 1);
    assert!(booth.recording().is_some());
    let collage_link = booth.share_link(ArtifactKind::Collage).unwrap();
    assert!(collage_link.remote_url.ends_with("/collage.jpg"));
    assert!(collage_link.short_url.starts_with("https://sho.rt/"));
    assert!(booth.share_link(ArtifactKind::Video).is_some());

    let mut uploads = storage.uploads.lock().unwrap().clone();
    uploads.sort();
    assert_eq!(uploads, vec!["collage.jpg", "video.mjpeg"]);

    // Capturing is over; further triggers do nothing
    assert_eq!(booth.take_snapshot().await.unwrap(), CaptureOutcome::Ignored);
    assert_eq!(booth.photos().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_video_is_published_without_draining_events() {
    let dir = tempfile::tempdir().unwrap();
    write_frame_asset(dir.path());
    let storage = Arc::new(MemoryStorage::default());
    let mut booth = booth_with(
        camera(Duration::from_millis(100)),
        dir.path(),
        storage.clone(),
        TestShortener::default(),
    );

    booth.select_frame("film");
    booth.start().await.unwrap();
    take_four(&mut booth).await;

    // Nobody calls next_event() here
    tokio::time::sleep(Duration::from_secs(5)).await;
    let mut uploads = storage.uploads.lock().unwrap().clone();
    uploads.sort();
    assert_eq!(uploads, vec!["collage.jpg", "video.mjpeg"]);

    // Results are still delivered in order once the owner catches up
    let events = booth.settle().await;
    assert_eq!(events.len(), 3, "{:?}", events);
    let recording_at = events
        .iter()
        .position(|e| matches!(e, BoothEvent::RecordingReady { .. }))
        .unwrap();
    let video_link_at = events
        .iter()
        .position(|e| {
            matches!(e, BoothEvent::ShareLinkReady(link) if link.kind == ArtifactKind::Video)
        })
        .unwrap();
    assert!(recording_at < video_link_at);
    assert!(booth.share_link(ArtifactKind::Video).is_some());
    assert!(!booth.has_pending_work());
}

#[tokio::test(start_paused = true)]
async fn test_failed_shortening_only_affects_its_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_frame_asset(dir.path());
    let mut booth = booth_with(
        camera(Duration::from_millis(100)),
        dir.path(),
        Arc::new(MemoryStorage::default()),
        TestShortener {
            fail_on: Some("video"),
        },
    );

    booth.select_frame("film");
    booth.start().await.unwrap();
    take_four(&mut booth).await;
    let events = booth.settle().await;

    assert!(events.contains(&BoothEvent::ShareLinkUnavailable {
        kind: ArtifactKind::Video
    }));
    assert!(booth.share_link(ArtifactKind::Collage).is_some());
    assert!(booth.share_link(ArtifactKind::Video).is_none());
    // The video itself is still there to download
    assert!(booth.recording().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_before_camera_ready() {
    let dir = tempfile::tempdir().unwrap();
    write_frame_asset(dir.path());
    let mut booth = Booth::new(
        camera(Duration::from_secs(5)),
        FrameCatalog::stock(dir.path()),
    );

    booth.select_frame("film");
    booth.start().await.unwrap();

    let err = booth.take_snapshot().await.unwrap_err();
    assert!(matches!(err, AppError::Capture(CaptureError::FeedNotReady)));
    assert!(booth.photos().is_empty());
    assert_eq!(booth.phase(), SessionPhase::Capturing);

    // Leaving the session before the stream appears: no recording, ever
    booth.reset();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(booth.recordings_started(), 0);
    assert!(booth.session().is_pristine());
}

#[tokio::test(start_paused = true)]
async fn test_results_of_reset_session_are_discarded() {
    let dir = tempfile::tempdir().unwrap();
    write_frame_asset(dir.path());
    let storage = Arc::new(MemoryStorage {
        delay: Duration::from_secs(2),
        ..MemoryStorage::default()
    });
    let mut booth = booth_with(
        camera(Duration::from_millis(100)),
        dir.path(),
        storage.clone(),
        TestShortener::default(),
    );

    booth.select_frame("film");
    booth.start().await.unwrap();
    take_four(&mut booth).await;
    let old_id = booth.session().id();

    booth.reset();
    assert!(booth.session().is_pristine());
    assert_ne!(booth.session().id(), old_id);
    assert!(booth.collage().is_none());
    assert!(booth.next_event().await.is_none());

    // Let the old uploads finish; their results must not leak into the next run
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(booth.share_link(ArtifactKind::Collage).is_none());

    booth.select_frame("film");
    booth.start().await.unwrap();
    take_four(&mut booth).await;
    let events = booth.settle().await;

    assert_eq!(events.len(), 3, "{:?}", events);
    assert!(booth.share_link(ArtifactKind::Collage).is_some());
    assert_eq!(booth.recordings_started(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_save_artifacts_writes_download_names() {
    let dir = tempfile::tempdir().unwrap();
    write_frame_asset(dir.path());
    let out = tempfile::tempdir().unwrap();
    let mut booth = Booth::new(
        camera(Duration::from_millis(100)),
        FrameCatalog::stock(dir.path()),
    );

    booth.select_frame("film");
    booth.start().await.unwrap();
    take_four(&mut booth).await;
    booth.settle().await;

    let saved = booth.save_artifacts(out.path()).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert!(out.path().join("collage.jpg").is_file());
    assert!(out.path().join("video.mjpeg").is_file());

    let collage = image::open(out.path().join("collage.jpg")).unwrap();
    assert_eq!((collage.width(), collage.height()), (1800, 1200));
}
