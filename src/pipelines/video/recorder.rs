// SPDX-License-Identifier: MPL-2.0

//! Live stream recorder
//!
//! Records the camera feed while a session is capturing:
//!
//! ```text
//! arm() ──▶ wait for stream ──▶ subscribe ──▶ sample + encode ──▶ stop()
//!              │      ▲                                           │
//!              │      └── readiness events, or poll every 500ms   ▼
//!              └────────── stop() here: nothing recorded     PendingRecording
//! ```
//!
//! Preview keeps running during recording; the recorder is just another
//! subscriber of the feed's stream and never closes it.

use super::mjpeg::{self, MjpegWriter};
use crate::backends::camera::{CameraFeed, MediaStream};
use crate::constants::{recording, timing};
use crate::errors::RecordingError;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Recorder tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Polling interval for feeds without readiness events
    pub poll_interval: Duration,
    /// Upper bound on recorded frames per second (0 = unlimited)
    pub max_fps: u32,
    /// Frames kept at most; later frames are dropped
    pub max_frames: usize,
    /// JPEG quality of each frame
    pub frame_quality: u8,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            poll_interval: timing::STREAM_POLL_INTERVAL,
            max_fps: recording::DEFAULT_MAX_FPS,
            max_frames: recording::DEFAULT_MAX_FRAMES,
            frame_quality: recording::FRAME_JPEG_QUALITY,
        }
    }
}

impl RecorderConfig {
    fn min_frame_gap(&self) -> Duration {
        if self.max_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / self.max_fps
        }
    }
}

/// Finalized video of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Motion-JPEG bytes
    pub blob: Arc<[u8]>,
    pub frame_count: usize,
    /// Time between the first subscription and stop
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
}

/// A recording that is still being flushed
///
/// Returned by [`StreamRecorder::stop`]. Resolves to `None` when nothing was
/// recorded, for example when the stream never became ready.
#[derive(Debug, Default)]
pub struct PendingRecording {
    task: Option<JoinHandle<Option<Recording>>>,
}

impl PendingRecording {
    /// Handle that resolves to nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.task.is_none()
    }

    /// Wait for finalization
    pub async fn finish(self) -> Option<Recording> {
        let task = self.task?;
        match task.await {
            Ok(recording) => recording,
            Err(e) => {
                warn!(error = %e, "Recording task failed");
                None
            }
        }
    }
}

struct ActiveRecording {
    stop_sender: Option<oneshot::Sender<()>>,
    task: JoinHandle<Option<Recording>>,
}

/// Records the live feed between [`arm`](Self::arm) and [`stop`](Self::stop)
pub struct StreamRecorder {
    config: RecorderConfig,
    active: Option<ActiveRecording>,
    started: Arc<AtomicUsize>,
}

impl StreamRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            active: None,
            started: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Whether an armed recording has not yet been stopped
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of recordings that actually began capturing frames
    pub fn recordings_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Begin waiting for the feed's stream and record once it appears
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, feed: Arc<dyn CameraFeed>) -> Result<(), RecordingError> {
        if self.active.is_some() {
            return Err(RecordingError::AlreadyRecording);
        }

        let (stop_sender, stop_receiver) = oneshot::channel();
        let config = self.config;
        let started = Arc::clone(&self.started);

        info!(
            max_fps = config.max_fps,
            max_frames = config.max_frames,
            "Recorder armed"
        );
        let task = tokio::spawn(record(feed, config, stop_receiver, started));

        self.active = Some(ActiveRecording {
            stop_sender: Some(stop_sender),
            task,
        });
        Ok(())
    }

    /// Stop recording; a no-op when idle
    ///
    /// Returns immediately. The returned handle resolves once the buffered
    /// frames have been flushed into the final blob.
    pub fn stop(&mut self) -> PendingRecording {
        let Some(mut active) = self.active.take() else {
            debug!("Recorder not active, nothing to stop");
            return PendingRecording::empty();
        };

        if let Some(sender) = active.stop_sender.take() {
            // The task may already have ended on its own (stream closed)
            let _ = sender.send(());
        }
        info!("Recorder stopped");

        PendingRecording {
            task: Some(active.task),
        }
    }
}

impl Default for StreamRecorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl Drop for StreamRecorder {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

/// Wait until the feed exposes its stream
///
/// Prefers readiness events; if the feed offers none (or its notifier goes
/// away) the feed is polled at `poll_interval`.
async fn wait_for_stream(feed: &dyn CameraFeed, poll_interval: Duration) -> MediaStream {
    if let Some(stream) = feed.underlying_stream() {
        return stream;
    }

    if let Some(mut events) = feed.stream_events() {
        debug!("Waiting for stream readiness event");
        loop {
            let current = events.borrow_and_update().clone();
            if let Some(stream) = current {
                return stream;
            }
            if events.changed().await.is_err() {
                debug!("Readiness notifier closed, falling back to polling");
                break;
            }
        }
    }

    debug!(
        interval_ms = poll_interval.as_millis() as u64,
        "Polling for stream"
    );
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Some(stream) = feed.underlying_stream() {
            return stream;
        }
    }
}

async fn record(
    feed: Arc<dyn CameraFeed>,
    config: RecorderConfig,
    mut stop_receiver: oneshot::Receiver<()>,
    started: Arc<AtomicUsize>,
) -> Option<Recording> {
    let stream = tokio::select! {
        biased;
        _ = &mut stop_receiver => {
            info!("Recorder stopped before the stream was ready, nothing recorded");
            return None;
        }
        stream = wait_for_stream(feed.as_ref(), config.poll_interval) => stream,
    };

    let mut frames = stream.subscribe();
    started.fetch_add(1, Ordering::SeqCst);
    info!(stream = %stream.id(), "Recording started");
    drop(stream);

    let min_gap = config.min_frame_gap();
    let started_at = Instant::now();
    let mut last_kept: Option<Instant> = None;
    let mut writer = MjpegWriter::new();
    let mut skipped: u64 = 0;

    loop {
        let frame = tokio::select! {
            biased;
            _ = &mut stop_receiver => break,
            received = frames.recv() => match received {
                Ok(frame) => frame,
                Err(RecvError::Lagged(count)) => {
                    skipped += count;
                    continue;
                }
                Err(RecvError::Closed) => {
                    info!("Stream closed, ending recording");
                    break;
                }
            },
        };

        if writer.frame_count() >= config.max_frames {
            skipped += 1;
            continue;
        }
        let now = Instant::now();
        if last_kept.is_some_and(|last| now.duration_since(last) < min_gap) {
            continue;
        }
        last_kept = Some(now);

        let (width, height) = (frame.width, frame.height);
        let quality = config.frame_quality;
        match tokio::task::spawn_blocking(move || mjpeg::encode_frame(&frame, quality)).await {
            Ok(Ok(jpeg)) => writer.push_jpeg(&jpeg, width, height),
            Ok(Err(e)) => warn!(error = %e, "Dropping frame"),
            Err(e) => warn!(error = %e, "Frame encoding task failed"),
        }
    }

    if skipped > 0 {
        debug!(skipped, "Frames skipped while recording");
    }
    writer.finish(started_at.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::CameraFrame;
    use std::sync::Mutex;

    /// Feed without readiness events; the stream is set by the test
    #[derive(Default)]
    struct PolledFeed {
        stream: Mutex<Option<MediaStream>>,
    }

    impl PolledFeed {
        fn open(&self) -> MediaStream {
            let stream = MediaStream::new(8);
            *self.stream.lock().unwrap() = Some(stream.clone());
            stream
        }
    }

    impl CameraFeed for PolledFeed {
        fn current_frame(&self) -> Option<Arc<CameraFrame>> {
            None
        }

        fn underlying_stream(&self) -> Option<MediaStream> {
            self.stream.lock().unwrap().clone()
        }
    }

    fn frame(value: u8) -> Arc<CameraFrame> {
        Arc::new(CameraFrame::from_rgba(4, 4, vec![value; 64]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_ready_records_nothing() {
        let feed = Arc::new(PolledFeed::default());
        let mut recorder = StreamRecorder::default();
        recorder.arm(feed.clone()).unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        let pending = recorder.stop();
        assert!(pending.finish().await.is_none());

        // Stream shows up after cancellation: recording must not start
        feed.open();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(recorder.recordings_started(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_picks_up_late_stream() {
        let feed = Arc::new(PolledFeed::default());
        let mut recorder = StreamRecorder::default();
        recorder.arm(feed.clone()).unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;
        let stream = feed.open();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(recorder.recordings_started(), 1);
        assert_eq!(stream.subscriber_count(), 1);

        for value in [10, 20, 30] {
            stream.publish(frame(value));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let recording = recorder.stop().finish().await.unwrap();
        assert_eq!(recording.frame_count, 3);
        assert_eq!((recording.width, recording.height), (4, 4));
        // The recorder never closes the stream it observed
        let mut late = feed.underlying_stream().unwrap().subscribe();
        stream.publish(frame(40));
        assert_eq!(late.try_recv().unwrap().data[0], 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_twice_is_rejected() {
        let feed = Arc::new(PolledFeed::default());
        let mut recorder = StreamRecorder::default();
        recorder.arm(feed.clone()).unwrap();

        assert_eq!(
            recorder.arm(feed.clone()),
            Err(RecordingError::AlreadyRecording)
        );
        assert!(recorder.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let mut recorder = StreamRecorder::default();
        assert!(recorder.stop().is_empty());

        recorder.arm(Arc::new(PolledFeed::default())).unwrap();
        let first = recorder.stop();
        let second = recorder.stop();
        assert!(!first.is_empty());
        assert!(second.is_empty());
        assert!(!recorder.is_active());
        assert!(first.finish().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_rate_is_capped() {
        let feed = Arc::new(PolledFeed::default());
        let stream = feed.open();
        let mut recorder = StreamRecorder::new(RecorderConfig {
            max_fps: 5,
            ..RecorderConfig::default()
        });
        recorder.arm(feed.clone()).unwrap();
        tokio::task::yield_now().await;

        // 10 frames over ~1s at 5 fps
        for value in 0..10 {
            stream.publish(frame(value));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let recording = recorder.stop().finish().await.unwrap();
        assert!(recording.frame_count <= 6, "got {}", recording.frame_count);
        assert!(recording.frame_count >= 4, "got {}", recording.frame_count);
    }
}
