// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backed by still images
//!
//! Streams a fixed set of frames in a loop, the way a webcam delivers a
//! continuous preview. The stream handle only appears after a warm-up delay,
//! so consumers have to cope with a feed that is not ready yet.
//!
//! ```text
//! start() ──▶ warm-up ──▶ stream handle published ──▶ frame loop (~30fps)
//!                              │                          │
//!                              ▼                          ▼
//!                       stream_events()           current_frame()
//! ```

mod file_source;

pub use file_source::{collect_image_paths, load_frames, load_image_as_frame};

use crate::backends::camera::{CameraFeed, CameraFrame, MediaStream};
use crate::constants::{timing, virtual_camera as vc_timing};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// File-backed camera feed
pub struct VirtualCamera {
    frames: Arc<Vec<CameraFrame>>,
    startup_delay: Duration,
    frame_duration: Duration,
    current_tx: watch::Sender<Option<Arc<CameraFrame>>>,
    stream_tx: watch::Sender<Option<MediaStream>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl VirtualCamera {
    /// Create a virtual camera cycling through `frames`
    pub fn new(frames: Vec<CameraFrame>) -> Self {
        let (current_tx, _) = watch::channel(None);
        let (stream_tx, _) = watch::channel(None);
        Self {
            frames: Arc::new(frames),
            startup_delay: vc_timing::STARTUP_DELAY,
            frame_duration: vc_timing::IMAGE_STREAM_FRAME_DURATION,
            current_tx,
            stream_tx,
            task: Mutex::new(None),
        }
    }

    /// Create a virtual camera from image files or directories of images
    pub fn from_paths(sources: &[PathBuf]) -> crate::errors::AppResult<Self> {
        Ok(Self::new(load_frames(sources)?))
    }

    /// Override the warm-up delay before the stream appears
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Override the interval between frames
    pub fn with_frame_duration(mut self, duration: Duration) -> Self {
        self.frame_duration = duration;
        self
    }

    /// Whether the frame loop is running
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|task| task.as_ref().is_some_and(|t| !t.is_finished()))
            .unwrap_or(false)
    }

    /// Start the device: warm up, publish the stream, then loop frames
    ///
    /// Must be called from within a tokio runtime. Calling it while already
    /// running is a no-op.
    pub fn start(&self) {
        let Ok(mut task) = self.task.lock() else {
            return;
        };
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Virtual camera already running");
            return;
        }
        if self.frames.is_empty() {
            info!("Virtual camera has no frames, not starting");
            return;
        }

        info!(
            frames = self.frames.len(),
            startup_ms = self.startup_delay.as_millis() as u64,
            "Starting virtual camera"
        );

        let frames = Arc::clone(&self.frames);
        let startup_delay = self.startup_delay;
        let frame_duration = self.frame_duration;
        let current_tx = self.current_tx.clone();
        let stream_tx = self.stream_tx.clone();

        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(startup_delay).await;

            let stream = MediaStream::new(vc_timing::STREAM_CAPACITY);
            stream_tx.send_replace(Some(stream.clone()));
            info!(stream = %stream.id(), "Virtual camera stream ready");

            let mut ticker = tokio::time::interval(frame_duration);
            let mut index: u64 = 0;
            loop {
                ticker.tick().await;
                let frame = Arc::new(frames[(index as usize) % frames.len()].clone());
                current_tx.send_replace(Some(Arc::clone(&frame)));
                let receivers = stream.publish(frame);
                if index % timing::FRAME_LOG_INTERVAL == 0 {
                    trace!(frame = index, receivers, "Virtual camera frame");
                }
                index += 1;
            }
        }));
    }

    /// Stop the frame loop and withdraw the stream handle
    pub fn stop(&self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(handle) = task.take()
        {
            handle.abort();
            info!("Virtual camera stopped");
        }
        self.stream_tx.send_replace(None);
        self.current_tx.send_replace(None);
    }
}

impl CameraFeed for VirtualCamera {
    fn current_frame(&self) -> Option<Arc<CameraFrame>> {
        self.current_tx.borrow().clone()
    }

    fn underlying_stream(&self) -> Option<MediaStream> {
        self.stream_tx.borrow().clone()
    }

    fn stream_events(&self) -> Option<watch::Receiver<Option<MediaStream>>> {
        Some(self.stream_tx.subscribe())
    }
}

impl Drop for VirtualCamera {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(handle) = task.take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(value: u8) -> CameraFrame {
        CameraFrame::from_rgba(2, 2, vec![value; 16])
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_before_warm_up() {
        let camera = VirtualCamera::new(vec![solid_frame(1)])
            .with_startup_delay(Duration::from_millis(500));
        camera.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(camera.current_frame().is_none());
        assert!(camera.underlying_stream().is_none());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(camera.underlying_stream().is_some());
        assert!(camera.current_frame().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_events_announce_readiness() {
        let camera = VirtualCamera::new(vec![solid_frame(1)])
            .with_startup_delay(Duration::from_millis(200));
        let mut events = camera.stream_events().unwrap();
        camera.start();

        let stream = events.wait_for(|s| s.is_some()).await.unwrap().clone();
        assert!(stream.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_cycle_through_stream() {
        let camera = VirtualCamera::new(vec![solid_frame(1), solid_frame(2)])
            .with_startup_delay(Duration::ZERO)
            .with_frame_duration(Duration::from_millis(10));
        let mut events = camera.stream_events().unwrap();
        camera.start();

        let stream = events
            .wait_for(|s| s.is_some())
            .await
            .unwrap()
            .clone()
            .unwrap();
        let mut rx = stream.subscribe();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_ne!(first.data[0], second.data[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_withdraws_stream() {
        let camera = VirtualCamera::new(vec![solid_frame(1)]).with_startup_delay(Duration::ZERO);
        camera.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(camera.is_running());

        camera.stop();
        assert!(!camera.is_running());
        assert!(camera.underlying_stream().is_none());
    }
}
