// SPDX-License-Identifier: GPL-3.0-only

//! Camera feed abstraction
//!
//! The booth never talks to a camera device directly. It consumes a
//! [`CameraFeed`], which exposes two things:
//!
//! ```text
//! ┌─────────────────────┐
//! │     CameraFeed      │
//! └──────┬───────┬──────┘
//!        │       │
//!        ▼       ▼
//!  current_frame  underlying_stream
//!  (snapshots)    (recording)
//! ```
//!
//! Both the capture controller and the stream recorder read from the same
//! feed. Neither closes it; the device stays owned by the feed.

pub mod types;

pub use types::*;

use std::sync::Arc;
use tokio::sync::watch;

/// A live camera feed
pub trait CameraFeed: Send + Sync {
    /// Latest frame, or `None` while the camera is still warming up
    fn current_frame(&self) -> Option<Arc<CameraFrame>>;

    /// Underlying stream handle, or `None` until the device is initialized
    fn underlying_stream(&self) -> Option<MediaStream>;

    /// Readiness notifications for the stream handle
    ///
    /// Feeds that can announce when their stream appears return a receiver
    /// whose value flips from `None` to `Some`. Feeds returning `None` here
    /// are polled instead.
    fn stream_events(&self) -> Option<watch::Receiver<Option<MediaStream>>> {
        None
    }
}
