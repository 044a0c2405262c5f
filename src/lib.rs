// SPDX-License-Identifier: MPL-2.0

//! Photo booth - four snapshots, one framed collage, one session video
//!
//! A session runs through three phases: a frame overlay is picked, four
//! photos are taken from a live camera feed while the feed is recorded, and
//! the photos are composed into a collage. Both the collage and the video are
//! then published as short links with a scannable code.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`booth`]: Orchestrator owning the session and background work
//! - [`session`]: Session state machine
//! - [`backends`]: Camera feed abstraction and the file-backed virtual camera
//! - [`pipelines`]: Photo capture, collage composition and stream recording
//! - [`distribution`]: Upload, link shortening and QR codes
//! - [`catalog`]: Frame overlays
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let mut booth = Booth::from_config(&Config::load()?, camera)?;
//! booth.select_frame("film");
//! booth.start().await?;
//! for _ in 0..4 {
//!     booth.take_snapshot().await?;
//! }
//! let events = booth.settle().await;
//! ```

pub mod backends;
pub mod booth;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod distribution;
pub mod errors;
pub mod pipelines;
pub mod session;

// Re-export commonly used types
pub use booth::{Booth, BoothEvent};
pub use catalog::{FrameAsset, FrameCatalog};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use session::{CaptureOutcome, CapturedPhoto, FrameId, Session, SessionPhase};
