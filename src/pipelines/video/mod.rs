// SPDX-License-Identifier: MPL-2.0

//! Video recording pipeline
//!
//! This module records the live feed of a session:
//! - Waits for the feed's stream without blocking the session
//! - Continues preview during recording
//! - Encodes frames as Motion-JPEG on the blocking pool
//! - Finalizes asynchronously after stop

pub mod mjpeg;
pub mod recorder;

pub use mjpeg::MjpegWriter;
pub use recorder::{PendingRecording, RecorderConfig, Recording, StreamRecorder};
