// SPDX-License-Identifier: MPL-2.0

//! Motion-JPEG muxing
//!
//! A Motion-JPEG blob is nothing more than complete JPEG images written back
//! to back. Every frame starts with an SOI marker (`FF D8`), so players and
//! the tests can split the blob without a container.

use super::recorder::Recording;
use crate::backends::camera::CameraFrame;
use crate::errors::RecordingError;
use crate::pipelines::photo::encoding::encode_jpeg;
use image::DynamicImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Encode one camera frame as a standalone JPEG
pub fn encode_frame(frame: &CameraFrame, quality: u8) -> Result<Vec<u8>, RecordingError> {
    let rgba = frame.to_rgba_image().ok_or_else(|| {
        RecordingError::EncodingFailed(format!(
            "frame buffer of {} bytes does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        ))
    })?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
    encode_jpeg(&rgb, quality).map_err(RecordingError::EncodingFailed)
}

/// Accumulates JPEG frames into a single Motion-JPEG blob
#[derive(Debug, Default)]
pub struct MjpegWriter {
    buffer: Vec<u8>,
    frame_count: usize,
    width: u32,
    height: u32,
}

impl MjpegWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already encoded JPEG frame
    ///
    /// The first frame fixes the reported video size.
    pub fn push_jpeg(&mut self, jpeg: &[u8], width: u32, height: u32) {
        if self.frame_count == 0 {
            self.width = width;
            self.height = height;
        }
        self.buffer.extend_from_slice(jpeg);
        self.frame_count += 1;
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Seal the blob; an empty writer yields no recording
    pub fn finish(self, duration: Duration) -> Option<Recording> {
        if self.is_empty() {
            debug!("No frames written, discarding recording");
            return None;
        }

        debug!(
            frames = self.frame_count,
            bytes = self.buffer.len(),
            duration_ms = duration.as_millis() as u64,
            "Motion-JPEG finalized"
        );

        Some(Recording {
            blob: Arc::from(self.buffer.into_boxed_slice()),
            frame_count: self.frame_count,
            duration,
            width: self.width,
            height: self.height,
        })
    }
}
