// SPDX-License-Identifier: MPL-2.0

//! Photo capture from the camera feed
//!
//! Grabs the feed's current frame, encodes it to JPEG and hands it to the
//! session. The live preview is never paused; the frame is shared through an
//! `Arc` and copied only while encoding.

use super::encoding::{EncodingQuality, PhotoEncoder};
use crate::backends::camera::{CameraFeed, CameraFrame};
use crate::errors::CaptureError;
use crate::session::{CaptureOutcome, Session};
use image::imageops;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Photo capture handler
#[derive(Debug, Clone)]
pub struct PhotoCapture {
    encoder: PhotoEncoder,
    mirror: bool,
}

impl PhotoCapture {
    /// Create a capture controller
    ///
    /// With `mirror` set, stills are flipped horizontally so they match the
    /// selfie-style preview.
    pub fn new(quality: EncodingQuality, mirror: bool) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_quality(quality);
        Self { encoder, mirror }
    }

    /// Take one snapshot and record it in the session
    ///
    /// Fails with [`CaptureError::FeedNotReady`] when the feed has no readable
    /// frame; the session is left untouched in that case. No retry is made.
    pub fn take_snapshot(
        &self,
        feed: &dyn CameraFeed,
        session: &mut Session,
    ) -> Result<CaptureOutcome, CaptureError> {
        if !session.accepts_photos() {
            debug!(phase = %session.phase(), "Snapshot ignored, session not capturing");
            return Ok(CaptureOutcome::Ignored);
        }

        let Some(frame) = feed.current_frame() else {
            info!("No frame available to capture");
            return Err(CaptureError::FeedNotReady);
        };

        let (data, width, height) = self.encode_frame(&frame)?;
        Ok(session.capture(data, width, height))
    }

    /// Encode a frame into still-image bytes
    pub fn encode_frame(&self, frame: &CameraFrame) -> Result<(Arc<[u8]>, u32, u32), CaptureError> {
        let Some(mut image) = frame.to_rgba_image() else {
            warn!(
                width = frame.width,
                height = frame.height,
                len = frame.data.len(),
                "Frame buffer does not match its geometry"
            );
            return Err(CaptureError::FeedNotReady);
        };

        if self.mirror {
            imageops::flip_horizontal_in_place(&mut image);
        }

        let encoded = self
            .encoder
            .encode_sync(&image)
            .map_err(CaptureError::EncodingFailed)?;

        debug!(
            width = encoded.width,
            height = encoded.height,
            size = encoded.data.len(),
            "Snapshot encoded"
        );

        Ok((
            Arc::from(encoded.data.into_boxed_slice()),
            encoded.width,
            encoded.height,
        ))
    }
}

impl Default for PhotoCapture {
    fn default() -> Self {
        Self::new(EncodingQuality::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::MediaStream;
    use crate::session::{FrameId, SessionPhase};

    struct StillFeed(Option<Arc<CameraFrame>>);

    impl CameraFeed for StillFeed {
        fn current_frame(&self) -> Option<Arc<CameraFrame>> {
            self.0.clone()
        }

        fn underlying_stream(&self) -> Option<MediaStream> {
            None
        }
    }

    fn capturing_session() -> Session {
        let mut session = Session::new();
        session.select_frame(FrameId::new("film").unwrap());
        session.start().unwrap();
        session
    }

    fn half_split_frame() -> CameraFrame {
        // Left half white, right half black
        let mut data = Vec::new();
        for _ in 0..16 {
            for x in 0..32 {
                let v = if x < 16 { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        CameraFrame::from_rgba(32, 16, data)
    }

    #[test]
    fn test_feed_not_ready_leaves_session_untouched() {
        let mut session = capturing_session();
        let result = PhotoCapture::default().take_snapshot(&StillFeed(None), &mut session);

        assert_eq!(result, Err(CaptureError::FeedNotReady));
        assert!(session.photos().is_empty());
        assert_eq!(session.phase(), SessionPhase::Capturing);
    }

    #[test]
    fn test_snapshot_appends_one_photo() {
        let mut session = capturing_session();
        let feed = StillFeed(Some(Arc::new(half_split_frame())));

        let outcome = PhotoCapture::default()
            .take_snapshot(&feed, &mut session)
            .unwrap();

        assert_eq!(outcome, CaptureOutcome::Appended { slot_index: 0 });
        let photo = &session.photos()[0];
        assert_eq!((photo.width, photo.height), (32, 16));
        assert!(image::load_from_memory(&photo.data).is_ok());
    }

    #[test]
    fn test_snapshot_ignored_when_idle() {
        let mut session = Session::new();
        let feed = StillFeed(Some(Arc::new(half_split_frame())));

        let outcome = PhotoCapture::default()
            .take_snapshot(&feed, &mut session)
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Ignored);
    }

    #[test]
    fn test_mirror_flips_horizontally() {
        let frame = half_split_frame();
        let (mirrored, _, _) = PhotoCapture::new(EncodingQuality::Maximum, true)
            .encode_frame(&frame)
            .unwrap();
        let (plain, _, _) = PhotoCapture::new(EncodingQuality::Maximum, false)
            .encode_frame(&frame)
            .unwrap();

        let mirrored = image::load_from_memory(&mirrored).unwrap().to_rgb8();
        let plain = image::load_from_memory(&plain).unwrap().to_rgb8();
        assert!(mirrored.get_pixel(2, 8)[0] < 64);
        assert!(plain.get_pixel(2, 8)[0] > 192);
    }
}
