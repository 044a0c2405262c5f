// SPDX-License-Identifier: MPL-2.0

//! Collage compositor
//!
//! Turns four captured stills and one frame overlay into the 1800×1200
//! collage:
//!
//! ```text
//! frame ─┐
//! p0 ────┤                 ┌──────────────┐   ┌────────┐   ┌──────────┐
//! p1 ────┼─ decode (x5) ──▶│ crop + scale │──▶│ slots  │──▶│ overlay  │──▶ JPEG
//! p2 ────┤   join all      │  per photo   │   │ 0 → 3  │   │  frame   │
//! p3 ────┘                 └──────────────┘   └────────┘   └──────────┘
//! ```
//!
//! All five decodes run concurrently and nothing is drawn until every one of
//! them has finished. One failed decode fails the whole collage.

use super::encoding::{EncodingQuality, PhotoEncoder};
use crate::catalog::FrameAsset;
use crate::constants::{PHOTO_COUNT, layout};
use crate::errors::CompositionError;
use crate::session::{CapturedPhoto, FrameId};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::{try_join, try_join_all};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

/// Region of a source image kept by the center-crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Center-crop a `src_w`×`src_h` image to the aspect ratio of `dst_w`×`dst_h`
///
/// Sources wider than the target keep their full height and lose width
/// equally on both sides; all others keep their full width and lose height
/// equally at top and bottom. Scaling the returned region to the destination
/// box is then uniform, so there is no letterboxing and no distortion.
pub fn fit_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> CropRect {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return CropRect {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        };
    }

    let (sw, sh, dw, dh) = (src_w as u64, src_h as u64, dst_w as u64, dst_h as u64);

    // r > target  <=>  sw/sh > dw/dh
    if sw * dh > sh * dw {
        let width = ((sh * dw + dh / 2) / dh).clamp(1, sw) as u32;
        CropRect {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        let height = ((sw * dh + dw / 2) / dw).clamp(1, sh) as u32;
        CropRect {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Composed output image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collage {
    /// JPEG bytes
    pub image: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// Frame the collage was composed with
    pub frame_id: FrameId,
}

impl Collage {
    /// `data:` URI for embedding the collage directly
    pub fn to_data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.image))
    }
}

/// Collage compositor
#[derive(Debug, Clone)]
pub struct CollageCompositor {
    encoder: PhotoEncoder,
}

impl CollageCompositor {
    pub fn new(quality: EncodingQuality) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_quality(quality);
        Self { encoder }
    }

    /// Compose four photos and a frame overlay into a collage
    pub async fn compose(
        &self,
        photos: &[CapturedPhoto],
        frame: &FrameAsset,
    ) -> Result<Collage, CompositionError> {
        if photos.len() != PHOTO_COUNT {
            return Err(CompositionError::WrongPhotoCount {
                expected: PHOTO_COUNT,
                actual: photos.len(),
            });
        }

        info!(frame = %frame.id, "Composing collage");

        let photo_decodes = photos.iter().map(|photo| {
            decode(
                format!("photo {}", photo.slot_index),
                Arc::clone(&photo.data),
            )
        });
        let frame_decode = decode(format!("frame '{}'", frame.id), Arc::clone(&frame.data));

        let (frame_image, mut decoded) = try_join(frame_decode, try_join_all(photo_decodes)).await?;

        // Draw order follows slot index, not completion order
        let mut slotted: Vec<(usize, RgbaImage)> = photos
            .iter()
            .map(|photo| photo.slot_index)
            .zip(decoded.drain(..))
            .collect();
        slotted.sort_by_key(|(slot, _)| *slot);
        let slotted: Vec<RgbaImage> = slotted.into_iter().map(|(_, image)| image).collect();

        let encoder = self.encoder.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            let canvas = draw_collage(&slotted, &frame_image);
            encoder
                .encode_sync(&canvas)
                .map_err(CompositionError::EncodingFailed)
        })
        .await
        .map_err(|e| CompositionError::TaskFailed(e.to_string()))??;

        info!(
            width = encoded.width,
            height = encoded.height,
            size = encoded.data.len(),
            "Collage composed"
        );

        Ok(Collage {
            image: Arc::from(encoded.data.into_boxed_slice()),
            width: encoded.width,
            height: encoded.height,
            frame_id: frame.id.clone(),
        })
    }
}

impl Default for CollageCompositor {
    fn default() -> Self {
        Self::new(EncodingQuality::default())
    }
}

/// Decode one buffer on the blocking pool
async fn decode(source_name: String, data: Arc<[u8]>) -> Result<RgbaImage, CompositionError> {
    tokio::task::spawn_blocking(move || {
        let image = image::load_from_memory(&data).map_err(|e| CompositionError::DecodeFailed {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        debug!(
            source = %source_name,
            width = image.width(),
            height = image.height(),
            "Decoded"
        );
        Ok(image.to_rgba8())
    })
    .await
    .map_err(|e| CompositionError::TaskFailed(e.to_string()))?
}

/// Crop and scale one photo to exactly fill a slot
pub fn fit_to_slot(photo: &RgbaImage) -> RgbaImage {
    let crop = fit_crop(
        photo.width(),
        photo.height(),
        layout::SLOT_WIDTH,
        layout::SLOT_HEIGHT,
    );
    let cropped = imageops::crop_imm(photo, crop.x, crop.y, crop.width, crop.height).to_image();
    imageops::resize(
        &cropped,
        layout::SLOT_WIDTH,
        layout::SLOT_HEIGHT,
        FilterType::Triangle,
    )
}

/// Draw slotted photos and the overlay onto a fresh canvas
///
/// `photos` must be in slot order. The frame is stretched to the canvas if
/// its size differs and alpha-blended on top of everything.
pub fn draw_collage(photos: &[RgbaImage], frame: &RgbaImage) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(
        layout::CANVAS_WIDTH,
        layout::CANVAS_HEIGHT,
        Rgba([255, 255, 255, 255]),
    );

    for (slot_index, photo) in photos.iter().enumerate().take(PHOTO_COUNT) {
        let (x, y) = layout::SLOT_POSITIONS[slot_index];
        let fitted = fit_to_slot(photo);
        imageops::replace(&mut canvas, &fitted, x as i64, y as i64);
    }

    if frame.dimensions() == (layout::CANVAS_WIDTH, layout::CANVAS_HEIGHT) {
        imageops::overlay(&mut canvas, frame, 0, 0);
    } else {
        debug!(
            width = frame.width(),
            height = frame.height(),
            "Stretching frame asset to canvas"
        );
        let stretched = imageops::resize(
            frame,
            layout::CANVAS_WIDTH,
            layout::CANVAS_HEIGHT,
            FilterType::Triangle,
        );
        imageops::overlay(&mut canvas, &stretched, 0, 0);
    }

    canvas
}
