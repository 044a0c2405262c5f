// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! This module handles encoding images to:
//! - JPEG (with quality control), used for snapshots and the collage
//! - PNG (lossless), used for exported scannable codes
//!
//! Encoding a whole canvas is CPU-bound; [`PhotoEncoder::encode`] runs it on
//! the blocking pool.

use image::{ImageFormat, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
#[derive(Debug, Clone)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with JPEG format and high quality
    pub fn new() -> Self {
        Self {
            format: EncodingFormat::Jpeg,
            quality: EncodingQuality::High,
        }
    }

    /// Set encoding format
    pub fn set_format(&mut self, format: EncodingFormat) {
        self.format = format;
    }

    /// Set encoding quality (only affects JPEG)
    pub fn set_quality(&mut self, quality: EncodingQuality) {
        self.quality = quality;
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Encode an RGBA image on the current thread
    ///
    /// JPEG has no alpha channel, so RGBA input is flattened to RGB first.
    pub fn encode_sync(&self, image: &RgbaImage) -> Result<EncodedImage, String> {
        let (width, height) = image.dimensions();
        let data = match self.format {
            EncodingFormat::Jpeg => {
                let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                encode_jpeg(&rgb, self.quality.jpeg_quality())?
            }
            EncodingFormat::Png => encode_png(image)?,
        };

        debug!(size = data.len(), width, height, "Encoding complete");

        Ok(EncodedImage {
            data,
            format: self.format,
            width,
            height,
        })
    }

    /// Encode an RGBA image on the blocking pool
    pub async fn encode(&self, image: RgbaImage) -> Result<EncodedImage, String> {
        info!(
            width = image.width(),
            height = image.height(),
            format = ?self.format,
            "Starting encoding"
        );

        let encoder = self.clone();
        tokio::task::spawn_blocking(move || encoder.encode_sync(&image))
            .await
            .map_err(|e| format!("Encoding task error: {}", e))?
    }

    /// Save encoded data under a fixed file name
    pub async fn save(
        &self,
        encoded: &EncodedImage,
        output_dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, String> {
        let filepath = output_dir.join(filename);
        info!(path = %filepath.display(), "Saving image");

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| format!("Failed to create {}: {}", output_dir.display(), e))?;
        tokio::fs::write(&filepath, &encoded.data)
            .await
            .map_err(|e| format!("Failed to save image: {}", e))?;

        Ok(filepath)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| format!("JPEG encoding failed: {}", e))?;

    Ok(buffer)
}

/// Encode an RGBA image as PNG
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();

    image
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {}", e))?;

    Ok(buffer)
}
