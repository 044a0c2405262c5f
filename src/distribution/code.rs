// SPDX-License-Identifier: GPL-3.0-only

//! Scannable code rendering
//!
//! Share links are shown as QR codes so guests can grab them with a phone.

use crate::errors::{AppError, AppResult};
use image::{GrayImage, Luma};
use qrcode::QrCode;
use qrcode::render::unicode;
use std::fmt;

/// A rendered-on-demand QR code
pub struct ScanCode {
    code: QrCode,
    payload: String,
}

impl fmt::Debug for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanCode")
            .field("payload", &self.payload)
            .field("width", &self.code.width())
            .finish()
    }
}

/// Encode `payload` as a QR code
pub fn render_code(payload: &str) -> AppResult<ScanCode> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::Code(format!("Cannot encode {} bytes: {}", payload.len(), e)))?;
    Ok(ScanCode {
        code,
        payload: payload.to_string(),
    })
}

impl ScanCode {
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Modules per side, without the quiet zone
    pub fn modules(&self) -> usize {
        self.code.width()
    }

    /// Grayscale image with `module_px` pixels per module and a quiet zone
    pub fn to_image(&self, module_px: u32) -> GrayImage {
        let px = module_px.max(1);
        self.code
            .render::<Luma<u8>>()
            .module_dimensions(px, px)
            .quiet_zone(true)
            .build()
    }

    /// Text rendering for terminals, two modules per character cell
    pub fn to_terminal(&self) -> String {
        self.code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(true)
            .build()
    }
}
