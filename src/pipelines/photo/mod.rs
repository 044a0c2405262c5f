// SPDX-License-Identifier: MPL-2.0

//! Photo pipeline
//!
//! ```text
//! Camera Feed → Capture → JPEG still → Session (x4) → Collage → JPEG
//!       ↓
//! Preview continues uninterrupted
//! ```
//!
//! # Stages
//!
//! 1. **Capture** ([`capture`]): grab the current frame, mirror, encode
//! 2. **Compose** ([`collage`]): decode all stills, crop into slots, overlay
//!    the frame asset
//! 3. **Encode** ([`encoding`]): JPEG for stills and the collage, PNG for
//!    exported codes

pub mod capture;
pub mod collage;
pub mod encoding;

pub use capture::PhotoCapture;
pub use collage::{Collage, CollageCompositor, CropRect, fit_crop};
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
