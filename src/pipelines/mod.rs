// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for photo and video capture
//!
//! This module provides async processing pipelines that handle media capture
//! without interrupting the live camera preview. All heavy operations run
//! on the blocking pool.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │ Collage JPEG │
//! │   (RGBA)     │     │  - Mirror         │     │  1800x1200   │
//! │              │     │  - Crop to slot   │     │              │
//! │              │     │  - Frame overlay  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Media Stream │ ──▶ │  Video Pipeline   │ ──▶ │ Motion-JPEG  │
//! │ (broadcast)  │     │  - Rate limiting  │     │    blob      │
//! │              │     │  - JPEG frames    │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Design Principles
//!
//! 1. **Non-blocking**: Preview never freezes during capture
//! 2. **Join-then-commit**: A collage is drawn only after every input decoded
//! 3. **Graceful degradation**: A missing stream means no video, not an error
//!
//! # Modules
//!
//! - [`photo`]: Snapshot capture, collage composition and JPEG encoding
//! - [`video`]: Stream recording into Motion-JPEG

pub mod photo;
pub mod video;
