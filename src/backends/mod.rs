// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera input
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Booth Layer                  │
//! └────────────────────┬────────────────────────┘
//!                      │  CameraFeed trait
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │  Camera types    │  │ Virtual Camera  │  │
//! │  │  (frames/stream) │  │ (image files)   │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: The [`camera::CameraFeed`] trait, frames and stream handles
//! - [`virtual_camera`]: A file-backed feed used by the command line and tests

pub mod camera;
pub mod virtual_camera;
