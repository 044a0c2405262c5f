// SPDX-License-Identifier: GPL-3.0-only

//! Booth session state machine
//!
//! ```text
//!            select_frame(id)
//!               ┌──────┐
//!               ▼      │
//!           ┌──────────┴┐  start()   ┌───────────┐  4th capture()  ┌──────────┐
//!           │   Idle    ├───────────▶│ Capturing ├────────────────▶│ Composed │
//!           └───────────┘            └───────────┘                 └──────────┘
//!                 ▲                                                      │
//!                 └───────────────────── reset() ────────────────────────┘
//! ```
//!
//! The session only tracks state. Starting the recorder, composing and
//! publishing are done by [`crate::booth::Booth`] in response to the outcomes
//! returned here.

use crate::constants::{PHOTO_COUNT, layout};
use crate::errors::SessionError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Phase of one booth run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No capture in progress
    #[default]
    Idle,
    /// Frame chosen, photos being taken
    Capturing,
    /// Four photos taken, collage handed to the compositor
    Composed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Capturing => write!(f, "capturing"),
            SessionPhase::Composed => write!(f, "composed"),
        }
    }
}

/// Identifier of a frame asset in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameId(String);

impl FrameId {
    /// Create a frame id; blank ids are rejected
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One captured still
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// Encoded still image (JPEG)
    pub data: Arc<[u8]>,
    /// Position in the session, 0-3
    pub slot_index: usize,
    /// Source width in pixels
    pub width: u32,
    /// Source height in pixels
    pub height: u32,
}

impl CapturedPhoto {
    /// Top-left corner of this photo's slot on the collage canvas
    pub fn slot_position(&self) -> (u32, u32) {
        layout::SLOT_POSITIONS[self.slot_index]
    }
}

/// Result of [`Session::capture`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Photo stored; more are needed
    Appended { slot_index: usize },
    /// Fourth photo stored; the session moved to `Composed`
    Completed { photos: [CapturedPhoto; PHOTO_COUNT] },
    /// Not capturing (idle, already composed, or duplicate trigger)
    Ignored,
}

/// Root aggregate for one booth run
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    phase: SessionPhase,
    selected_frame: Option<FrameId>,
    photos: Vec<CapturedPhoto>,
}

impl Session {
    /// Fresh idle session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            selected_frame: None,
            photos: Vec::with_capacity(PHOTO_COUNT),
        }
    }

    /// Unique id of this session instance; changes on every reset
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected_frame(&self) -> Option<&FrameId> {
        self.selected_frame.as_ref()
    }

    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    /// Whether a capture now would store a photo
    pub fn accepts_photos(&self) -> bool {
        self.phase == SessionPhase::Capturing && self.photos.len() < PHOTO_COUNT
    }

    /// True for an idle session with nothing selected or captured
    pub fn is_pristine(&self) -> bool {
        self.phase == SessionPhase::Idle && self.selected_frame.is_none() && self.photos.is_empty()
    }

    /// Choose the frame overlay
    ///
    /// Only honoured while idle. Returns whether the selection was applied.
    pub fn select_frame(&mut self, id: FrameId) -> bool {
        if self.phase != SessionPhase::Idle {
            debug!(phase = %self.phase, frame = %id, "Ignoring frame selection");
            return false;
        }
        info!(frame = %id, "Frame selected");
        self.selected_frame = Some(id);
        true
    }

    /// Frame id that `start` would lock in
    pub fn check_can_start(&self) -> Result<&FrameId, SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::PreconditionViolation(format!(
                "session already {}",
                self.phase
            )));
        }
        self.selected_frame
            .as_ref()
            .ok_or_else(|| SessionError::PreconditionViolation("frame not selected".into()))
    }

    /// Enter `Capturing`
    pub fn start(&mut self) -> Result<(), SessionError> {
        let frame = self.check_can_start()?.clone();
        self.phase = SessionPhase::Capturing;
        info!(session = %self.id, frame = %frame, "Capture started");
        Ok(())
    }

    /// Append a photo at the next slot
    pub fn capture(&mut self, data: Arc<[u8]>, width: u32, height: u32) -> CaptureOutcome {
        if !self.accepts_photos() {
            debug!(
                phase = %self.phase,
                photos = self.photos.len(),
                "Ignoring capture"
            );
            return CaptureOutcome::Ignored;
        }

        let slot_index = self.photos.len();
        self.photos.push(CapturedPhoto {
            data,
            slot_index,
            width,
            height,
        });
        info!(slot = slot_index, width, height, "Photo captured");

        if self.photos.len() < PHOTO_COUNT {
            return CaptureOutcome::Appended { slot_index };
        }

        self.phase = SessionPhase::Composed;
        let photos = [
            self.photos[0].clone(),
            self.photos[1].clone(),
            self.photos[2].clone(),
            self.photos[3].clone(),
        ];
        info!(session = %self.id, "All photos captured");
        CaptureOutcome::Completed { photos }
    }

    /// Discard everything and start over as a fresh idle session
    pub fn reset(&mut self) {
        info!(session = %self.id, phase = %self.phase, "Session reset");
        *self = Self::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
