// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo booth
//!
//! Each pipeline stage has its own error enum. [`AppError`] aggregates them
//! for callers that drive the whole booth (the CLI, the [`crate::booth::Booth`]
//! orchestrator).
//!
//! | Error | Raised by | Recovery |
//! |-------|-----------|----------|
//! | [`CaptureError::FeedNotReady`] | capture controller | retry the snapshot |
//! | [`CompositionError`] | collage compositor | reset and recapture |
//! | [`PublishError`] | distribution pipeline | none, link stays absent |
//! | [`SessionError::PreconditionViolation`] | session state machine | fix the input |

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Session transition rejected
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// Snapshot could not be taken
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Collage could not be produced
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    /// Recording errors
    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),
    /// Upload or shortening failed
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Frame catalog lookups
    #[error("Frame catalog error: {0}")]
    Catalog(String),
    /// Storage/filesystem errors
    #[error("Storage error: {0}")]
    Storage(String),
    /// Scannable code could not be rendered
    #[error("Scannable code error: {0}")]
    Code(String),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Session state machine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation rejected because its precondition does not hold
    #[error("{0}")]
    PreconditionViolation(String),
}

/// Capture controller errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Camera is not delivering frames yet
    #[error("Camera feed is not ready")]
    FeedNotReady,
    /// Snapshot was taken but could not be encoded
    #[error("Snapshot encoding failed: {0}")]
    EncodingFailed(String),
}

/// Collage compositor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Not exactly four photos were supplied
    #[error("Expected {expected} photos, got {actual}")]
    WrongPhotoCount { expected: usize, actual: usize },
    /// A photo or the frame asset failed to decode
    #[error("Failed to decode {source_name}: {message}")]
    DecodeFailed { source_name: String, message: String },
    /// The composed canvas could not be encoded
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// A background decode or encode task died
    #[error("Compositing task error: {0}")]
    TaskFailed(String),
}

/// Stream recorder errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingError {
    /// Recording already in progress
    #[error("Recording already in progress")]
    AlreadyRecording,
    /// Frame encoding failed
    #[error("Frame encoding failed: {0}")]
    EncodingFailed(String),
}

/// Distribution pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Upload to the storage endpoint failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),
    /// Link shortening failed
    #[error("Shortening failed: {0}")]
    ShortenFailed(String),
    /// The endpoint answered with something that is not a URL
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
    /// The whole publish did not finish in time
    #[error("Publishing timed out after {0} seconds")]
    Timeout(u64),
    /// No endpoint is configured
    #[error("No {0} endpoint configured")]
    NotConfigured(&'static str),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}
