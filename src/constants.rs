// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Number of photos in one booth session
pub const PHOTO_COUNT: usize = 4;

/// Collage template geometry
///
/// The output canvas is a fixed 1800×1200 surface with four 654×523
/// windows. The frame asset artwork is drawn over everything else.
pub mod layout {
    /// Output canvas width
    pub const CANVAS_WIDTH: u32 = 1800;

    /// Output canvas height
    pub const CANVAS_HEIGHT: u32 = 1200;

    /// Width of one photo slot
    pub const SLOT_WIDTH: u32 = 654;

    /// Height of one photo slot
    pub const SLOT_HEIGHT: u32 = 523;

    /// Top-left corner of each slot, in capture order
    pub const SLOT_POSITIONS: [(u32, u32); super::PHOTO_COUNT] =
        [(71, 68), (741, 68), (71, 608), (741, 608)];

    /// Position of a slot, or `None` when the index is out of range
    pub fn slot_position(slot_index: usize) -> Option<(u32, u32)> {
        SLOT_POSITIONS.get(slot_index).copied()
    }
}

/// Download names for finished artifacts
pub mod artifacts {
    /// Collage file name
    pub const COLLAGE_FILENAME: &str = "collage.jpg";

    /// Collage MIME type
    pub const COLLAGE_MIME: &str = "image/jpeg";

    /// Session video file name
    pub const VIDEO_FILENAME: &str = "video.mjpeg";

    /// Session video MIME type
    pub const VIDEO_MIME: &str = "video/x-motion-jpeg";
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Fallback polling interval for feeds that cannot announce stream readiness
    pub const STREAM_POLL_INTERVAL: Duration = Duration::from_millis(500);

    /// Upper bound for one upload + shorten round trip
    pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// Stream recorder limits
pub mod recording {
    /// Default cap on the sampled frame rate
    pub const DEFAULT_MAX_FPS: u32 = 15;

    /// Default cap on recorded frames (~2 minutes at 15 fps)
    pub const DEFAULT_MAX_FRAMES: usize = 1800;

    /// JPEG quality for individual video frames
    pub const FRAME_JPEG_QUALITY: u8 = 75;
}

/// Supported file formats for the virtual camera
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Virtual camera timing constants
pub mod virtual_camera {
    use super::Duration;

    /// Frame rate for image streaming (~30fps)
    pub const IMAGE_STREAM_FRAME_DURATION: Duration = Duration::from_millis(33);

    /// Simulated device warm-up before the stream handle appears
    pub const STARTUP_DELAY: Duration = Duration::from_millis(750);

    /// Broadcast buffer for stream subscribers
    pub const STREAM_CAPACITY: usize = 8;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// User agent sent to the storage and shortener endpoints
    pub fn user_agent() -> String {
        format!("photobooth/{}", version())
    }
}
