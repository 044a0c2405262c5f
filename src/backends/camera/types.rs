// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera feeds

use image::RgbaImage;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// One RGBA frame delivered by a camera feed
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride (bytes per row, may include padding)
    pub stride: u32,
}

impl CameraFrame {
    /// Wrap a tightly packed RGBA buffer
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            stride: width * 4,
        }
    }

    /// Build a frame from an already decoded image
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.into_raw())
    }

    /// Copy the frame into an [`RgbaImage`], dropping any stride padding
    ///
    /// Returns `None` if the buffer is shorter than the declared geometry.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let row_bytes = self.width as usize * 4;
        let stride = self.stride as usize;
        let height = self.height as usize;

        if self.width == 0 || self.height == 0 || stride < row_bytes {
            return None;
        }
        if self.data.len() < stride * (height - 1) + row_bytes {
            return None;
        }

        if stride == row_bytes {
            let pixels = self.data[..row_bytes * height].to_vec();
            return RgbaImage::from_raw(self.width, self.height, pixels);
        }

        let mut pixels = Vec::with_capacity(row_bytes * height);
        for row in 0..height {
            let start = row * stride;
            pixels.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        RgbaImage::from_raw(self.width, self.height, pixels)
    }
}

/// Handle to the live media stream behind a camera feed
///
/// Cloning the handle is cheap. Consumers call [`MediaStream::subscribe`] to
/// receive frames; the stream itself stays owned by the feed that created it
/// and is never closed by a subscriber.
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: Uuid,
    frames: broadcast::Sender<Arc<CameraFrame>>,
}

impl MediaStream {
    /// Create a stream that buffers up to `capacity` frames per subscriber
    pub fn new(capacity: usize) -> Self {
        let (frames, _) = broadcast::channel(capacity.max(1));
        Self {
            id: Uuid::new_v4(),
            frames,
        }
    }

    /// Unique id of this stream instance
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Receive every frame published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CameraFrame>> {
        self.frames.subscribe()
    }

    /// Push a frame to all subscribers, returning how many received it
    pub fn publish(&self, frame: Arc<CameraFrame>) -> usize {
        self.frames.send(frame).unwrap_or(0)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.frames.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgba_image_strips_padding() {
        // 2x2 image with 4 bytes of padding per row
        let mut data = Vec::new();
        data.extend_from_slice(&[1, 1, 1, 255, 2, 2, 2, 255, 0, 0, 0, 0]);
        data.extend_from_slice(&[3, 3, 3, 255, 4, 4, 4, 255, 0, 0, 0, 0]);
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data.into_boxed_slice()),
            stride: 12,
        };

        let image = frame.to_rgba_image().unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [2, 2, 2, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [3, 3, 3, 255]);
    }

    #[test]
    fn test_to_rgba_image_rejects_short_buffer() {
        let frame = CameraFrame::from_rgba(4, 4, vec![0; 10]);
        assert!(frame.to_rgba_image().is_none());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let stream = MediaStream::new(4);
        let frame = Arc::new(CameraFrame::from_rgba(1, 1, vec![0, 0, 0, 255]));
        assert_eq!(stream.publish(frame), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_frames() {
        let stream = MediaStream::new(4);
        let mut rx = stream.subscribe();
        stream.publish(Arc::new(CameraFrame::from_rgba(1, 1, vec![9, 9, 9, 255])));

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.data[0], 9);
        assert_eq!(stream.subscriber_count(), 1);
    }
}
