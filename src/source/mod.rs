//! Frame acquisition for the sensor agent.
//!
//! The loop only ever sees the [`FrameSource`] trait. The real camera backend
//! (OpenCV) lives behind the `live` feature; [`scripted::ScriptedSource`]
//! replays in-memory frames and is what the tests drive.

pub mod scripted;

#[cfg(feature = "live")]
pub mod camera;

#[cfg(feature = "live")]
pub use camera::CameraSource;
pub use scripted::ScriptedSource;

use chrono::{DateTime, Utc};
use image::{imageops, RgbImage};

/// A single captured video frame.
///
/// Only the two most recent frames are ever alive: the loop owns the previous
/// one and hands it to the sampler together with the freshly captured one.
#[derive(Debug, Clone)]
pub struct Frame {
    /// When the frame was captured
    pub captured_at: DateTime<Utc>,
    /// RGB pixel data
    pub pixels: RgbImage,
}

impl Frame {
    /// Wrap a pixel buffer captured right now.
    pub fn new(pixels: RgbImage) -> Self {
        Self {
            captured_at: Utc::now(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Return this frame resized to the given resolution.
    ///
    /// Returns the frame unchanged when the resolution already matches.
    pub fn resized(self, width: u32, height: u32) -> Frame {
        if self.width() == width && self.height() == height {
            return self;
        }
        Frame {
            captured_at: self.captured_at,
            pixels: imageops::resize(&self.pixels, width, height, imageops::FilterType::Triangle),
        }
    }
}

/// A source of video frames.
pub trait FrameSource {
    /// Capture the next frame. Errors are fatal to the sampling loop, except
    /// [`CaptureError::WindowClosed`] which ends the run cleanly.
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Release the underlying device. Called once on shutdown.
    fn close(&mut self) {}
}

/// Errors raised while acquiring frames.
#[derive(Debug)]
pub enum CaptureError {
    /// The device could not be opened
    Open(String),
    /// A frame could not be read from the device
    Read(String),
    /// The device returned an empty frame
    EmptyFrame,
    /// The operator closed the feed window ('q')
    WindowClosed,
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Open(e) => write!(f, "Failed to open camera: {e}"),
            CaptureError::Read(e) => write!(f, "Failed to read frame: {e}"),
            CaptureError::EmptyFrame => write!(f, "Camera returned an empty frame"),
            CaptureError::WindowClosed => write!(f, "Feed window closed by operator"),
        }
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_resize() {
        let frame = Frame::new(RgbImage::new(320, 240));
        let resized = frame.resized(640, 480);
        assert_eq!(resized.width(), 640);
        assert_eq!(resized.height(), 480);
    }

    #[test]
    fn test_resize_noop_keeps_timestamp() {
        let frame = Frame::new(RgbImage::new(640, 480));
        let captured_at = frame.captured_at;
        let resized = frame.resized(640, 480);
        assert_eq!(resized.captured_at, captured_at);
    }
}
