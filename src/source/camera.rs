//! OpenCV-backed camera source (feature `live`).
//!
//! Opens the device at the configured index, optionally shows the feed in a
//! local window for debugging, and releases the device on shutdown.

use crate::source::{CaptureError, Frame, FrameSource};
use image::RgbImage;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};

/// Window title for the debug feed.
pub const FEED_WINDOW: &str = "Overwatch Sensor Feed";

/// A live camera behind OpenCV's VideoCapture.
pub struct CameraSource {
    capture: videoio::VideoCapture,
    display: bool,
}

impl CameraSource {
    /// Open the camera at the given device index.
    pub fn open(index: i32, display: bool) -> Result<Self, CaptureError> {
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| CaptureError::Open(e.to_string()))?;

        let opened = videoio::VideoCapture::is_opened(&capture)
            .map_err(|e| CaptureError::Open(e.to_string()))?;
        if !opened {
            return Err(CaptureError::Open(format!(
                "no camera at device index {index}"
            )));
        }

        if display {
            highgui::named_window(FEED_WINDOW, highgui::WINDOW_AUTOSIZE)
                .map_err(|e| CaptureError::Open(e.to_string()))?;
        }

        Ok(Self { capture, display })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let mut mat = Mat::default();
        let grabbed = self
            .capture
            .read(&mut mat)
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        if !grabbed || mat.empty() {
            return Err(CaptureError::EmptyFrame);
        }

        if self.display {
            highgui::imshow(FEED_WINDOW, &mat).map_err(|e| CaptureError::Read(e.to_string()))?;
            let key = highgui::wait_key(1).map_err(|e| CaptureError::Read(e.to_string()))?;
            if key == i32::from(b'q') {
                return Err(CaptureError::WindowClosed);
            }
        }

        mat_to_frame(&mat)
    }

    fn close(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("failed to release camera: {e}");
        }
        if self.display {
            let _ = highgui::destroy_all_windows();
        }
    }
}

/// Convert a BGR OpenCV matrix into an owned RGB frame.
fn mat_to_frame(mat: &Mat) -> Result<Frame, CaptureError> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
        .map_err(|e| CaptureError::Read(e.to_string()))?;

    let size = rgb.size().map_err(|e| CaptureError::Read(e.to_string()))?;
    let bytes = rgb
        .data_bytes()
        .map_err(|e| CaptureError::Read(e.to_string()))?;

    let pixels = RgbImage::from_raw(size.width as u32, size.height as u32, bytes.to_vec())
        .ok_or_else(|| CaptureError::Read("frame buffer size mismatch".to_string()))?;

    Ok(Frame::new(pixels))
}
