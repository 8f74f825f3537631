//! In-memory frame source replaying a fixed script of frames.
//!
//! Used by the unit and integration tests to drive the live sampling path
//! without a camera attached.

use crate::source::{CaptureError, Frame, FrameSource};
use std::collections::VecDeque;

/// Replays a pre-built sequence of frames, then fails like a dead camera.
pub struct ScriptedSource {
    frames: VecDeque<Frame>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Number of frames left in the script.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        self.frames.pop_front().ok_or(CaptureError::EmptyFrame)
    }
}
