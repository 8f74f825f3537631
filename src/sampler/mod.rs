//! Per-tick sampling of room-activity signals.
//!
//! Each tick produces a [`Reading`] — busyness, occupancy and movement — from
//! either random draws (simulation mode) or a frame-difference heuristic on a
//! live camera frame. The sampler hands the captured frame back so the next
//! tick can diff against it; no other state survives a tick.

pub mod motion;
pub mod occupancy;

pub use motion::{MotionAnalysis, MotionDetector};
pub use occupancy::{ActivityHeuristic, OccupancyEstimator, OccupancyModel, SimulatedOccupancy};

use crate::config::MotionConfig;
use crate::source::{CaptureError, Frame, FrameSource};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One tick's worth of room-activity signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Derived 0-100 activity metric
    pub busyness_score: u32,
    /// Estimated people present
    pub occupancy: u32,
    /// Count of distinct moving blobs since the previous tick
    pub movement_score: u32,
}

/// Saturating busyness derivation favoring movement over raw occupancy.
pub fn busyness_score(occupancy: u32, movement: u32) -> u32 {
    (occupancy * 2 + movement * 5).min(100)
}

/// Produces one [`Reading`] per tick from the configured source.
pub enum Sampler {
    Simulated(SimulatedSampler),
    Live(LiveSampler),
}

impl Sampler {
    /// Sample once. The previous frame (live mode only) feeds the movement
    /// heuristic; the returned frame becomes the next tick's previous frame.
    pub fn sample(
        &mut self,
        previous: Option<Frame>,
    ) -> Result<(Reading, Option<Frame>), CaptureError> {
        match self {
            Sampler::Simulated(s) => Ok((s.sample(), None)),
            Sampler::Live(l) => l
                .sample(previous.as_ref())
                .map(|(reading, frame)| (reading, Some(frame))),
        }
    }

    /// Release the underlying frame source, if any.
    pub fn close(&mut self) {
        if let Sampler::Live(l) = self {
            l.source.close();
        }
    }
}

/// Draws all three signals independently and uniformly from fixed ranges.
pub struct SimulatedSampler {
    rng: StdRng,
}

impl SimulatedSampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self) -> Reading {
        Reading {
            busyness_score: self.rng.gen_range(0..=100),
            occupancy: self.rng.gen_range(0..=50),
            movement_score: self.rng.gen_range(0..=20),
        }
    }
}

impl Default for SimulatedSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives readings from live frames: capture, resize, diff, estimate.
pub struct LiveSampler {
    source: Box<dyn FrameSource>,
    detector: MotionDetector,
    occupancy: OccupancyEstimator,
    frame_width: u32,
    frame_height: u32,
}

impl LiveSampler {
    pub fn new(
        source: Box<dyn FrameSource>,
        motion: MotionConfig,
        occupancy: OccupancyEstimator,
    ) -> Self {
        let frame_width = motion.frame_width;
        let frame_height = motion.frame_height;
        Self {
            source,
            detector: MotionDetector::new(motion),
            occupancy,
            frame_width,
            frame_height,
        }
    }

    pub fn sample(&mut self, previous: Option<&Frame>) -> Result<(Reading, Frame), CaptureError> {
        let frame = self
            .source
            .next_frame()?
            .resized(self.frame_width, self.frame_height);

        // First tick has nothing to diff against; movement is 0 by contract.
        let analysis = match previous {
            Some(prev) => self.detector.analyze(prev, &frame),
            None => MotionAnalysis::default(),
        };

        let movement = analysis.region_count as u32;
        let occupancy = self.occupancy.estimate(&frame, &analysis);

        let reading = Reading {
            busyness_score: busyness_score(occupancy, movement),
            occupancy,
            movement_score: movement,
        };
        Ok((reading, frame))
    }
}
