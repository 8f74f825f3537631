//! Occupancy estimation seam.
//!
//! The original pipeline never measured occupancy from the frame; it drew a
//! random placeholder even in live mode. That placeholder survives here as
//! [`OccupancyEstimator::Simulated`], but the seam is injectable so a real
//! people detector can replace it without touching the sampling loop.
//!
//! The only contract an estimator must honor: return a non-negative integer
//! estimate of people present.

use crate::sampler::motion::MotionAnalysis;
use crate::source::Frame;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Placeholder draw range used by the original pipeline.
const SIMULATED_RANGE: std::ops::RangeInclusive<u32> = 5..=50;

/// A pluggable people-counting model for the `ModelBased` variant.
pub trait OccupancyModel: Send {
    /// Estimate how many people are present in the frame.
    fn estimate(&mut self, frame: &Frame) -> u32;
}

/// Strategy for estimating occupancy from a live frame.
pub enum OccupancyEstimator {
    /// Uniform random placeholder (the original behavior, and the default)
    Simulated(SimulatedOccupancy),
    /// Crude estimate from the frame-difference analysis
    HeuristicFrameDiff(ActivityHeuristic),
    /// A real detection model
    ModelBased(Box<dyn OccupancyModel>),
}

impl OccupancyEstimator {
    /// The default placeholder estimator.
    pub fn simulated() -> Self {
        OccupancyEstimator::Simulated(SimulatedOccupancy::new())
    }

    pub fn estimate(&mut self, frame: &Frame, motion: &MotionAnalysis) -> u32 {
        match self {
            OccupancyEstimator::Simulated(s) => s.draw(),
            OccupancyEstimator::HeuristicFrameDiff(h) => h.estimate(motion),
            OccupancyEstimator::ModelBased(model) => model.estimate(frame),
        }
    }
}

/// Uniform draw in [5, 50], independent of the frame.
pub struct SimulatedOccupancy {
    rng: StdRng,
}

impl SimulatedOccupancy {
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

    pub fn draw(&mut self) -> u32 {
        self.rng.gen_range(SIMULATED_RANGE)
    }
}

impl Default for SimulatedOccupancy {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimates occupancy from how much of the frame changed.
///
/// Assumes one person disturbs roughly `per_person_area` pixels at the
/// analysis resolution. Nothing moving reads as an empty room, which is
/// wrong for a seated crowd; this is a stopgap until a detector fills the
/// `ModelBased` slot.
pub struct ActivityHeuristic {
    per_person_area: u32,
}

impl ActivityHeuristic {
    pub fn new(per_person_area: u32) -> Self {
        Self {
            per_person_area: per_person_area.max(1),
        }
    }

    pub fn estimate(&self, motion: &MotionAnalysis) -> u32 {
        if motion.region_count == 0 {
            return 0;
        }
        let by_area = (motion.changed_pixels / u64::from(self.per_person_area)) as u32;
        by_area.max(motion.region_count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_simulated_draws_stay_in_range() {
        let mut sim = SimulatedOccupancy::with_seed(7);
        for _ in 0..1000 {
            let n = sim.draw();
            assert!((5..=50).contains(&n));
        }
    }

    #[test]
    fn test_heuristic_zero_motion_is_empty() {
        let heuristic = ActivityHeuristic::new(15_000);
        assert_eq!(heuristic.estimate(&MotionAnalysis::default()), 0);
    }

    #[test]
    fn test_heuristic_scales_with_changed_area() {
        let heuristic = ActivityHeuristic::new(10_000);
        let motion = MotionAnalysis {
            region_count: 2,
            changed_pixels: 45_000,
            total_pixels: 640 * 480,
        };
        // 45k changed pixels at 10k per person beats the two-blob floor.
        assert_eq!(heuristic.estimate(&motion), 4);
    }

    #[test]
    fn test_heuristic_floors_at_region_count() {
        let heuristic = ActivityHeuristic::new(100_000);
        let motion = MotionAnalysis {
            region_count: 3,
            changed_pixels: 5_000,
            total_pixels: 640 * 480,
        };
        assert_eq!(heuristic.estimate(&motion), 3);
    }

    #[test]
    fn test_model_based_variant_is_consulted() {
        struct FixedModel(u32);
        impl OccupancyModel for FixedModel {
            fn estimate(&mut self, _frame: &Frame) -> u32 {
                self.0
            }
        }

        let mut estimator = OccupancyEstimator::ModelBased(Box::new(FixedModel(12)));
        let frame = Frame::new(RgbImage::new(4, 4));
        assert_eq!(estimator.estimate(&frame, &MotionAnalysis::default()), 12);
    }
}
