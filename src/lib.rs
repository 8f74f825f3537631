//! Overwatch Sensor - room-activity agent for the Overwatch live busyness API.
//!
//! Once per tick the agent produces a (busyness, occupancy, movement) reading
//! and posts it, together with the configured location id, to the backend's
//! live update endpoint. Readings come from uniform random draws (simulation
//! mode, the default) or from a frame-difference heuristic over consecutive
//! camera frames (live mode, behind the `live` feature).
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Overwatch Sensor                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐      │
//! │  │ FrameSource │──▶│   Sampler   │──▶│  Reporter   │      │
//! │  │ (camera or  │   │ (motion +   │   │ (HTTP POST  │      │
//! │  │  simulated) │   │  occupancy) │   │  per tick)  │      │
//! │  └─────────────┘   └─────────────┘   └─────────────┘      │
//! │         ▲                 │                                │
//! │         └── previous frame┘   (only cross-tick state)      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no buffering, queue or backpressure: each tick samples, reports,
//! then sleeps a fixed interval. A failed report is logged and the next tick
//! runs anyway; a failed capture ends the run.
//!
//! # Example
//!
//! ```no_run
//! use overwatch_sensor::{config::Config, sampler::{Sampler, SimulatedSampler}};
//!
//! let config = Config::from_env().expect("invalid environment");
//! let mut sampler = Sampler::Simulated(SimulatedSampler::new());
//! let (reading, _) = sampler.sample(None).expect("simulated sampling is infallible");
//! println!("busyness={} at {}", reading.busyness_score, config.location_id);
//! ```

pub mod config;
pub mod report;
pub mod sampler;
pub mod source;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, MotionConfig};
pub use report::{BlockingReporter, LiveUpdate, Reporter, TransportError};
pub use sampler::{
    busyness_score, LiveSampler, OccupancyEstimator, Reading, Sampler, SimulatedSampler,
};
pub use source::{CaptureError, Frame, FrameSource, ScriptedSource};

#[cfg(feature = "live")]
pub use source::CameraSource;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
