//! Configuration for the Overwatch sensor agent.
//!
//! Everything is derived from the process environment once at startup and is
//! immutable for the lifetime of the process. There is no config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API endpoint for live updates.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api/live/update";

/// Default location identifier (placeholder, matches the seeded backend).
pub const DEFAULT_LOCATION_ID: &str = "656565656565656565656565";

/// Default interval between ticks, in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Main configuration for the sensor agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint the live updates are posted to
    pub api_url: String,

    /// Location this sensor reports for
    pub location_id: String,

    /// Optional sensor API key, sent as the `x-api-key` header when present
    pub sensor_api_key: Option<String>,

    /// Camera device index (live mode only)
    pub camera_index: i32,

    /// Whether readings are simulated instead of derived from a camera
    pub simulation_mode: bool,

    /// Fixed delay between ticks (no drift correction)
    #[serde(with = "duration_serde")]
    pub interval: Duration,

    /// Whether the live feed window is shown (live mode only)
    pub display: bool,

    /// Tunables for the frame-difference movement heuristic
    pub motion: MotionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            location_id: DEFAULT_LOCATION_ID.to_string(),
            sensor_api_key: None,
            camera_index: 0,
            simulation_mode: true,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            display: true,
            motion: MotionConfig::default(),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Tests feed a map here instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("API_URL") {
            config.api_url = url;
        }
        if let Some(id) = lookup("LOCATION_ID") {
            config.location_id = id;
        }
        config.sensor_api_key = lookup("SENSOR_API_KEY").filter(|k| !k.is_empty());

        if let Some(raw) = lookup("CAMERA_INDEX") {
            config.camera_index = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("CAMERA_INDEX '{raw}': {e}")))?;
        }

        // Only the literal "true" (case-insensitive) enables simulation.
        if let Some(raw) = lookup("DUMMY_MODE") {
            config.simulation_mode = parse_flag(&raw);
        }

        if let Some(raw) = lookup("UPDATE_INTERVAL_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("UPDATE_INTERVAL_SECS '{raw}': {e}")))?;
            config.interval = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("MOTION_MIN_AREA") {
            config.motion.min_region_area = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("MOTION_MIN_AREA '{raw}': {e}")))?;
        }

        Ok(config)
    }
}

/// Parse an environment flag the way the original pipeline did: only the
/// literal "true" after lowercasing counts as true.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().to_lowercase() == "true"
}

/// Tunables for the movement heuristic.
///
/// The original pipeline hard-coded these; they are sensitive to resolution
/// and lighting, so they live in configuration instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Frames are resized to this width before analysis
    pub frame_width: u32,
    /// Frames are resized to this height before analysis
    pub frame_height: u32,
    /// Minimum grayscale difference to count a pixel as changed
    pub diff_threshold: u8,
    /// Gaussian blur sigma applied to the difference image
    pub blur_sigma: f32,
    /// Number of 3x3 binary dilation passes merging nearby regions
    pub dilate_iterations: u32,
    /// Minimum pixel area for a changed region to count as a moving blob
    pub min_region_area: u32,
    /// Rough changed-pixel footprint of one person at 640x480, used by the
    /// frame-diff occupancy heuristic
    pub per_person_area: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            diff_threshold: 20,
            blur_sigma: 1.0,
            dilate_iterations: 3,
            min_region_area: 900,
            per_person_area: 15_000,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
