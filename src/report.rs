//! Reporter posting live updates to the Overwatch backend.
//!
//! One JSON POST per tick, no retry and no buffering. Any HTTP response,
//! 2xx or not, counts as a delivered update and is surfaced as its status
//! code; only transport failures (DNS, refused connection, timeout) are
//! errors, and the loop treats those as recoverable.

use crate::config::Config;
use crate::sampler::Reading;
use serde::Serialize;

/// Wire payload for `POST /api/live/update`.
///
/// The backend expects exactly these four camelCase keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveUpdate {
    pub location_id: String,
    pub busyness_score: u32,
    pub occupancy: u32,
    pub movement_score: u32,
}

impl LiveUpdate {
    pub fn new(location_id: &str, reading: &Reading) -> Self {
        Self {
            location_id: location_id.to_string(),
            busyness_score: reading.busyness_score,
            occupancy: reading.occupancy,
            movement_score: reading.movement_score,
        }
    }
}

/// Transport-level reporting errors.
#[derive(Debug)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    Client(String),
    /// The request never produced an HTTP response
    Network(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Client(msg) => write!(f, "Reporter client error: {msg}"),
            TransportError::Network(msg) => write!(f, "Reporter network error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Async reporter for the live update endpoint.
pub struct Reporter {
    client: reqwest::Client,
    api_url: String,
    location_id: String,
    sensor_api_key: Option<String>,
}

impl Reporter {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            location_id: config.location_id.clone(),
            sensor_api_key: config.sensor_api_key.clone(),
        })
    }

    /// Post one reading. Returns the HTTP status code of whatever response
    /// came back; the caller decides what to log.
    pub async fn report(&self, reading: &Reading) -> Result<u16, TransportError> {
        let payload = LiveUpdate::new(&self.location_id, reading);
        log::debug!("posting live update for {} to {}", self.location_id, self.api_url);

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.sensor_api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(response.status().as_u16())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Blocking reporter for the synchronous sampling loop.
pub struct BlockingReporter {
    inner: Reporter,
    runtime: tokio::runtime::Runtime,
}

impl BlockingReporter {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Client(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: Reporter::new(config)?,
            runtime,
        })
    }

    /// Post one reading, blocking until the exchange finishes or fails.
    pub fn report(&self, reading: &Reading) -> Result<u16, TransportError> {
        self.runtime.block_on(self.inner.report(reading))
    }

    pub fn api_url(&self) -> &str {
        self.inner.api_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> Reading {
        Reading {
            busyness_score: 60,
            occupancy: 10,
            movement_score: 8,
        }
    }

    #[test]
    fn test_payload_has_exactly_four_camel_case_keys() {
        let payload = LiveUpdate::new("abc123", &reading());
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(object["locationId"], "abc123");
        assert_eq!(object["busynessScore"], 60);
        assert_eq!(object["occupancy"], 10);
        assert_eq!(object["movementScore"], 8);
    }

    #[test]
    fn test_payload_shape_is_independent_of_reading_source() {
        // Simulated and live readings are the same type; the wire shape can
        // never differ between modes.
        let simulated = crate::sampler::SimulatedSampler::with_seed(3).sample();
        let value = serde_json::to_value(LiveUpdate::new("loc", &simulated)).unwrap();
        let keys: std::collections::BTreeSet<String> =
            value.as_object().unwrap().keys().cloned().collect();
        let expected: std::collections::BTreeSet<String> =
            ["locationId", "busynessScore", "movementScore", "occupancy"]
                .iter()
                .map(|k| k.to_string())
                .collect();
        assert_eq!(keys, expected);
    }
}
