//! Mock implementations for testing.
//!
//! This module provides a mock sensor tree and a mock HTTP transport so the
//! reader and the uRadMonitor client can be exercised without hardware or
//! network access.
//!
//! - [`MockSensors`] implements [`SensorBackend`] over a fixed set of sensor
//!   indices.
//! - [`MockTransport`] implements [`JsonTransport`] with a canned status and
//!   body, and records every request it receives.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use homesens_types::{SensorInfo, SensorReading};

use crate::error::{RadiationError, RadiationResult, SensorError, SensorResult};
use crate::sensor::{assemble_reading, require_sensor};
use crate::traits::{ApiRequest, JsonTransport, SensorBackend};
use crate::uradmon::decode_body;

#[derive(Debug, Clone)]
struct MockSensor {
    info: SensorInfo,
    temperature: Option<f64>,
    humidity: Option<f64>,
}

/// A mock sensor tree.
///
/// Whatever leafoids are requested, the temperature leaf returns the
/// configured temperature and the humidity leaf the configured humidity.
/// A `None` value makes that leaf fail.
///
/// # Example
///
/// ```
/// use homesens_core::{MockSensors, SensorBackend, SensorError};
///
/// let sensors = MockSensors::new()
///     .with_sensor(0, Some(21.5), Some(40.0))
///     .with_sensor(1, Some(19.0), None);
///
/// assert_eq!(sensors.list().unwrap().len(), 2);
/// assert!(matches!(
///     sensors.read(2, "temperature", "humidity"),
///     Err(SensorError::NotFound { .. })
/// ));
/// ```
#[derive(Debug, Default)]
pub struct MockSensors {
    sensors: Vec<MockSensor>,
    read_count: AtomicU32,
}

impl MockSensors {
    /// Create an empty sensor tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `gpioths` sensor at `index`.
    #[must_use]
    pub fn with_sensor(
        mut self,
        index: u32,
        temperature: Option<f64>,
        humidity: Option<f64>,
    ) -> Self {
        self.sensors.retain(|s| s.info.index != index);
        self.sensors.push(MockSensor {
            info: SensorInfo {
                index,
                driver: "gpioths".to_string(),
                description: "DHT11/DHT22 Temperature and Humidity Sensor".to_string(),
            },
            temperature,
            humidity,
        });
        self.sensors.sort_by_key(|s| s.info.index);
        self
    }

    /// Number of successful or failed `read` calls.
    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::Relaxed)
    }

    fn leaf(index: u32, leaf: &str, value: Option<f64>) -> SensorResult<f64> {
        value.ok_or_else(|| SensorError::Read {
            index,
            leaf: leaf.to_string(),
            reason: "Input/output error".to_string(),
        })
    }
}

impl SensorBackend for MockSensors {
    fn list(&self) -> SensorResult<Vec<SensorInfo>> {
        if self.sensors.is_empty() {
            return Err(SensorError::NoSensors);
        }
        Ok(self.sensors.iter().map(|s| s.info.clone()).collect())
    }

    fn read(
        &self,
        index: u32,
        temperature_leaf: &str,
        humidity_leaf: &str,
    ) -> SensorResult<SensorReading> {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        let infos = self.list()?;
        require_sensor(&infos, index)?;
        let sensor = self
            .sensors
            .iter()
            .find(|s| s.info.index == index)
            .ok_or(SensorError::NoSensors)?;

        assemble_reading(
            index,
            temperature_leaf,
            humidity_leaf,
            Self::leaf(index, temperature_leaf, sensor.temperature),
            Self::leaf(index, humidity_leaf, sensor.humidity),
        )
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Body { status: u16, body: String },
    Unreachable,
}

/// A mock HTTP transport.
///
/// Responses go through the same status/body decoding as the real transport.
#[derive(Debug)]
pub struct MockTransport {
    response: MockResponse,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Respond with HTTP 200 and `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    /// Respond with `status` and `body`.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self::from_response(MockResponse::Body {
            status,
            body: body.into(),
        })
    }

    /// Fail every request as if the connection was refused.
    pub fn unreachable() -> Self {
        Self::from_response(MockResponse::Unreachable)
    }

    fn from_response(response: MockResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    /// Copies of the requests received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl JsonTransport for MockTransport {
    async fn get_json(&self, request: &ApiRequest) -> RadiationResult<Value> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.response {
            MockResponse::Body { status, body } => decode_body(*status, body),
            MockResponse::Unreachable => Err(RadiationError::Network {
                url: request.url.clone(),
                source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
            }),
        }
    }
}
