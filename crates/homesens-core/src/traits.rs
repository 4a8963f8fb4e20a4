//! Trait abstractions for the two external capabilities homesens uses.
//!
//! [`SensorBackend`] abstracts over the host's sensor tree (IIO sysfs,
//! `gpioths(4)` sysctl) and [`JsonTransport`] abstracts over the HTTP client.
//! Both have mock implementations in [`crate::mock`] for testing.

use async_trait::async_trait;

use homesens_types::{SensorInfo, SensorReading};

use crate::error::{RadiationResult, SensorResult};

/// Access to local temperature/humidity sensors.
///
/// # Example
///
/// ```
/// use homesens_core::{MockSensors, SensorBackend};
///
/// let sensors = MockSensors::new().with_sensor(0, Some(21.5), Some(40.0));
/// let reading = sensors.read(0, "temperature", "humidity").unwrap();
/// assert_eq!(reading.temperature, Some(21.5));
/// ```
pub trait SensorBackend {
    /// Enumerate the sensors present on the host, ordered by index.
    ///
    /// Returns [`crate::SensorError::NoSensors`] when nothing is found.
    fn list(&self) -> SensorResult<Vec<SensorInfo>>;

    /// Read temperature and humidity from sensor `index`.
    ///
    /// The leafoids name the nodes the values are read from; they also become
    /// the labels of the returned reading.
    fn read(
        &self,
        index: u32,
        temperature_leaf: &str,
        humidity_leaf: &str,
    ) -> SensorResult<SensorReading>;
}

impl<B: SensorBackend + ?Sized> SensorBackend for Box<B> {
    fn list(&self) -> SensorResult<Vec<SensorInfo>> {
        (**self).list()
    }

    fn read(
        &self,
        index: u32,
        temperature_leaf: &str,
        humidity_leaf: &str,
    ) -> SensorResult<SensorReading> {
        (**self).read(index, temperature_leaf, humidity_leaf)
    }
}

/// A single HTTP GET expecting a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Absolute URL.
    pub url: String,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Value of query parameter `key`, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP GET returning parsed JSON.
///
/// Implementations map transport failures to
/// [`crate::RadiationError::Network`] and non-2xx statuses to
/// [`crate::RadiationError::Api`].
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Perform the request once and return the decoded body.
    async fn get_json(&self, request: &ApiRequest) -> RadiationResult<serde_json::Value>;
}

#[async_trait]
impl<T: JsonTransport + ?Sized> JsonTransport for &T {
    async fn get_json(&self, request: &ApiRequest) -> RadiationResult<serde_json::Value> {
        (**self).get_json(request).await
    }
}
