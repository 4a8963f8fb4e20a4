//! Helpers shared by the sensor backends.

use homesens_types::{SensorInfo, SensorReading};

use crate::error::{SensorError, SensorResult};
use crate::traits::SensorBackend;

/// The platform's default sensor backend.
///
/// FreeBSD exposes DHT sensors through the `dev.gpioths` sysctl tree; other
/// systems are read through the Linux IIO sysfs tree.
pub fn default_backend() -> Box<dyn SensorBackend> {
    #[cfg(target_os = "freebsd")]
    {
        Box::new(crate::gpioths::SysctlBackend::new())
    }
    #[cfg(not(target_os = "freebsd"))]
    {
        Box::new(crate::iio::IioBackend::default())
    }
}

/// Fail with [`SensorError::NotFound`] unless `index` is among `sensors`.
pub(crate) fn require_sensor(sensors: &[SensorInfo], index: u32) -> SensorResult<&SensorInfo> {
    sensors
        .iter()
        .find(|s| s.index == index)
        .ok_or_else(|| SensorError::NotFound {
            index,
            available: sensors.iter().map(|s| s.index).collect(),
        })
}

/// Assemble a reading from the two leaf results.
///
/// A single failed leaf is logged and left empty. If both fail, the
/// temperature error is returned.
pub(crate) fn assemble_reading(
    index: u32,
    temperature_leaf: &str,
    humidity_leaf: &str,
    temperature: SensorResult<f64>,
    humidity: SensorResult<f64>,
) -> SensorResult<SensorReading> {
    let mut reading = SensorReading::new(index, temperature_leaf, humidity_leaf);
    match (temperature, humidity) {
        (Err(t), Err(h)) => {
            tracing::warn!("{}", h);
            return Err(t);
        }
        (t, h) => {
            reading.temperature = t.map_err(|e| tracing::warn!("{}", e)).ok();
            reading.humidity = h.map_err(|e| tracing::warn!("{}", e)).ok();
        }
    }
    tracing::debug!(
        sensor = index,
        temperature = ?reading.temperature,
        humidity = ?reading.humidity,
        "sensor read"
    );
    Ok(reading)
}

/// Split a `dev.gpioths.<n>.<leaf>` OID into index and leaf.
///
/// ```
/// use homesens_core::sensor::parse_gpioths_oid;
///
/// assert_eq!(parse_gpioths_oid("dev.gpioths.0.%desc"), Some((0, "%desc")));
/// assert_eq!(parse_gpioths_oid("dev.gpioths.12.temperature"), Some((12, "temperature")));
/// assert_eq!(parse_gpioths_oid("dev.gpioths.%parent"), None);
/// ```
pub fn parse_gpioths_oid(name: &str) -> Option<(u32, &str)> {
    let rest = name.strip_prefix("dev.gpioths.")?;
    let (index, leaf) = rest.split_once('.')?;
    if leaf.is_empty() || leaf.contains(char::is_whitespace) {
        return None;
    }
    Some((index.parse().ok()?, leaf))
}
