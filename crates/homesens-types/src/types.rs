//! Core types for homesens readings.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Leafoid read for temperature unless overridden.
pub const DEFAULT_TEMPERATURE_LEAF: &str = "temperature";

/// Leafoid read for humidity unless overridden.
pub const DEFAULT_HUMIDITY_LEAF: &str = "humidity";

/// Unit of the dose rate reported by uRadMonitor devices.
pub const DOSE_RATE_UNIT: &str = "µSv/h";

/// Offset between decikelvin and deci-degrees Celsius (273.1 K).
const DECIKELVIN_OFFSET: i64 = 2731;

/// A temperature/humidity sensor found on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorInfo {
    /// Sensor index, as passed to `--sensor`.
    pub index: u32,
    /// Kernel driver name (e.g. `gpioths`, `dht11`).
    pub driver: String,
    /// Human-readable description.
    pub description: String,
}

/// One reading from a local temperature/humidity sensor.
///
/// Either value may be missing when its leaf could not be read. A reading
/// with both values missing is never produced; backends report an error
/// instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Sensor index the values came from.
    pub sensor: u32,
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Leafoid the temperature was read from, used as its label.
    pub temperature_label: String,
    /// Leafoid the humidity was read from, used as its label.
    pub humidity_label: String,
}

impl SensorReading {
    /// Create a reading labeled with the given leafoids.
    pub fn new(
        sensor: u32,
        temperature_label: impl Into<String>,
        humidity_label: impl Into<String>,
    ) -> Self {
        Self {
            sensor,
            temperature: None,
            humidity: None,
            temperature_label: temperature_label.into(),
            humidity_label: humidity_label.into(),
        }
    }

    /// Set the temperature value.
    #[must_use]
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    /// Set the humidity value.
    #[must_use]
    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity = Some(percent);
        self
    }

    /// True when neither value could be read.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none()
    }
}

/// Radiation data for one uRadMonitor device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RadiationReading {
    /// uRadMonitor device id.
    pub device_id: String,
    /// Dose rate.
    pub value: f64,
    /// Unit of `value`.
    pub unit: String,
    /// Average Geiger counts per minute.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub cpm: Option<f64>,
    /// Average Geiger tube voltage in volts.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub voltage: Option<f64>,
    /// Average high-voltage inverter duty cycle in percent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub duty: Option<f64>,
    /// Whether the device reported itself online.
    pub online: bool,
}

impl RadiationReading {
    /// Create a reading from a dose rate in µSv/h.
    pub fn new(device_id: impl Into<String>, value: f64) -> Self {
        Self {
            device_id: device_id.into(),
            value,
            unit: DOSE_RATE_UNIT.to_string(),
            cpm: None,
            voltage: None,
            duty: None,
            online: true,
        }
    }

    /// Create a reading from counts per minute and the tube conversion factor.
    pub fn from_cpm(device_id: impl Into<String>, cpm: f64, factor: f64) -> Self {
        let mut reading = Self::new(device_id, dose_rate(cpm, factor));
        reading.cpm = Some(cpm);
        reading
    }
}

impl fmt::Display for RadiationReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Convert a `gpioths(4)` temperature in decikelvin to degrees Celsius.
///
/// ```
/// use homesens_types::decikelvin_to_celsius;
///
/// assert!((decikelvin_to_celsius(2946) - 21.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn decikelvin_to_celsius(dk: i64) -> f64 {
    (dk - DECIKELVIN_OFFSET) as f64 / 10.0
}

/// Convert an IIO milli-unit value (m°C, m%RH) to whole units.
#[must_use]
pub fn from_milli(value: f64) -> f64 {
    value / 1000.0
}

/// Dose rate in µSv/h from counts per minute and the tube factor.
#[must_use]
pub fn dose_rate(cpm: f64, factor: f64) -> f64 {
    cpm * factor
}

/// Parse a decimal number as found in sysfs attributes and API payloads.
///
/// Surrounding whitespace (including the trailing newline sysfs emits) is
/// ignored. Non-finite values are rejected.
pub fn parse_decimal(raw: &str) -> ParseResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber(trimmed.to_string())),
    }
}
