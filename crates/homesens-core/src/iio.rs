//! Linux IIO sysfs sensor backend.
//!
//! The `dht11` kernel driver (which also handles DHT22/AM2302) registers an
//! IIO device per sensor:
//!
//! ```text
//! /sys/bus/iio/devices/iio:device0/name                        dht11
//! /sys/bus/iio/devices/iio:device0/in_temp_input               21500
//! /sys/bus/iio/devices/iio:device0/in_humidityrelative_input   40000
//! ```
//!
//! Values are in milli-degrees Celsius and milli-percent. The device number
//! is the sensor index.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use homesens_types::{SensorInfo, SensorReading, from_milli, parse_decimal};

use crate::error::{SensorError, SensorResult};
use crate::sensor::{assemble_reading, require_sensor};
use crate::traits::SensorBackend;

/// Default location of the IIO device tree.
pub const DEFAULT_IIO_ROOT: &str = "/sys/bus/iio/devices";

const DEVICE_PREFIX: &str = "iio:device";
const TEMPERATURE_ATTR: &str = "in_temp_input";
const HUMIDITY_ATTR: &str = "in_humidityrelative_input";

/// Sensor backend reading the IIO sysfs tree.
#[derive(Debug, Clone)]
pub struct IioBackend {
    root: PathBuf,
}

impl Default for IioBackend {
    fn default() -> Self {
        Self::new(DEFAULT_IIO_ROOT)
    }
}

impl IioBackend {
    /// Create a backend rooted at `root` instead of [`DEFAULT_IIO_ROOT`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding the `iio:deviceN` entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn device_dir(&self, index: u32) -> PathBuf {
        self.root.join(format!("{DEVICE_PREFIX}{index}"))
    }

    /// Map a leafoid to its sysfs attribute.
    ///
    /// `temperature` and `humidity` map to the standard IIO channels; any
    /// other leafoid names the attribute file directly.
    fn attribute_for(leaf: &str) -> &str {
        match leaf {
            "temperature" => TEMPERATURE_ATTR,
            "humidity" => HUMIDITY_ATTR,
            other => other,
        }
    }

    fn read_leaf(&self, index: u32, leaf: &str) -> SensorResult<f64> {
        let path = self.device_dir(index).join(Self::attribute_for(leaf));
        let read_error = |reason: String| SensorError::Read {
            index,
            leaf: leaf.to_string(),
            reason,
        };
        let raw = fs::read_to_string(&path)
            .map_err(|e| read_error(format!("{}: {}", path.display(), e)))?;
        let value = parse_decimal(&raw).map_err(|source| SensorError::InvalidValue {
            index,
            leaf: leaf.to_string(),
            source,
        })?;
        Ok(from_milli(value))
    }

    fn describe(dir: &Path, index: u32) -> String {
        // Device-tree overlays record the compatible string, e.g. "dht11\0".
        fs::read(dir.join("of_node").join("compatible"))
            .ok()
            .and_then(|raw| {
                raw.split(|b| *b == 0)
                    .find(|s| !s.is_empty())
                    .map(|s| String::from_utf8_lossy(s).into_owned())
            })
            .unwrap_or_else(|| format!("IIO device {index}"))
    }
}

impl SensorBackend for IioBackend {
    fn list(&self) -> SensorResult<Vec<SensorInfo>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("IIO root {} does not exist", self.root.display());
                return Err(SensorError::NoSensors);
            }
            Err(e) => return Err(e.into()),
        };

        let mut sensors = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(index) = file_name
                .to_str()
                .and_then(|n| n.strip_prefix(DEVICE_PREFIX))
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };

            let dir = entry.path();
            if !dir.join(TEMPERATURE_ATTR).exists() && !dir.join(HUMIDITY_ATTR).exists() {
                tracing::debug!("Skipping {}: no temperature/humidity channel", dir.display());
                continue;
            }

            let driver = fs::read_to_string(dir.join("name"))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| "unknown".to_string());

            sensors.push(SensorInfo {
                index,
                driver,
                description: Self::describe(&dir, index),
            });
        }

        if sensors.is_empty() {
            return Err(SensorError::NoSensors);
        }
        sensors.sort_by_key(|s| s.index);
        Ok(sensors)
    }

    fn read(
        &self,
        index: u32,
        temperature_leaf: &str,
        humidity_leaf: &str,
    ) -> SensorResult<SensorReading> {
        let sensors = self.list()?;
        require_sensor(&sensors, index)?;

        assemble_reading(
            index,
            temperature_leaf,
            humidity_leaf,
            self.read_leaf(index, temperature_leaf),
            self.read_leaf(index, humidity_leaf),
        )
    }
}
