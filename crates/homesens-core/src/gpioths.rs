//! FreeBSD `gpioths(4)` sensor backend.
//!
//! Each DHT sensor attached through `gpioths` appears under
//! `dev.gpioths.<n>`:
//!
//! ```text
//! dev.gpioths.0.%desc: DHT11/DHT22 Temperature and Humidity Sensor
//! dev.gpioths.0.%driver: gpioths
//! dev.gpioths.0.temperature: 21.5C
//! dev.gpioths.0.humidity: 40
//! ```
//!
//! The kernel stores temperature in decikelvin. Integer values read from the
//! temperature leaf are converted to Celsius.

use std::collections::BTreeMap;

use sysctl::{Ctl, CtlIter, CtlValue, Sysctl};

use homesens_types::{SensorInfo, SensorReading, decikelvin_to_celsius, parse_decimal};

use crate::error::{SensorError, SensorResult};
use crate::sensor::{assemble_reading, parse_gpioths_oid, require_sensor};
use crate::traits::SensorBackend;

const GPIOTHS_ROOT: &str = "dev.gpioths";

/// Sensor backend reading the `dev.gpioths` sysctl tree.
#[derive(Debug, Clone, Default)]
pub struct SysctlBackend;

impl SysctlBackend {
    pub fn new() -> Self {
        Self
    }

    fn read_leaf(&self, index: u32, leaf: &str, is_temperature: bool) -> SensorResult<f64> {
        let name = format!("{GPIOTHS_ROOT}.{index}.{leaf}");
        let read_error = |reason: String| SensorError::Read {
            index,
            leaf: leaf.to_string(),
            reason,
        };

        let value = Ctl::new(&name)
            .and_then(|ctl| ctl.value())
            .map_err(|e| read_error(format!("{name}: {e}")))?;

        let raw = match value {
            CtlValue::Temperature(t) => return Ok(f64::from(t.celsius())),
            CtlValue::Int(v) | CtlValue::S32(v) => i64::from(v),
            CtlValue::Uint(v) | CtlValue::U32(v) => i64::from(v),
            CtlValue::Long(v) | CtlValue::S64(v) => v,
            CtlValue::String(s) => {
                return parse_decimal(&s).map_err(|source| SensorError::InvalidValue {
                    index,
                    leaf: leaf.to_string(),
                    source,
                });
            }
            other => return Err(read_error(format!("unsupported value type {:?}", other))),
        };

        if is_temperature {
            Ok(decikelvin_to_celsius(raw))
        } else {
            Ok(raw as f64)
        }
    }
}

impl SensorBackend for SysctlBackend {
    fn list(&self) -> SensorResult<Vec<SensorInfo>> {
        let root = Ctl::new(GPIOTHS_ROOT).map_err(|e| {
            tracing::debug!("{GPIOTHS_ROOT}: {e}");
            SensorError::NoSensors
        })?;

        let mut sensors: BTreeMap<u32, SensorInfo> = BTreeMap::new();
        for ctl in CtlIter::below(root) {
            let ctl = ctl?;
            let name = ctl.name()?;
            let Some((index, leaf)) = parse_gpioths_oid(&name) else {
                continue;
            };
            let info = sensors.entry(index).or_insert_with(|| SensorInfo {
                index,
                driver: String::new(),
                description: String::new(),
            });
            match leaf {
                "%driver" => info.driver = ctl.value_string()?,
                "%desc" => info.description = ctl.value_string()?,
                _ => {}
            }
        }

        if sensors.is_empty() {
            return Err(SensorError::NoSensors);
        }
        Ok(sensors.into_values().collect())
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
            self.read_leaf(index, temperature_leaf, true),
            self.read_leaf(index, humidity_leaf, false),
        )
    }
}
