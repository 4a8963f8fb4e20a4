//! Platform-agnostic types for homesens.
//!
//! This crate provides the data shared by the sensor backends, the
//! uRadMonitor client and the CLI presenter.
//!
//! # Example
//!
//! ```
//! use homesens_types::{RadiationReading, SensorReading};
//!
//! let reading = SensorReading::new(0, "temperature", "humidity")
//!     .with_temperature(21.5)
//!     .with_humidity(40.0);
//! assert!(!reading.is_empty());
//!
//! let rad = RadiationReading::from_cpm("82000001", 20.0, 0.0057);
//! assert_eq!(rad.to_string(), "0.11 µSv/h");
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    DEFAULT_HUMIDITY_LEAF, DEFAULT_TEMPERATURE_LEAF, DOSE_RATE_UNIT, RadiationReading,
    SensorInfo, SensorReading, decikelvin_to_celsius, dose_rate, from_milli, parse_decimal,
};
