//! Sensor access and uRadMonitor client for homesens.
//!
//! This crate reads DHT-class temperature/humidity sensors through the host
//! kernel and fetches radiation data from the uRadMonitor API.
//!
//! # Sensor backends
//!
//! | Backend | Platform | Source |
//! |---------|----------|--------|
//! | [`IioBackend`] | Linux | `/sys/bus/iio/devices/iio:deviceN` (`dht11` driver) |
//! | `SysctlBackend` | FreeBSD | `dev.gpioths.N` sysctl tree (`gpioths(4)`) |
//! | [`MockSensors`] | any | in-memory, for tests |
//!
//! [`default_backend`] picks the one matching the build target.
//!
//! # Quick Start
//!
//! ```no_run
//! use homesens_core::{SensorBackend, UradmonClient, UradmonCredentials, default_backend};
//! use homesens_core::uradmon::DEFAULT_API_URL;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sensors = default_backend();
//!     let reading = sensors.read(0, "temperature", "humidity")?;
//!     println!("{:?}", reading);
//!
//!     let credentials = UradmonCredentials::new("82000001", "1234", "0123abcd");
//!     let client = UradmonClient::new(credentials, DEFAULT_API_URL)?;
//!     println!("{}", client.fetch().await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod iio;
pub mod mock;
pub mod sensor;
pub mod traits;
pub mod uradmon;
pub mod validation;

#[cfg(target_os = "freebsd")]
pub mod gpioths;

// Core exports
pub use error::{RadiationError, RadiationResult, SensorError, SensorResult};
pub use iio::IioBackend;
pub use mock::{MockSensors, MockTransport};
pub use sensor::default_backend;
pub use traits::{ApiRequest, JsonTransport, SensorBackend};
pub use uradmon::{HttpTransport, UradmonClient, UradmonCredentials};

#[cfg(target_os = "freebsd")]
pub use gpioths::SysctlBackend;

// Re-export from homesens-types
pub use homesens_types::{RadiationReading, SensorInfo, SensorReading};
