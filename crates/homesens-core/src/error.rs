//! Error types for homesens-core.
//!
//! Sensor access and the uRadMonitor call fail independently, so each has its
//! own error enum. None of these errors are retried: homesens makes a single
//! attempt per run and reports the failure.
//!
//! | Error | Raised by |
//! |-------|-----------|
//! | [`SensorError::NoSensors`] | Listing found no temperature/humidity sensor |
//! | [`SensorError::NotFound`] | The requested sensor index does not exist |
//! | [`SensorError::Read`] | A leaf could not be read |
//! | [`SensorError::InvalidValue`] | A leaf held something other than a number |
//! | [`RadiationError::Network`] | Connection or transport failure |
//! | [`RadiationError::Api`] | The API answered with a non-2xx status |
//! | [`RadiationError::Parse`] | The body was not the expected JSON shape |

use thiserror::Error;

/// Errors that can occur when listing or reading local sensors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SensorError {
    /// No temperature/humidity sensor was detected on the host.
    #[error("No sensor(s) detected")]
    NoSensors,

    /// The requested sensor index is not present.
    #[error("Invalid sensor number {index} (available: {})", format_indices(.available))]
    NotFound {
        /// The index that was requested.
        index: u32,
        /// Indices that are present.
        available: Vec<u32>,
    },

    /// A leaf of an existing sensor could not be read.
    #[error("Failed to read '{leaf}' from sensor {index}: {reason}")]
    Read {
        /// Sensor index.
        index: u32,
        /// Leafoid that failed.
        leaf: String,
        /// Underlying cause.
        reason: String,
    },

    /// A leaf was read but its content is not a number.
    #[error("Invalid value in '{leaf}' of sensor {index}: {source}")]
    InvalidValue {
        /// Sensor index.
        index: u32,
        /// Leafoid that held the value.
        leaf: String,
        /// Parse failure.
        #[source]
        source: homesens_types::ParseError,
    },

    /// I/O error while walking the sensor tree.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// sysctl(3) error.
    #[cfg(target_os = "freebsd")]
    #[error("sysctl error: {0}")]
    Sysctl(#[from] sysctl::SysctlError),
}

fn format_indices(indices: &[u32]) -> String {
    if indices.is_empty() {
        return "none".to_string();
    }
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for sensor operations.
pub type SensorResult<T> = std::result::Result<T, SensorError>;

/// Errors that can occur when fetching data from the uRadMonitor API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RadiationError {
    /// The API could not be reached or the transfer failed.
    #[error("uRadMonitor API not reachable at {url}: {source}")]
    Network {
        /// URL that was requested.
        url: String,
        /// Transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The API answered with a non-success status.
    #[error("uRadMonitor API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the status reason.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected uRadMonitor response: {0}")]
    Parse(String),

    /// The configured API URL is not usable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type alias for uRadMonitor operations.
pub type RadiationResult<T> = std::result::Result<T, RadiationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_available_indices() {
        let err = SensorError::NotFound {
            index: 2,
            available: vec![0, 1],
        };
        assert_eq!(
            err.to_string(),
            "Invalid sensor number 2 (available: 0, 1)"
        );
    }

    #[test]
    fn test_not_found_with_no_sensors() {
        let err = SensorError::NotFound {
            index: 0,
            available: vec![],
        };
        assert!(err.to_string().contains("available: none"));
    }

    #[test]
    fn test_api_error_carries_status() {
        let err = RadiationError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn test_network_error_exposes_source() {
        use std::error::Error as _;

        let err = RadiationError::Network {
            url: "http://127.0.0.1:1/".to_string(),
            source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
        };
        assert!(err.to_string().contains("http://127.0.0.1:1/"));
        assert!(err.source().is_some());
    }
}
