//! HTTP client for the uRadMonitor device API.
//!
//! One GET per run against the configured endpoint (by default
//! [`DEFAULT_API_URL`]). Credentials are sent both as query parameters and as
//! the `X-User-id` / `X-User-hash` headers the hosted API authenticates with.
//!
//! Two response shapes are understood:
//!
//! - the `/devices` listing: an array of device records, from which the entry
//!   matching the device id is taken and its dose rate computed as
//!   `avg_cpm * factor`;
//! - a single object carrying a numeric `radiation` field.
//!
//! # Example
//!
//! ```no_run
//! use homesens_core::uradmon::{UradmonClient, UradmonCredentials, DEFAULT_API_URL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = UradmonCredentials::new("82000001", "1234", "0123abcd");
//! let client = UradmonClient::new(credentials, DEFAULT_API_URL)?;
//! let reading = client.fetch().await?;
//! println!("{}", reading);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use homesens_types::{RadiationReading, parse_decimal};

use crate::error::{RadiationError, RadiationResult};
use crate::traits::{ApiRequest, JsonTransport};
use crate::validation::parse_api_url;

/// The hosted uRadMonitor device API.
pub const DEFAULT_API_URL: &str = "https://data.uradmonitor.com/api/v1/devices";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Device id, user id and user key for the uRadMonitor API.
#[derive(Clone, PartialEq, Eq)]
pub struct UradmonCredentials {
    pub device_id: String,
    pub user_id: String,
    pub user_key: String,
}

impl UradmonCredentials {
    pub fn new(
        device_id: impl Into<String>,
        user_id: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            user_id: user_id.into(),
            user_key: user_key.into(),
        }
    }
}

impl std::fmt::Debug for UradmonCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UradmonCredentials")
            .field("device_id", &self.device_id)
            .field("user_id", &self.user_id)
            .field("user_key", &"<redacted>")
            .finish()
    }
}

// ==========================================================================
// Transport
// ==========================================================================

/// [`JsonTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> RadiationResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("homesens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RadiationError::Client)?;
        Ok(Self { client })
    }

    /// Create a transport with a custom reqwest Client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, request: &ApiRequest) -> RadiationResult<Value> {
        let network_error = |e: reqwest::Error| RadiationError::Network {
            url: request.url.clone(),
            source: Box::new(e),
        };

        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!("GET {}", request.url);
        let response = builder.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network_error)?;
        tracing::debug!("HTTP {} ({} bytes)", status, body.len());

        decode_body(status, &body)
    }
}

/// Turn a status code and body into JSON, or the matching error.
///
/// Non-2xx statuses become [`RadiationError::Api`], using the body's `error`
/// field as the message when there is one.
pub fn decode_body(status: u16, body: &str) -> RadiationResult<Value> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .or_else(|| {
                StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(String::from)
            })
            .unwrap_or_else(|| "unknown status".to_string());
        return Err(RadiationError::Api { status, message });
    }

    serde_json::from_str(body).map_err(|e| RadiationError::Parse(format!("invalid JSON: {e}")))
}

// ==========================================================================
// Client
// ==========================================================================

/// Client for one uRadMonitor device.
#[derive(Debug)]
pub struct UradmonClient<T: JsonTransport = HttpTransport> {
    transport: T,
    credentials: UradmonCredentials,
    api_url: String,
}

impl UradmonClient<HttpTransport> {
    /// Create a client using [`HttpTransport`].
    pub fn new(credentials: UradmonCredentials, api_url: &str) -> RadiationResult<Self> {
        Self::with_transport(HttpTransport::new()?, credentials, api_url)
    }
}

impl<T: JsonTransport> UradmonClient<T> {
    /// Create a client with a custom transport.
    pub fn with_transport(
        transport: T,
        credentials: UradmonCredentials,
        api_url: &str,
    ) -> RadiationResult<Self> {
        let api_url = parse_api_url(api_url)
            .map_err(RadiationError::InvalidUrl)?
            .to_string();
        Ok(Self {
            transport,
            credentials,
            api_url,
        })
    }

    /// The API endpoint.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The request [`fetch`](Self::fetch) sends.
    pub fn request(&self) -> ApiRequest {
        let c = &self.credentials;
        ApiRequest {
            url: self.api_url.clone(),
            query: vec![
                ("id".to_string(), c.device_id.clone()),
                ("userid".to_string(), c.user_id.clone()),
                ("userkey".to_string(), c.user_key.clone()),
            ],
            headers: vec![
                ("X-User-id".to_string(), c.user_id.clone()),
                ("X-User-hash".to_string(), c.user_key.clone()),
            ],
        }
    }

    /// Fetch the current radiation reading. Exactly one request is made.
    pub async fn fetch(&self) -> RadiationResult<RadiationReading> {
        let body = self.transport.get_json(&self.request()).await?;
        let reading = parse_payload(&self.credentials.device_id, &body)?;
        tracing::debug!(
            device = %reading.device_id,
            value = reading.value,
            online = reading.online,
            "radiation read"
        );
        Ok(reading)
    }
}

// ==========================================================================
// Payload parsing
// ==========================================================================

/// Extract the reading for `device_id` from an API response body.
pub fn parse_payload(device_id: &str, body: &Value) -> RadiationResult<RadiationReading> {
    match body {
        Value::Object(map) if map.contains_key("radiation") => {
            let value = map.get("radiation").and_then(number).ok_or_else(|| {
                RadiationError::Parse("\"radiation\" is not a number".to_string())
            })?;
            let mut reading = RadiationReading::new(device_id, value);
            if let Some(unit) = map.get("unit").and_then(Value::as_str) {
                reading.unit = unit.to_string();
            }
            reading.cpm = map.get("cpm").and_then(number);
            Ok(reading)
        }
        Value::Object(map) if map.contains_key("error") => Err(RadiationError::Parse(format!(
            "API reported an error: {}",
            map.get("error").and_then(text).unwrap_or_default()
        ))),
        Value::Array(devices) => {
            let entry = devices
                .iter()
                .find(|d| {
                    d.get("id")
                        .and_then(text)
                        .is_some_and(|id| id.eq_ignore_ascii_case(device_id))
                })
                .ok_or_else(|| {
                    RadiationError::Parse(format!(
                        "device {device_id} not present in API response"
                    ))
                })?;

            let cpm = required_number(entry, "avg_cpm")?;
            let factor = required_number(entry, "factor")?;
            let mut reading = RadiationReading::from_cpm(device_id, cpm, factor);
            reading.voltage = entry.get("avg_voltage").and_then(number);
            // avg_duty is reported in tenths of a percent
            reading.duty = entry.get("avg_duty").and_then(number).map(|d| d / 10.0);
            reading.online = entry.get("status").and_then(text).as_deref() == Some("1");
            Ok(reading)
        }
        other => Err(RadiationError::Parse(format!(
            "expected a device list or an object with a \"radiation\" field, got {}",
            kind(other)
        ))),
    }
}

fn required_number(entry: &Value, field: &str) -> RadiationResult<f64> {
    entry
        .get(field)
        .and_then(number)
        .ok_or_else(|| RadiationError::Parse(format!("missing or non-numeric \"{field}\"")))
}

/// Numbers arrive either as JSON numbers or as decimal strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s).ok(),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::json;

    fn credentials() -> UradmonCredentials {
        UradmonCredentials::new("82000001", "1234", "0123abcd")
    }

    fn client(transport: MockTransport) -> UradmonClient<MockTransport> {
        UradmonClient::with_transport(transport, credentials(), DEFAULT_API_URL).unwrap()
    }

    #[test]
    fn test_client_invalid_url() {
        let result =
            UradmonClient::with_transport(MockTransport::ok("{}"), credentials(), "localhost");
        assert!(matches!(result, Err(RadiationError::InvalidUrl(_))));
    }

    #[test]
    fn test_request_carries_credentials() {
        let request = client(MockTransport::ok("{}")).request();
        assert_eq!(request.url, DEFAULT_API_URL);
        assert_eq!(request.query_param("id"), Some("82000001"));
        assert_eq!(request.query_param("userid"), Some("1234"));
        assert_eq!(request.query_param("userkey"), Some("0123abcd"));
        assert!(
            request
                .headers
                .contains(&("X-User-hash".to_string(), "0123abcd".to_string()))
        );
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("82000001"));
        assert!(!debug.contains("0123abcd"));
    }

    #[tokio::test]
    async fn test_fetch_radiation_object() {
        let client = client(MockTransport::ok(r#"{"radiation": 0.12}"#));
        let reading = client.fetch().await.unwrap();
        assert!((reading.value - 0.12).abs() < 1e-9);
        assert_eq!(reading.unit, "µSv/h");
        assert_eq!(reading.device_id, "82000001");
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_http_500_is_api_error() {
        let client = client(MockTransport::with_status(500, "oops"));
        match client.fetch().await {
            Err(RadiationError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_api_error_uses_body_message() {
        let client = client(MockTransport::with_status(
            401,
            r#"{"error": "invalid user hash"}"#,
        ));
        match client.fetch().await {
            Err(RadiationError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid user hash");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_network_failure() {
        let client = client(MockTransport::unreachable());
        assert!(matches!(
            client.fetch().await,
            Err(RadiationError::Network { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let client = client(MockTransport::ok("{not json"));
        assert!(matches!(client.fetch().await, Err(RadiationError::Parse(_))));
    }

    #[test]
    fn test_parse_device_listing() {
        let body = json!([
            {"id": "82000002", "status": "1", "avg_cpm": "99", "factor": "0.0057"},
            {
                "id": "82000001",
                "status": "1",
                "avg_cpm": "20",
                "factor": "0.0057",
                "avg_voltage": "380.5",
                "avg_duty": "123"
            }
        ]);
        let reading = parse_payload("82000001", &body).unwrap();
        assert!((reading.value - 0.114).abs() < 1e-9);
        assert_eq!(reading.cpm, Some(20.0));
        assert_eq!(reading.voltage, Some(380.5));
        assert!((reading.duty.unwrap() - 12.3).abs() < 1e-9);
        assert!(reading.online);
    }

    #[test]
    fn test_parse_device_listing_numeric_fields_and_offline() {
        let body = json!([
            {"id": "82000001", "status": 0, "avg_cpm": 18, "factor": 0.0057}
        ]);
        let reading = parse_payload("82000001", &body).unwrap();
        assert_eq!(reading.cpm, Some(18.0));
        assert!(!reading.online);
        assert_eq!(reading.voltage, None);
    }

    #[test]
    fn test_parse_device_id_is_case_insensitive() {
        let body = json!([{"id": "8200000A", "status": "1", "avg_cpm": 1, "factor": 1}]);
        assert!(parse_payload("8200000a", &body).is_ok());
    }

    #[test]
    fn test_parse_device_missing_from_listing() {
        let body = json!([{"id": "82000002", "avg_cpm": "20", "factor": "0.0057"}]);
        let err = parse_payload("82000001", &body).unwrap_err();
        assert!(err.to_string().contains("82000001"));
    }

    #[test]
    fn test_parse_device_missing_factor() {
        let body = json!([{"id": "82000001", "avg_cpm": "20"}]);
        let err = parse_payload("82000001", &body).unwrap_err();
        assert!(err.to_string().contains("factor"));
    }

    #[test]
    fn test_parse_radiation_not_a_number() {
        let body = json!({"radiation": "high"});
        assert!(matches!(
            parse_payload("x", &body),
            Err(RadiationError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_radiation_custom_unit() {
        let body = json!({"radiation": 0.3, "unit": "uSv/h", "cpm": 52});
        let reading = parse_payload("x", &body).unwrap();
        assert_eq!(reading.unit, "uSv/h");
        assert_eq!(reading.cpm, Some(52.0));
    }

    #[test]
    fn test_parse_error_object() {
        let body = json!({"error": "not authorized"});
        let err = parse_payload("x", &body).unwrap_err();
        assert!(err.to_string().contains("not authorized"));
    }

    #[test]
    fn test_parse_unexpected_shape() {
        let err = parse_payload("x", &json!(42)).unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_decode_body_success() {
        let value = decode_body(200, r#"{"radiation": 0.12}"#).unwrap();
        assert_eq!(value["radiation"], 0.12);
    }

    #[test]
    fn test_client_keeps_api_url() {
        let client = UradmonClient::with_transport(
            MockTransport::ok("{}"),
            credentials(),
            "http://127.0.0.1:8080/api/v1/devices",
        )
        .unwrap();
        assert_eq!(client.api_url(), "http://127.0.0.1:8080/api/v1/devices");
        assert_eq!(client.request().url, client.api_url());
    }

    fn direct_transport() -> HttpTransport {
        HttpTransport::with_client(Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn test_http_transport_connection_refused() {
        // bind then drop so nothing listens on the port
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let request = ApiRequest {
            url: format!("http://{addr}/api/v1/devices"),
            query: vec![],
            headers: vec![],
        };

        match direct_transport().get_json(&request).await {
            Err(RadiationError::Network { url, .. }) => assert_eq!(url, request.url),
            other => panic!("expected Network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_transport_fetch_from_server() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/v1/devices", listener.local_addr().unwrap());
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let body = r#"{"radiation": 0.12}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&head).to_lowercase()
        });

        let client = UradmonClient::with_transport(direct_transport(), credentials(), &url).unwrap();
        let reading = client.fetch().await.unwrap();
        assert_eq!(reading.value, 0.12);

        let head = server.join().unwrap();
        assert!(head.starts_with("get /api/v1/devices?id=82000001&userid=1234&userkey=0123abcd"));
        assert!(head.contains("x-user-id: 1234"));
        assert!(head.contains("x-user-hash: 0123abcd"));
    }
}
