//! Input validation for uRadMonitor settings.

use reqwest::Url;

/// Check a uRadMonitor device id, user id or user key.
///
/// Accepted values are non-empty and contain only ASCII letters, digits,
/// `-` and `_`.
///
/// ```
/// use homesens_core::validation::is_valid_credential;
///
/// assert!(is_valid_credential("82000001"));
/// assert!(is_valid_credential("user_key-1"));
/// assert!(!is_valid_credential(""));
/// assert!(!is_valid_credential("a b"));
/// ```
#[must_use]
pub fn is_valid_credential(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse an API endpoint, requiring an `http`/`https` scheme and a host.
pub fn parse_api_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("{value}: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "URL must start with http:// or https://, got: {value}"
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("URL has no host: {value}"));
    }
    Ok(url)
}
