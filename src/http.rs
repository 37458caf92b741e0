//! Blocking HTTP client construction shared by the remote providers.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{HsError, Result};

/// Build a client that sends `authorization` on every request.
///
/// The header is marked sensitive so it never shows up in debug output.
pub fn authorized_client(authorization: &str, timeout: Duration) -> Result<reqwest::blocking::Client> {
    let mut value = HeaderValue::from_str(authorization)
        .map_err(|err| HsError::Config(format!("credential is not a valid header value: {err}")))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);

    reqwest::blocking::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|err| HsError::Config(format!("http client: {err}")))
}

/// Build a client without credentials.
pub fn plain_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| HsError::Config(format!("http client: {err}")))
}

/// Pull the most specific reason out of an error body, falling back to the raw text.
pub fn error_reason(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    let error = &value["error"];
    error["root_cause"][0]["reason"]
        .as_str()
        .or_else(|| error["reason"].as_str())
        .or_else(|| error["message"].as_str())
        .or_else(|| error.as_str())
        .map_or_else(|| body.trim().to_string(), str::to_string)
}
