//! Response decoding for auth and API exchanges.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::config::{CONNECT_TIMEOUT, REQUEST_TIMEOUT};
use crate::error::{Error, Result};

/// Build the HTTP client used for auth exchanges and API requests.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(Error::Network)
}

/// Read a response header as a string, if present and valid UTF-8.
///
/// `HeaderMap` lookups are case-insensitive, so `x-auth-token` matches
/// `X-Auth-Token` as sent by legacy endpoints.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extract the media type of a response, stripping any `;charset` suffix.
///
/// A response without any content-type header is malformed per the auth
/// protocol and is reported as such rather than guessed at.
pub fn media_type(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(CONTENT_TYPE)
        .ok_or(Error::MissingContentType)?
        .to_str()
        .map_err(|_| Error::MissingContentType)?;

    Ok(value.split(';').next().unwrap_or(value).trim())
}

/// Decode a JSON response body into `T`.
///
/// Any decode failure (wrong media type, unparsable body, missing required
/// keys) is converted to [`Error::MalformedResponse`]; raw serde errors never
/// escape to callers.
pub async fn json_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let media = media_type(response.headers())?.to_string();
    let body = response.text().await.map_err(Error::Network)?;

    if media != "application/json" {
        return Err(Error::malformed(format!(
            "Expected application/json response, got '{}': {}",
            media, body
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        Error::malformed(format!("Failed to parse JSON ({}): {}", e, body))
    })
}
