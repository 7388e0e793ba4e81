//! API header construction.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

/// Header carrying the bearer token on authenticated requests.
pub const X_AUTH_TOKEN: &str = "x-auth-token";

/// Credential headers of the 1.0 auth exchange.
pub const X_AUTH_USER: &str = "x-auth-user";
pub const X_AUTH_KEY: &str = "x-auth-key";

// Response headers of the 1.0 auth exchange.
pub const X_SERVER_MANAGEMENT_URL: &str = "x-server-management-url";
pub const X_CDN_MANAGEMENT_URL: &str = "x-cdn-management-url";
pub const X_STORAGE_URL: &str = "x-storage-url";

/// Build the default headers sent on every auth exchange.
pub fn auth_request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );

    headers
}

/// Build the default headers for requests issued after authentication:
/// the auth token plus the configured accept format.
pub fn authenticated_headers(auth_token: &str, accept_format: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        HeaderName::from_static(X_AUTH_TOKEN),
        HeaderValue::from_str(auth_token)
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );

    headers.insert(
        ACCEPT,
        HeaderValue::from_str(accept_format)
            .unwrap_or_else(|_| HeaderValue::from_static("application/json")),
    );

    headers
}
