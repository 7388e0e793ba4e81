//! Protocol constants and URL helpers for the OpenStack auth family.

use std::time::Duration;

/// Auth protocol version used when the caller does not override it.
pub const DEFAULT_AUTH_VERSION: &str = "1.1";

/// Path of the 1.0 header-based auth exchange, relative to the auth URL.
pub const AUTH_V1_0_PATH: &str = "/v1.0";

/// Path of the 1.1 JSON auth exchange.
pub const AUTH_V1_1_PATH: &str = "/v1.1/auth";

/// Path of the 2.0 tokens endpoint (shared by the api-key and password variants).
pub const AUTH_V2_0_PATH: &str = "/v2.0/tokens/";

/// Accept header value sent on authenticated requests unless overridden.
pub const DEFAULT_ACCEPT_FORMAT: &str = "application/json";

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Total timeout for a single request/response exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

// Status codes the auth protocol distinguishes.
pub const STATUS_OK: u16 = 200;
pub const STATUS_NON_AUTHORITATIVE: u16 = 203;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Join an auth base URL with a version path, tolerating a trailing slash
/// on the configured URL.
pub fn auth_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
