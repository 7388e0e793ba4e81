//! Version dispatch for the authentication handshake.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::auth::{AuthOutcome, AuthVersion, Credentials};

/// Perform a single authentication exchange against `auth_url`.
///
/// Dispatches on `version` to the matching request-builder/response-parser
/// pair. Exactly one attempt is made; any failure surfaces synchronously:
///
/// - 401 → [`Error::InvalidCredentials`]
/// - unexpected status, unparsable body, missing keys, empty token →
///   [`Error::MalformedResponse`]
/// - transport failure → [`Error::Network`]
pub async fn authenticate(
    client: &reqwest::Client,
    auth_url: &str,
    version: AuthVersion,
    credentials: &Credentials,
) -> Result<AuthOutcome> {
    debug!(%version, auth_url, "Starting authentication exchange");

    let outcome = match version {
        AuthVersion::V1_0 => super::v1::authenticate_1_0(client, auth_url, credentials).await?,
        AuthVersion::V1_1 => super::v1::authenticate_1_1(client, auth_url, credentials).await?,
        AuthVersion::V2_0ApiKey => {
            super::v2::authenticate_with_apikey(client, auth_url, credentials).await?
        }
        AuthVersion::V2_0Password => {
            super::v2::authenticate_with_password(client, auth_url, credentials).await?
        }
    };

    // A success response with an empty token is a protocol violation, not an
    // auth rejection.
    if outcome.token.is_empty() {
        return Err(Error::malformed("Auth response contains an empty token"));
    }

    info!(%version, "Authenticated");
    Ok(outcome)
}
