//! Keystone 2.0 auth exchanges.

use crate::config::{self, STATUS_NON_AUTHORITATIVE, STATUS_OK, STATUS_UNAUTHORIZED};
use crate::error::{Error, Result};
use crate::models::auth::{AuthOutcome, AuthV2Response, Credentials};
use crate::transport::{headers, http};

/// Api-key exchange via the `RAX-KSKEY` vendor extension.
pub(crate) async fn authenticate_with_apikey(
    client: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<AuthOutcome> {
    let payload = serde_json::json!({
        "auth": {
            "RAX-KSKEY:apiKeyCredentials": {
                "username": credentials.user_id,
                "apiKey": credentials.secret_key,
            }
        }
    });

    authenticate_with_body(client, auth_url, &payload).await
}

/// Password exchange: the only core Keystone credential type.
pub(crate) async fn authenticate_with_password(
    client: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<AuthOutcome> {
    let payload = serde_json::json!({
        "auth": {
            "passwordCredentials": {
                "username": credentials.user_id,
                "password": credentials.secret_key,
            }
        }
    });

    authenticate_with_body(client, auth_url, &payload).await
}

/// Shared exchange against the tokens endpoint. Both credential variants
/// post to the same path and parse the same response envelope; 203 is a
/// valid success status here (cached token from a non-authoritative source).
async fn authenticate_with_body(
    client: &reqwest::Client,
    auth_url: &str,
    payload: &serde_json::Value,
) -> Result<AuthOutcome> {
    let url = config::auth_url(auth_url, config::AUTH_V2_0_PATH);

    let response = client
        .post(&url)
        .headers(headers::auth_request_headers())
        .json(payload)
        .send()
        .await
        .map_err(Error::Network)?;

    let status = response.status().as_u16();
    if status == STATUS_UNAUTHORIZED {
        return Err(Error::InvalidCredentials);
    }
    if status != STATUS_OK && status != STATUS_NON_AUTHORITATIVE {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::unexpected_status(status, &body));
    }

    let parsed: AuthV2Response = http::json_body(response).await?;
    Ok(parsed.into_outcome())
}
