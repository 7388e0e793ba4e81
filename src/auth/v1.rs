//! 1.x auth exchanges.

use std::collections::HashMap;

use tracing::debug;

use crate::config::{self, STATUS_NO_CONTENT, STATUS_OK, STATUS_UNAUTHORIZED};
use crate::error::{Error, Result};
use crate::models::auth::{AuthOutcome, AuthV1Response, Credentials};
use crate::models::catalog::{Endpoint, RawServiceCatalog};
use crate::transport::{headers, http};

/// Legacy service names synthesized from the 1.0 response headers, in the
/// 1.1 catalog shape.
const V1_0_HEADER_SERVICES: &[(&str, &str)] = &[
    ("cloudServers", headers::X_SERVER_MANAGEMENT_URL),
    ("cloudFilesCDN", headers::X_CDN_MANAGEMENT_URL),
    ("cloudFiles", headers::X_STORAGE_URL),
];

/// 1.0 exchange: `GET {auth_url}/v1.0` with credentials in request headers.
///
/// Success is a 204 with the token and legacy endpoint URLs carried in
/// response headers; there is no body to parse.
pub(crate) async fn authenticate_1_0(
    client: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<AuthOutcome> {
    let url = config::auth_url(auth_url, config::AUTH_V1_0_PATH);

    let response = client
        .get(&url)
        .headers(headers::auth_request_headers())
        .header(headers::X_AUTH_USER, &credentials.user_id)
        .header(headers::X_AUTH_KEY, &credentials.secret_key)
        .send()
        .await
        .map_err(Error::Network)?;

    let status = response.status().as_u16();
    if status == STATUS_UNAUTHORIZED {
        return Err(Error::InvalidCredentials);
    }
    if status != STATUS_NO_CONTENT {
        // Keep the headers in the detail: on this path they are the payload.
        let header_dump = format!("{:?}", response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(Error::malformed(format!(
            "code: {} body: {} headers: {}",
            status, body, header_dump
        )));
    }

    let resp_headers = response.headers();

    let token = http::header_str(resp_headers, headers::X_AUTH_TOKEN)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::malformed("Missing X-Auth-Token in response headers"))?
        .to_string();

    // Emulate the 1.1 catalog from the legacy endpoint headers.
    let mut services: HashMap<String, Vec<Endpoint>> = HashMap::new();
    for (service, header) in V1_0_HEADER_SERVICES {
        if let Some(public_url) = http::header_str(resp_headers, header) {
            services.insert(
                (*service).to_string(),
                vec![Endpoint::from_public_url(public_url)],
            );
        }
    }

    debug!(services = services.len(), "Synthesized 1.0 catalog from headers");
    Ok(AuthOutcome {
        token,
        catalog: RawServiceCatalog::V1(services),
    })
}

/// 1.1 exchange: `POST {auth_url}/v1.1/auth` with a JSON credentials body.
pub(crate) async fn authenticate_1_1(
    client: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<AuthOutcome> {
    let url = config::auth_url(auth_url, config::AUTH_V1_1_PATH);

    let payload = serde_json::json!({
        "credentials": {
            "username": credentials.user_id,
            "key": credentials.secret_key,
        }
    });

    let response = client
        .post(&url)
        .headers(headers::auth_request_headers())
        .json(&payload)
        .send()
        .await
        .map_err(Error::Network)?;

    let status = response.status().as_u16();
    if status == STATUS_UNAUTHORIZED {
        return Err(Error::InvalidCredentials);
    }
    if status != STATUS_OK {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::unexpected_status(status, &body));
    }

    let parsed: AuthV1Response = http::json_body(response).await?;
    Ok(parsed.into_outcome())
}
