//! Authentication-related types.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;
use crate::models::catalog::{Endpoint, RawServiceCatalog, ServiceEntry};

/// Auth protocol variant spoken against the auth endpoint.
///
/// Each variant selects its own request shape and response parsing rules.
/// `"2.0"` is accepted as an alias for the api-key variant, matching the
/// provider's documented default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthVersion {
    /// Legacy header-based exchange: credentials in request headers,
    /// token and endpoint URLs in response headers.
    V1_0,
    /// JSON exchange against `/v1.1/auth` (default).
    #[default]
    V1_1,
    /// Keystone 2.0 tokens endpoint with the `RAX-KSKEY` api-key extension.
    V2_0ApiKey,
    /// Keystone 2.0 tokens endpoint with core password credentials.
    V2_0Password,
}

impl AuthVersion {
    /// Whether this version yields the 2.0-family catalog shape
    /// (list of typed service descriptors).
    pub fn is_v2_family(&self) -> bool {
        matches!(self, Self::V2_0ApiKey | Self::V2_0Password)
    }

    /// Whether this version yields the 1.x-family catalog shape
    /// (service-name keyed endpoint lists).
    pub fn is_v1_family(&self) -> bool {
        !self.is_v2_family()
    }
}

impl FromStr for AuthVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(Self::V1_0),
            "1.1" => Ok(Self::V1_1),
            "2.0" | "2.0_apikey" => Ok(Self::V2_0ApiKey),
            "2.0_password" => Ok(Self::V2_0Password),
            other => Err(Error::Config(format!(
                "Unsupported auth version requested: '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AuthVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1_0 => write!(f, "1.0"),
            Self::V1_1 => write!(f, "1.1"),
            Self::V2_0ApiKey => write!(f, "2.0_apikey"),
            Self::V2_0Password => write!(f, "2.0_password"),
        }
    }
}

/// User credentials exchanged for an auth token.
///
/// Immutable for the lifetime of the owning connection.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username presented to the auth endpoint.
    pub user_id: String,
    /// API key or password, depending on the auth version.
    pub secret_key: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            secret_key: secret_key.into(),
        }
    }
}

/// Result of one successful authentication exchange: the bearer token and
/// the raw service catalog to be normalized by [`crate::catalog::ServiceCatalog`].
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub catalog: RawServiceCatalog,
}

/// Token record shared by the 1.1 and 2.0 response envelopes.
#[derive(Debug, Deserialize)]
pub struct TokenRecord {
    pub id: String,
}

/// Response envelope of the 1.1 auth exchange.
///
/// `{"auth": {"token": {"id": ...}, "serviceCatalog": {name: [endpoint, ...]}}}`
#[derive(Debug, Deserialize)]
pub struct AuthV1Response {
    pub auth: AuthV1Access,
}

#[derive(Debug, Deserialize)]
pub struct AuthV1Access {
    pub token: TokenRecord,
    #[serde(rename = "serviceCatalog")]
    pub service_catalog: HashMap<String, Vec<Endpoint>>,
}

/// Response envelope of the 2.0 tokens endpoint.
///
/// `{"access": {"token": {"id": ...}, "serviceCatalog": [service, ...]}}`
#[derive(Debug, Deserialize)]
pub struct AuthV2Response {
    pub access: AuthV2Access,
}

#[derive(Debug, Deserialize)]
pub struct AuthV2Access {
    pub token: TokenRecord,
    #[serde(rename = "serviceCatalog")]
    pub service_catalog: Vec<ServiceEntry>,
}

impl AuthV1Response {
    pub fn into_outcome(self) -> AuthOutcome {
        AuthOutcome {
            token: self.auth.token.id,
            catalog: RawServiceCatalog::V1(self.auth.service_catalog),
        }
    }
}

impl AuthV2Response {
    pub fn into_outcome(self) -> AuthOutcome {
        AuthOutcome {
            token: self.access.token.id,
            catalog: RawServiceCatalog::V2(self.access.service_catalog),
        }
    }
}
