//! Service catalog wire types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single regional endpoint record within the catalog.
///
/// Only `region` and `publicURL` are interpreted by this crate; providers
/// attach additional fields (internalURL, versionId, tenantId, ...) which are
/// preserved verbatim in `extra` for drivers that want them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL", default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Endpoint {
    /// Endpoint carrying only a public URL, as synthesized from the 1.0
    /// header-based exchange.
    pub fn from_public_url(url: impl Into<String>) -> Self {
        Self {
            region: None,
            public_url: Some(url.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// One service descriptor in the 2.0-family catalog shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Raw catalog payload as returned by the auth endpoint, before
/// normalization. Consumed by [`crate::catalog::ServiceCatalog::build`]
/// and discarded.
#[derive(Debug, Clone)]
pub enum RawServiceCatalog {
    /// 1.x family: service name mapped to its endpoint list.
    V1(HashMap<String, Vec<Endpoint>>),
    /// 2.0 family: list of typed service descriptors.
    V2(Vec<ServiceEntry>),
}
