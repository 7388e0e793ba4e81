//! Service catalog normalization and lookup.
//!
//! The auth endpoint describes where each logical service lives in one of two
//! catalog shapes, depending on the auth version family. [`ServiceCatalog`]
//! normalizes either shape into a three-level index — service type (2.0) or
//! service name (1.x), then name, then region — and answers point lookups
//! against it. The index is built once per authentication and read-only
//! afterwards.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::auth::AuthVersion;
use crate::models::catalog::{Endpoint, RawServiceCatalog};

/// Endpoints grouped by their (nullable) region, in declared order.
type RegionMap = HashMap<Option<String>, Vec<Endpoint>>;

/// Normalized index over the catalog. The 2.0 family classifies services by
/// both type and an optional vendor-specific name; the 1.x family only has
/// the name axis.
#[derive(Debug)]
enum CatalogIndex {
    /// `name → region → endpoints`
    V1(HashMap<String, RegionMap>),
    /// `type → name → region → endpoints`
    V2(HashMap<String, HashMap<Option<String>, RegionMap>>),
}

/// Read-only view over the service catalog returned at authentication time.
#[derive(Debug)]
pub struct ServiceCatalog {
    index: CatalogIndex,
}

impl ServiceCatalog {
    /// Normalize a raw catalog payload into the lookup index.
    ///
    /// The payload shape is fixed by the auth version family that produced
    /// it; a mismatch between the two is a programming error and reported as
    /// [`Error::Config`].
    pub fn build(raw: RawServiceCatalog, version: AuthVersion) -> Result<Self> {
        let index = match raw {
            RawServiceCatalog::V1(services) if version.is_v1_family() => {
                let mut index: HashMap<String, RegionMap> = HashMap::new();
                for (service, endpoints) in services {
                    let regions = index.entry(service).or_default();
                    for endpoint in endpoints {
                        regions
                            .entry(endpoint.region.clone())
                            .or_default()
                            .push(endpoint);
                    }
                }
                debug!(services = index.len(), "Built 1.x catalog index");
                CatalogIndex::V1(index)
            }
            RawServiceCatalog::V2(services) if version.is_v2_family() => {
                let mut index: HashMap<String, HashMap<Option<String>, RegionMap>> =
                    HashMap::new();
                for service in services {
                    let regions = index
                        .entry(service.service_type)
                        .or_default()
                        .entry(service.name)
                        .or_default();
                    for endpoint in service.endpoints {
                        regions
                            .entry(endpoint.region.clone())
                            .or_default()
                            .push(endpoint);
                    }
                }
                debug!(service_types = index.len(), "Built 2.0 catalog index");
                CatalogIndex::V2(index)
            }
            _ => {
                return Err(Error::Config(format!(
                    "Service catalog shape does not match auth version '{}'",
                    version
                )))
            }
        };

        Ok(Self { index })
    }

    /// Resolve a single endpoint from the catalog.
    ///
    /// 2.0-family indices traverse `[service_type][name][region]`; 1.x-family
    /// indices traverse `[name][region]` and ignore `service_type`. Missing
    /// keys at any level resolve to no match — lookup is total and never
    /// fails.
    ///
    /// Returns the endpoint only when exactly one matches. Zero and multiple
    /// matches are both `None`: a caller that needs disambiguation passes a
    /// more specific name or region.
    pub fn lookup(
        &self,
        service_type: Option<&str>,
        name: Option<&str>,
        region: Option<&str>,
    ) -> Option<Endpoint> {
        let region_key = region.map(str::to_string);
        let name_key = name.map(str::to_string);

        let matches: &[Endpoint] = match &self.index {
            CatalogIndex::V1(index) => name
                .and_then(|n| index.get(n))
                .and_then(|regions| regions.get(&region_key))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            CatalogIndex::V2(index) => service_type
                .and_then(|t| index.get(t))
                .and_then(|names| names.get(&name_key))
                .and_then(|regions| regions.get(&region_key))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        };

        match matches {
            [endpoint] => Some(endpoint.clone()),
            _ => None,
        }
    }

    /// Number of services (1.x) or service types (2.0) in the catalog.
    pub fn len(&self) -> usize {
        match &self.index {
            CatalogIndex::V1(index) => index.len(),
            CatalogIndex::V2(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
