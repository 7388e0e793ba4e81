//! # openstack-gateway
//!
//! Rust client library for OpenStack-style authentication bootstrapping and
//! endpoint discovery.
//!
//! The API host is only known after authenticating: a separate auth endpoint
//! exchanges credentials for a bearer token and a service catalog describing
//! where each logical service (compute, storage, CDN) lives per region. This
//! crate negotiates that exchange across the four incompatible auth protocol
//! variants, normalizes both catalog shapes into a uniform lookup structure,
//! and transparently rewrites outgoing requests to the resolved endpoint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use openstack_gateway::{OpenStackConnection, ServiceSelector, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let conn = OpenStackConnection::builder()
//!         .credentials("alice", "s3cr3t-api-key")
//!         .auth_url("https://auth.provider.example")
//!         .auth_version("2.0_apikey")
//!         .resolver(
//!             ServiceSelector::new()
//!                 .service_type("compute")
//!                 .region("DFW"),
//!         )
//!         .build()?;
//!
//!     // First request authenticates, resolves the compute endpoint from
//!     // the catalog, and retargets the connection before dispatching.
//!     let response = conn.get("/servers/detail").await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod transport;

// Re-exports for ergonomic usage
pub use catalog::ServiceCatalog;
pub use connection::{
    EndpointResolver, OpenStackConnection, OpenStackConnectionBuilder, ServiceSelector,
};
pub use error::{Error, Result};
pub use models::auth::{AuthVersion, Credentials};
pub use models::catalog::Endpoint;
