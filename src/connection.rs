//! Endpoint-resolving connection.
//!
//! The API host is only known after authentication: the auth endpoint hands
//! back a token and a service catalog, and the catalog says where the
//! driver's service actually lives. [`OpenStackConnection`] performs that
//! handshake lazily on first use, rewrites its request target to the
//! resolved endpoint, and attaches the token to every subsequent request.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::auth;
use crate::catalog::ServiceCatalog;
use crate::config::DEFAULT_ACCEPT_FORMAT;
use crate::error::{Error, Result};
use crate::models::auth::{AuthVersion, Credentials};
use crate::models::catalog::Endpoint;
use crate::transport::{headers, http};

/// Driver-supplied endpoint resolution.
///
/// Every concrete service driver must decide which catalog entry it talks
/// to; there is no sensible default. Implementations consult
/// [`ServiceCatalog::lookup`] with their service type/name/region hints and
/// return the endpoint's URL.
pub trait EndpointResolver: Send + Sync {
    fn resolve_endpoint(&self, catalog: &ServiceCatalog) -> Result<String>;
}

/// Resolver selecting a catalog entry by fixed (type, name, region) hints
/// and returning its public URL. Covers the common driver case.
#[derive(Debug, Clone, Default)]
pub struct ServiceSelector {
    pub service_type: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
}

impl ServiceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl EndpointResolver for ServiceSelector {
    fn resolve_endpoint(&self, catalog: &ServiceCatalog) -> Result<String> {
        let endpoint: Endpoint = catalog
            .lookup(
                self.service_type.as_deref(),
                self.name.as_deref(),
                self.region.as_deref(),
            )
            .ok_or_else(|| {
                Error::Config(format!(
                    "No endpoint found in service catalog for type={:?} name={:?} region={:?}",
                    self.service_type, self.name, self.region
                ))
            })?;

        endpoint
            .public_url
            .ok_or_else(|| Error::Config("Catalog endpoint has no publicURL".into()))
    }
}

/// Request target decomposed from the resolved endpoint URL.
#[derive(Debug, Clone)]
struct ResolvedTarget {
    secure: bool,
    host: String,
    port: u16,
    base_path: String,
}

impl ResolvedTarget {
    /// Decompose an endpoint URL. A scheme-less URL falls back to the
    /// connection's `secure` flag for its scheme.
    fn from_url(url: &str, default_secure: bool) -> Result<Self> {
        let candidate = if url.contains("://") {
            url.to_string()
        } else {
            let scheme = if default_secure { "https" } else { "http" };
            format!("{}://{}", scheme, url)
        };
        let parsed = reqwest::Url::parse(&candidate)
            .map_err(|e| Error::Config(format!("Invalid endpoint URL '{}': {}", url, e)))?;

        let secure = parsed.scheme() == "https";
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Config(format!("Endpoint URL '{}' has no host", url)))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| Error::Config(format!("Endpoint URL '{}' has no port", url)))?;
        let base_path = parsed.path().trim_end_matches('/').to_string();

        Ok(Self {
            secure,
            host,
            port,
            base_path,
        })
    }

    /// Absolute URL for a request path under this target.
    fn url_for(&self, path: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let sep = if path.is_empty() || path.starts_with('/') {
            ""
        } else {
            "/"
        };
        format!(
            "{}://{}:{}{}{}{}",
            scheme, self.host, self.port, self.base_path, sep, path
        )
    }
}

/// State populated by the Unauthenticated → Authenticated transition.
#[derive(Debug)]
struct AuthState {
    token: String,
    catalog: Arc<ServiceCatalog>,
    target: ResolvedTarget,
}

/// Connection that authenticates lazily and dispatches requests to the
/// endpoint resolved from the service catalog.
///
/// # Examples
///
/// ```rust,no_run
/// use openstack_gateway::{OpenStackConnection, ServiceSelector, Result};
///
/// # async fn example() -> Result<()> {
/// let conn = OpenStackConnection::builder()
///     .credentials("alice", "s3cr3t")
///     .auth_url("https://auth.provider.example")
///     .auth_version("2.0_apikey")
///     .resolver(ServiceSelector::new().service_type("compute").region("DFW"))
///     .build()?;
///
/// let response = conn.get("/servers/detail").await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenStackConnection {
    credentials: Credentials,
    auth_url: Option<String>,
    auth_version: AuthVersion,
    force_base_url: Option<String>,
    secure: bool,
    accept_format: String,
    resolver: Option<Arc<dyn EndpointResolver>>,
    client: reqwest::Client,
    /// None until the first successful authentication. The mutex is held
    /// across the whole transition so concurrent callers never duplicate
    /// the auth exchange.
    state: Mutex<Option<AuthState>>,
}

impl OpenStackConnection {
    /// Create a builder for configuring the connection.
    pub fn builder() -> OpenStackConnectionBuilder {
        OpenStackConnectionBuilder::new()
    }

    /// Drive the Unauthenticated → Authenticated transition, exactly once.
    ///
    /// Idempotent: once authenticated this is a no-op. On first call it
    /// negotiates the token, normalizes the catalog, resolves the driver's
    /// endpoint (or the force-base-URL override), and reconfigures the
    /// request target.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.is_some() {
            return Ok(());
        }

        let auth_url = self
            .auth_url
            .as_deref()
            .ok_or_else(|| Error::Config("Connection must have an auth URL set".into()))?;

        let outcome =
            auth::authenticate(&self.client, auth_url, self.auth_version, &self.credentials)
                .await?;
        let catalog = ServiceCatalog::build(outcome.catalog, self.auth_version)?;

        let endpoint_url = match &self.force_base_url {
            Some(url) => url.clone(),
            None => self
                .resolver
                .as_ref()
                .ok_or_else(|| {
                    Error::Config("Connection has no endpoint resolver configured".into())
                })?
                .resolve_endpoint(&catalog)?,
        };

        let target = ResolvedTarget::from_url(&endpoint_url, self.secure)?;
        info!(
            host = %target.host,
            port = target.port,
            secure = target.secure,
            services = catalog.len(),
            "Resolved service endpoint"
        );

        *state = Some(AuthState {
            token: outcome.token,
            catalog: Arc::new(catalog),
            target,
        });
        Ok(())
    }

    /// Discard the current token and catalog and authenticate again.
    ///
    /// Token expiry is not detected automatically; a driver seeing a 401
    /// after authentication calls this explicitly.
    pub async fn reauthenticate(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            debug!("Discarding auth state for re-authentication");
            *state = None;
        }
        self.ensure_authenticated().await
    }

    /// The current auth token, authenticating first if necessary.
    pub async fn auth_token(&self) -> Result<String> {
        self.ensure_authenticated().await?;
        let state = self.state.lock().await;
        state
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(Error::NotAuthenticated)
    }

    /// The normalized service catalog, authenticating first if necessary.
    pub async fn service_catalog(&self) -> Result<Arc<ServiceCatalog>> {
        self.ensure_authenticated().await?;
        let state = self.state.lock().await;
        state
            .as_ref()
            .map(|s| Arc::clone(&s.catalog))
            .ok_or(Error::NotAuthenticated)
    }

    /// The resolved base URL requests are dispatched to.
    pub async fn endpoint_url(&self) -> Result<String> {
        self.ensure_authenticated().await?;
        let state = self.state.lock().await;
        state
            .as_ref()
            .map(|s| s.target.url_for(""))
            .ok_or(Error::NotAuthenticated)
    }

    /// Issue a request against the resolved endpoint.
    ///
    /// Ensures the Authenticated state first, then targets
    /// `{endpoint}{path}` with the default headers (auth token and accept
    /// format) attached. The response is returned as-is; post-auth HTTP
    /// errors are the driver's to interpret.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        self.ensure_authenticated().await?;

        let (url, token) = {
            let state = self.state.lock().await;
            let state = state.as_ref().ok_or(Error::NotAuthenticated)?;
            (state.target.url_for(path), state.token.clone())
        };

        debug!(%method, %url, "Dispatching request");

        let mut request = self
            .client
            .request(method, &url)
            .headers(headers::authenticated_headers(&token, &self.accept_format));
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(Error::Network)
    }

    /// `GET {endpoint}{path}`.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.request(reqwest::Method::GET, path, None).await
    }

    /// `POST {endpoint}{path}` with a JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        self.request(reqwest::Method::POST, path, Some(body)).await
    }
}

impl std::fmt::Debug for OpenStackConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStackConnection")
            .field("auth_url", &self.auth_url)
            .field("auth_version", &self.auth_version)
            .field("force_base_url", &self.force_base_url)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Builder for [`OpenStackConnection`].
pub struct OpenStackConnectionBuilder {
    credentials: Option<Credentials>,
    auth_url: Option<String>,
    auth_version: Option<String>,
    force_base_url: Option<String>,
    secure: bool,
    accept_format: Option<String>,
    resolver: Option<Arc<dyn EndpointResolver>>,
    reqwest_client: Option<reqwest::Client>,
}

impl OpenStackConnectionBuilder {
    pub fn new() -> Self {
        Self {
            credentials: None,
            auth_url: None,
            auth_version: None,
            force_base_url: None,
            secure: true,
            accept_format: None,
            resolver: None,
            reqwest_client: None,
        }
    }

    /// Set the user id and secret key (required).
    pub fn credentials(
        mut self,
        user_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::new(user_id, secret_key));
        self
    }

    /// Set the auth endpoint base URL.
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Override the auth protocol version. Recognized values: `1.0`, `1.1`,
    /// `2.0`, `2.0_apikey`, `2.0_password`. Defaults to `1.1`.
    pub fn auth_version(mut self, version: impl Into<String>) -> Self {
        self.auth_version = Some(version.into());
        self
    }

    /// Bypass catalog resolution and send all requests to this base URL.
    pub fn force_base_url(mut self, url: impl Into<String>) -> Self {
        self.force_base_url = Some(url.into());
        self
    }

    /// Scheme fallback for scheme-less endpoint URLs (default: secure).
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accept header value for authenticated requests
    /// (default: `application/json`).
    pub fn accept_format(mut self, accept: impl Into<String>) -> Self {
        self.accept_format = Some(accept.into());
        self
    }

    /// Set the driver's endpoint resolver. Required unless a force-base-URL
    /// is configured.
    pub fn resolver(mut self, resolver: impl EndpointResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set a custom reqwest client (useful for testing or custom TLS config).
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.reqwest_client = Some(client);
        self
    }

    /// Build the connection, validating the configuration.
    pub fn build(self) -> Result<OpenStackConnection> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::Config("Connection credentials are required".into()))?;

        let auth_version = match self.auth_version.as_deref() {
            Some(s) => s.parse()?,
            None => AuthVersion::default(),
        };

        if self.resolver.is_none() && self.force_base_url.is_none() {
            return Err(Error::Config(
                "An endpoint resolver is required unless a force-base-URL is set".into(),
            ));
        }

        let client = match self.reqwest_client {
            Some(client) => client,
            None => http::build_client()?,
        };

        Ok(OpenStackConnection {
            credentials,
            auth_url: self.auth_url,
            auth_version,
            force_base_url: self.force_base_url,
            secure: self.secure,
            accept_format: self
                .accept_format
                .unwrap_or_else(|| DEFAULT_ACCEPT_FORMAT.to_string()),
            resolver: self.resolver,
            client,
            state: Mutex::new(None),
        })
    }
}

impl Default for OpenStackConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
