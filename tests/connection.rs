//! End-to-end tests: lazy authentication, endpoint rewriting, and request
//! dispatch through two scripted servers (auth endpoint + service endpoint).

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use openstack_gateway::{Error, OpenStackConnection, ServiceSelector};

/// Mount a 2.0 tokens endpoint whose catalog points the compute service at
/// `api_uri`.
async fn mount_v2_auth(server: &MockServer, token: &str, api_uri: &str) {
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": {
                "token": {"id": token},
                "serviceCatalog": [
                    {
                        "type": "compute",
                        "name": "cloudServersOpenStack",
                        "endpoints": [
                            {"region": "DFW", "publicURL": format!("{}/v2/acct", api_uri)}
                        ]
                    }
                ]
            }
        })))
        .mount(server)
        .await;
}

fn compute_resolver() -> ServiceSelector {
    ServiceSelector::new()
        .service_type("compute")
        .name("cloudServersOpenStack")
        .region("DFW")
}

#[tokio::test]
async fn test_first_request_authenticates_and_targets_resolved_endpoint() {
    let auth_server = MockServer::start().await;
    let api_server = MockServer::start().await;

    mount_v2_auth(&auth_server, "tok-e2e", &api_server.uri()).await;

    // The API mock only matches when the default headers are attached and
    // the request lands under the catalog-resolved base path.
    Mock::given(method("GET"))
        .and(path("/v2/acct/servers/detail"))
        .and(header("x-auth-token", "tok-e2e"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "servers": []
        })))
        .expect(1)
        .mount(&api_server)
        .await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("2.0_apikey")
        .resolver(compute_resolver())
        .build()
        .unwrap();

    let response = conn.get("/servers/detail").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    assert_eq!(conn.auth_token().await.unwrap(), "tok-e2e");
    let endpoint = conn.endpoint_url().await.unwrap();
    assert!(endpoint.ends_with("/v2/acct"), "endpoint was {}", endpoint);
}

#[tokio::test]
async fn test_ensure_authenticated_is_idempotent() {
    let auth_server = MockServer::start().await;
    let api_server = MockServer::start().await;

    // Exactly one auth exchange, regardless of how often the transition is
    // requested.
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": {
                "token": {"id": "tok-once"},
                "serviceCatalog": [
                    {
                        "type": "compute",
                        "name": "cloudServersOpenStack",
                        "endpoints": [
                            {"region": "DFW", "publicURL": format!("{}/v2", api_server.uri())}
                        ]
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&auth_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&api_server)
        .await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("2.0")
        .resolver(compute_resolver())
        .build()
        .unwrap();

    conn.ensure_authenticated().await.unwrap();
    conn.ensure_authenticated().await.unwrap();
    conn.get("/servers").await.unwrap();
    conn.get("/flavors").await.unwrap();

    let auth_hits = auth_server.received_requests().await.unwrap();
    assert_eq!(auth_hits.len(), 1);
}

#[tokio::test]
async fn test_v1_1_flow_resolves_by_name() {
    let auth_server = MockServer::start().await;
    let api_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1.1/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "auth": {
                "token": {"id": "tok-v11"},
                "serviceCatalog": {
                    "cloudServers": [
                        {"region": null, "publicURL": format!("{}/servers-api", api_server.uri())}
                    ]
                }
            }
        })))
        .mount(&auth_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers-api/limits"))
        .and(header("x-auth-token", "tok-v11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&api_server)
        .await;

    // 1.x family: the selector's name is the outer catalog key, type is
    // ignored, default version is 1.1.
    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .resolver(ServiceSelector::new().name("cloudServers"))
        .build()
        .unwrap();

    let response = conn.get("/limits").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_v1_0_flow_targets_header_synthesized_endpoint() {
    let auth_server = MockServer::start().await;
    let api_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("x-auth-token", "tok-v10")
                .insert_header(
                    "x-server-management-url",
                    format!("{}/v1.0/slug", api_server.uri()).as_str(),
                ),
        )
        .mount(&auth_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/slug/servers"))
        .and(header("x-auth-token", "tok-v10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&api_server)
        .await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("1.0")
        .resolver(ServiceSelector::new().name("cloudServers"))
        .build()
        .unwrap();

    let response = conn.get("/servers").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_force_base_url_bypasses_catalog_resolution() {
    let auth_server = MockServer::start().await;
    let api_server = MockServer::start().await;

    // Catalog points somewhere unreachable; the override must win.
    mount_v2_auth(&auth_server, "tok-forced", "https://unreachable.example").await;

    Mock::given(method("GET"))
        .and(path("/forced/servers"))
        .and(header("x-auth-token", "tok-forced"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&api_server)
        .await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("2.0_apikey")
        .force_base_url(format!("{}/forced", api_server.uri()))
        .build()
        .unwrap();

    let response = conn.get("/servers").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_reauthenticate_rebuilds_token_and_catalog() {
    let auth_server = MockServer::start().await;
    let api_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&api_server)
        .await;

    // First exchange yields tok-1, later exchanges tok-2.
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": {
                "token": {"id": "tok-1"},
                "serviceCatalog": [
                    {"type": "compute", "name": "cloudServersOpenStack",
                     "endpoints": [{"region": "DFW", "publicURL": format!("{}/v2", api_server.uri())}]}
                ]
            }
        })))
        .up_to_n_times(1)
        .mount(&auth_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": {
                "token": {"id": "tok-2"},
                "serviceCatalog": [
                    {"type": "compute", "name": "cloudServersOpenStack",
                     "endpoints": [{"region": "DFW", "publicURL": format!("{}/v2", api_server.uri())}]}
                ]
            }
        })))
        .mount(&auth_server)
        .await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("2.0_apikey")
        .resolver(compute_resolver())
        .build()
        .unwrap();

    assert_eq!(conn.auth_token().await.unwrap(), "tok-1");

    conn.reauthenticate().await.unwrap();
    assert_eq!(conn.auth_token().await.unwrap(), "tok-2");

    let auth_hits = auth_server.received_requests().await.unwrap();
    assert_eq!(auth_hits.len(), 2);
}

#[tokio::test]
async fn test_missing_auth_url_is_config_error() {
    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .resolver(compute_resolver())
        .build()
        .unwrap();

    let err = conn.ensure_authenticated().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_unresolvable_endpoint_is_config_error() {
    let auth_server = MockServer::start().await;
    mount_v2_auth(&auth_server, "tok", "https://api.example").await;

    // Selector asks for a region the catalog does not carry.
    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("2.0_apikey")
        .resolver(
            ServiceSelector::new()
                .service_type("compute")
                .name("cloudServersOpenStack")
                .region("SYD"),
        )
        .build()
        .unwrap();

    let err = conn.ensure_authenticated().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_auth_failure_leaves_connection_unauthenticated() {
    let auth_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/tokens/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&auth_server)
        .await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "wrong")
        .auth_url(auth_server.uri())
        .auth_version("2.0_apikey")
        .resolver(compute_resolver())
        .build()
        .unwrap();

    let err = conn.get("/servers").await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));

    // The failure is surfaced again on the next attempt, not cached away.
    let err = conn.auth_token().await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn test_service_catalog_accessor_allows_custom_lookup() {
    let auth_server = MockServer::start().await;
    mount_v2_auth(&auth_server, "tok", "https://api.example/v2").await;

    let conn = OpenStackConnection::builder()
        .credentials("joe", "s3cr3t")
        .auth_url(auth_server.uri())
        .auth_version("2.0_apikey")
        .resolver(compute_resolver())
        .build()
        .unwrap();

    let catalog = conn.service_catalog().await.unwrap();
    let ep = catalog
        .lookup(Some("compute"), Some("cloudServersOpenStack"), Some("DFW"))
        .unwrap();
    assert_eq!(ep.public_url.as_deref(), Some("https://api.example/v2"));
    assert!(catalog.lookup(Some("absent"), None, None).is_none());
}
