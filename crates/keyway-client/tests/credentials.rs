//! Credentials API tests against a mock credential directory.

use keyway_client::{DisconnectRequest, Error, KeywayClient};
use keyway_types::{CredentialDirectory, DirectoryError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> KeywayClient {
    KeywayClient::builder()
        .base_url(server.uri())
        .auth_token("test-token")
        .build()
        .unwrap()
}

#[tokio::test]
async fn list_sends_provider_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .and(query_param("provider", "google-sheets"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "credentials": [
                { "id": "b", "name": "work@example.com", "provider": "google-sheets", "isDefault": true },
                { "id": "a", "name": "me@example.com", "provider": "google-sheets" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let creds = client_for(&server)
        .credentials()
        .list("google-sheets")
        .await
        .unwrap();

    // Server order is preserved.
    assert_eq!(creds.len(), 2);
    assert_eq!(creds[0].id, "b");
    assert!(creds[0].is_default);
    assert_eq!(creds[1].id, "a");
    assert!(!creds[1].is_default);
}

#[tokio::test]
async fn list_empty_body_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "credentials": [] })))
        .mount(&server)
        .await;

    let creds = client_for(&server).credentials().list("slack").await.unwrap();
    assert!(creds.is_empty());
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Unauthorized" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .credentials()
        .list("github-repo")
        .await
        .unwrap_err();
    assert!(err.is_auth_error());
    assert!(matches!(err, Error::Auth(ref m) if m == "Unauthorized"));
}

#[tokio::test]
async fn server_error_without_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .credentials()
        .list("notion")
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert!(matches!(err, Error::Api { status: 502, .. }));
}

#[tokio::test]
async fn directory_trait_maps_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .and(query_param("provider", "x"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "internal",
            "message": "database offline"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .and(query_param("provider", "linear"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.list_credentials("x").await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::Status { status: 500, ref message } if message == "database offline"
    ));

    let err = client.list_credentials("linear").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_directory() {
    // Nothing listens on the discard port.
    let client = KeywayClient::builder()
        .base_url("http://127.0.0.1:9")
        .build()
        .unwrap();

    let err = client.list_credentials("google-drive").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Unreachable(_)));
}

#[tokio::test]
async fn disconnect_posts_camel_case_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/oauth/disconnect"))
        .and(body_json(json!({ "provider": "google", "providerId": "google-drive" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .credentials()
        .disconnect(DisconnectRequest {
            provider: "google".to_string(),
            provider_id: Some("google-drive".to_string()),
        })
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn custom_user_agent_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/oauth/credentials"))
        .and(header("user-agent", "flow-studio/2.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "credentials": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = KeywayClient::builder()
        .base_url(server.uri())
        .user_agent("flow-studio/2.1")
        .build()
        .unwrap();
    assert!(client.credentials().list("slack").await.unwrap().is_empty());
}
