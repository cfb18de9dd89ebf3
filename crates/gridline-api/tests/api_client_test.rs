#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` and `AuthClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gridline_api::{ApiClient, AuthClient, Credentials, Error, TokenSource};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

fn credentials() -> Credentials {
    Credentials {
        username: "admin".into(),
        password: token("secret"),
        company_id: "C01".into(),
        language: "vi".into(),
    }
}

// ── List tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_list_sends_bearer_and_unwraps_result() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "Id": "1", "NameVi": "An" }, { "Id": "2", "NameVi": "Bình" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.endpoint_url("/customer/getAll").unwrap();
    let records = client.get_list(url, &token("tok-1")).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["NameVi"], "Bình");
}

#[tokio::test]
async fn test_get_list_without_result_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let url = client.endpoint_url("customer/getAll").unwrap();
    let records = client.get_list(url, &token("t")).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_get_list_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let url = client.endpoint_url("customer/getAll").unwrap();
    let err = client.get_list(url, &token("t")).await.unwrap_err();
    assert!(err.is_transient());

    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_list_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let url = client.endpoint_url("customer/getAll").unwrap();
    let result = client.get_list(url, &token("t")).await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Write tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_write_decodes_reply() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/customer/add"))
        .and(header("Authorization", "Bearer tok-2"))
        .and(body_json(json!({ "NameVi": "Chi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "messages": ["Created"],
            "result": { "Id": "9" }
        })))
        .mount(&server)
        .await;

    let url = client.endpoint_url("customer/add").unwrap();
    let reply = client
        .post_write(url, &token("tok-2"), &json!({ "NameVi": "Chi" }))
        .await
        .unwrap();

    assert!(reply.is_success());
    assert_eq!(reply.server_message().as_deref(), Some("Created"));
    assert_eq!(reply.result.unwrap()["Id"], "9");
}

// ── Auth tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_posts_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "username": "admin",
            "password": "secret",
            "companyID": "C01",
            "language": "vi"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": "issued" })))
        .mount(&server)
        .await;

    let login_url = Url::parse(&format!("{}/auth/login", server.uri())).unwrap();
    let auth = AuthClient::with_client(
        reqwest::Client::new(),
        login_url,
        credentials(),
        token("fallback"),
    );

    let issued = auth.login().await.unwrap();
    assert_eq!(issued.expose_secret(), "issued");
}

#[tokio::test]
async fn test_token_falls_back_on_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;

    let login_url = Url::parse(&format!("{}/auth/login", server.uri())).unwrap();
    let auth = AuthClient::with_client(
        reqwest::Client::new(),
        login_url,
        credentials(),
        token("fallback"),
    );

    assert!(matches!(
        auth.login().await,
        Err(Error::Authentication { .. })
    ));

    let source = TokenSource::Login(auth);
    assert_eq!(source.token().await.expose_secret(), "fallback");
}

#[tokio::test]
async fn test_token_falls_back_on_missing_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": "admin" })))
        .mount(&server)
        .await;

    let login_url = Url::parse(&format!("{}/auth/login", server.uri())).unwrap();
    let source = TokenSource::Login(AuthClient::with_client(
        reqwest::Client::new(),
        login_url,
        credentials(),
        token("fallback"),
    ));

    assert_eq!(source.token().await.expose_secret(), "fallback");
}

#[tokio::test]
async fn test_static_token_source() {
    let source = TokenSource::Static(token("fixed"));
    assert_eq!(source.token().await.expose_secret(), "fixed");
}
