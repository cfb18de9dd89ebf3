#![allow(clippy::unwrap_used)]
// Integration tests for `EntityService` against a wiremock backend.

use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gridline_core::{
    AuthSettings, CoreError, DynamicService, Entity, EntityEndpoints, FieldMapCodec, FieldValue,
    Language, ServiceConfig, TlsVerification,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn service_config(server: &MockServer, language: Language) -> ServiceConfig {
    ServiceConfig {
        base_url: Url::parse(&format!("{}/api", server.uri())).unwrap(),
        auth: AuthSettings::Static(SecretString::from("tok")),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
        language,
    }
}

fn codec() -> FieldMapCodec {
    let mut map = IndexMap::new();
    map.insert("id".to_owned(), "Id".to_owned());
    map.insert("nameVi".to_owned(), "NameVi".to_owned());
    FieldMapCodec::new(map)
}

async fn setup_with(language: Language) -> (MockServer, DynamicService) {
    let server = MockServer::start().await;
    let conn = service_config(&server, language).connect().unwrap();
    let service = DynamicService::new(
        "customer",
        &conn,
        EntityEndpoints::conventional("customer"),
        codec(),
    );
    (server, service)
}

async fn setup() -> (MockServer, DynamicService) {
    setup_with(Language::En).await
}

// ── list ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_decodes_records_through_codec() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "Id": 1, "NameVi": "An" }, { "Id": 2, "NameVi": "Bình", "parentId": 1 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = service.list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[1].get("nameVi"), Some(&FieldValue::from("Bình")));
    assert_eq!(records[1].get("parentId"), Some(&FieldValue::Number(1.0)));
}

#[tokio::test]
async fn test_list_without_result_is_empty() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_http_error_raises_list_failed() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = service.list().await.unwrap_err();
    assert!(matches!(err, CoreError::ListFailed { ref entity, .. } if entity == "customer"));
}

#[tokio::test]
async fn test_list_rejected_record_fails_whole_list() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "Id": 1 }, { "NameVi": "no id" }]
        })))
        .mount(&server)
        .await;

    assert!(matches!(service.list().await, Err(CoreError::ListFailed { .. })));
}

// ── create / update / delete ────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_wire_body_and_reports_success() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/customer/add"))
        .and(body_json(json!({ "NameVi": "Lan" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Created",
            "result": { "Id": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = service.create(&Entity::new("").with("nameVi", "Lan")).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Created");
    assert_eq!(outcome.data, Some(json!({ "Id": 3 })));
}

#[tokio::test]
async fn test_success_without_message_uses_localized_default() {
    let (server, service) = setup_with(Language::Vi).await;

    Mock::given(method("POST"))
        .and(path("/api/customer/update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .mount(&server)
        .await;

    let outcome = service.update(&Entity::new("1").with("nameVi", "An")).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, Language::Vi.success(gridline_core::Operation::Update));
}

#[tokio::test]
async fn test_rejected_write_prefers_messages_array() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/customer/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "messages": ["Code already exists"],
            "message": "generic"
        })))
        .mount(&server)
        .await;

    let outcome = service.create(&Entity::new("").with("nameVi", "An")).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Code already exists");
    assert!(outcome.data.is_none());
}

#[tokio::test]
async fn test_transport_failure_becomes_failed_outcome() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/customer/delete"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let outcome = service.delete("4").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Failed to delete record");
}

#[tokio::test]
async fn test_update_without_id_fails_without_request() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = service.update(&Entity::new("").with("nameVi", "An")).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, Language::En.missing_id());
}

#[tokio::test]
async fn test_delete_sends_identity_stub() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/customer/delete"))
        .and(body_json(json!({ "Id": "9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = service.delete("9").await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Deleted successfully");
}

#[tokio::test]
async fn test_login_auth_falls_back_and_still_sends_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/customer/getAll"))
        .and(header("Authorization", "Bearer fallback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = service_config(&server, Language::En);
    cfg.auth = AuthSettings::Login {
        login_url: Url::parse(&format!("{}/auth/login", server.uri())).unwrap(),
        credentials: gridline_api::Credentials {
            username: "admin".into(),
            password: SecretString::from("pw"),
            company_id: "C01".into(),
            language: "en".into(),
        },
        fallback_token: SecretString::from("fallback"),
    };
    let conn = cfg.connect().unwrap();
    let service = DynamicService::new("customer", &conn, EntityEndpoints::conventional("customer"), codec());

    assert!(service.list().await.unwrap().is_empty());
}
