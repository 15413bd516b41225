//! # Integration Tests for oab-api
//!
//! Health probes, the configuration endpoint, the UI page, structured 404s
//! and snapshot replacement on rebuild.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use oab_api::state::{AppConfig, AppState, DocsSource};
use oab_schema::ConverterRegistry;

fn registry() -> Arc<ConverterRegistry> {
    Arc::new(ConverterRegistry::with_defaults().unwrap())
}

/// Helper: state documenting the demo application.
fn demo_state(config: AppConfig) -> AppState {
    AppState::build(config, registry(), oab_api::demo::source()).unwrap()
}

fn test_app() -> axum::Router {
    oab_api::app(demo_state(AppConfig::default()))
}

async fn get(app: axum::Router, uri: &str) -> axum::http::Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = get(test_app(), "/health/liveness").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = get(test_app(), "/health/readiness").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Configuration Endpoint ---------------------------------------------------

#[tokio::test]
async fn test_configuration_returns_document() {
    let response = get(test_app(), "/docs/configuration").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;

    assert_eq!(doc["openapi"], "3.0.3");
    let user = &doc["components"]["schemas"]["User"];
    assert_eq!(user["type"], "object");
    assert_eq!(user["properties"]["email"]["format"], "email");
    assert_eq!(user["properties"]["homepage"]["format"], "URL");
    assert_eq!(
        user["properties"]["friends"]["items"]["$ref"],
        "#/components/schemas/User"
    );
    assert_eq!(
        user["properties"]["address"]["$ref"],
        "#/components/schemas/Address"
    );
    assert_eq!(
        doc["paths"]["/users"]["get"]["parameters"][0]["in"],
        "query"
    );
    assert_eq!(
        doc["paths"]["/users/{user_id}"]["get"]["parameters"][0]["name"],
        "user_id"
    );
}

#[tokio::test]
async fn test_configuration_is_idempotent() {
    let app = test_app();
    let first = body_string(get(app.clone(), "/docs/configuration").await).await;
    let second = body_string(get(app, "/docs/configuration").await).await;
    assert_eq!(first, second);
}

// -- UI Page ------------------------------------------------------------------

#[tokio::test]
async fn test_page_embeds_configuration_url() {
    for uri in ["/docs/", "/docs"] {
        let response = get(test_app(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let page = body_string(response).await;
        assert!(page.contains(r#""url":"/docs/configuration""#));
        assert!(page.contains(r##""dom_id":"#openapi-ui""##));
        assert!(page.contains(r#""deepLinking":true"#));
    }
}

#[tokio::test]
async fn test_page_title_is_escaped_text() {
    let config = AppConfig {
        title: "{{ config_json }} <Shop>".to_string(),
        ..AppConfig::default()
    };
    let page = body_string(get(oab_api::app(demo_state(config)), "/docs/").await).await;
    assert!(page.contains("<title>{{ config_json }} &lt;Shop&gt;</title>"));
    assert_eq!(page.matches(r#""deepLinking""#).count(), 1);
}

#[tokio::test]
async fn test_custom_mount_point() {
    let config = AppConfig {
        docs_path: "/api/docs".to_string(),
        app_name: "Shop docs".to_string(),
        ..AppConfig::default()
    };
    let app = oab_api::app(demo_state(config));

    let response = get(app.clone(), "/api/docs/configuration").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(get(app.clone(), "/api/docs/").await).await;
    assert!(page.contains(r#""url":"/api/docs/configuration""#));
    assert!(page.contains(r#""app_name":"Shop docs""#));

    let response = get(app, "/docs/configuration").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Errors -------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_path_is_structured_404() {
    let response = get(test_app(), "/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"].as_str().unwrap().contains("/nowhere"));
}

// -- Rebuild ------------------------------------------------------------------

#[tokio::test]
async fn test_rebuild_replaces_snapshot_only_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.yaml");
    std::fs::write(
        &path,
        "info: {title: Before, version: '1'}\nschemas:\n  A:\n    fields:\n      x: string\n",
    )
    .unwrap();

    let state = AppState::build(
        AppConfig::default(),
        registry(),
        DocsSource::Manifest(path.clone()),
    )
    .unwrap();
    let app = oab_api::app(state.clone());

    std::fs::write(
        &path,
        "info: {title: After, version: '2'}\nschemas:\n  B:\n    fields:\n      y: integer\n",
    )
    .unwrap();

    let doc = body_json(get(app.clone(), "/docs/configuration").await).await;
    assert_eq!(doc["info"]["title"], "Before");
    assert!(doc["components"]["schemas"].get("A").is_some());

    state.rebuild().unwrap();

    let doc = body_json(get(app, "/docs/configuration").await).await;
    assert_eq!(doc["info"]["title"], "After");
    assert!(doc["components"]["schemas"].get("A").is_none());
    assert_eq!(doc["components"]["schemas"]["B"]["properties"]["y"]["type"], "integer");
}

#[tokio::test]
async fn test_invalid_manifest_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.yaml");
    std::fs::write(
        &path,
        "info: {title: t, version: v}\nschemas:\n  A:\n    fields:\n      x: colour\n",
    )
    .unwrap();

    let result = AppState::build(AppConfig::default(), registry(), DocsSource::Manifest(path));
    assert!(result.is_err());
}
