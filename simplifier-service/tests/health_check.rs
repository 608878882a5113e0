//! Health, readiness and metrics endpoints.

mod common;

use common::{test_config, TestApp};
use simplifier_service::config::ProviderKind;
use simplifier_service::services::providers::mock::MockTextProvider;
use std::sync::Arc;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn_with_provider(Arc::new(MockTextProvider::new(true))).await;

    let response = app
        .client
        .get(format!("{}/health", app.http_address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "simplifier-service");
}

#[tokio::test]
async fn readiness_check_works_with_enabled_provider() {
    let app = TestApp::spawn_with_provider(Arc::new(MockTextProvider::new(true))).await;

    let response = app
        .client
        .get(format!("{}/ready", app.http_address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["model"], "mock");
}

#[tokio::test]
async fn readiness_fails_without_gemini_key() {
    let app = TestApp::spawn_with_config(test_config(ProviderKind::Gemini, "")).await;

    let response = app
        .client
        .get(format!("{}/ready", app.http_address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Service unavailable");
}

#[tokio::test]
async fn metrics_are_exposed_after_a_request() {
    let app = TestApp::spawn_with_provider(Arc::new(MockTextProvider::with_reply("ok"))).await;

    app.post_simplify(r#"{"text": "count me"}"#).await;

    let text = app
        .client
        .get(format!("{}/metrics", app.http_address))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .expect("Failed to read body");

    assert!(text.contains("simplify_requests_total"));
    assert!(text.contains("provider_request_duration_seconds"));
}
