//! Health endpoints and request ids.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use lustre_integration_tests::TestApp;

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let response = app.get(&client, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = app.get(&client, "/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let response = client
        .get(app.url("/health"))
        .header("x-request-id", "trace-abc_123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-abc_123");

    let response = app.get(&client, "/health").await;
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}
