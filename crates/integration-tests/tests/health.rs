//! Integration tests for the health endpoints.

use axum::http::StatusCode;

use gem_shop_integration_tests::TestApp;

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new();
    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_readiness_follows_store() {
    let app = TestApp::new();
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);

    app.store.set_offline(true);
    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/api/orders").await.status, StatusCode::NOT_FOUND);
}
