//! Health check and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, offline_app};

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let response = get(offline_app(), "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
    assert_eq!(json["missing_tables"], serde_json::json!([]));
    assert_eq!(json["report_caching"], false, "debug config disables caching");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(offline_app(), "/this-route-does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let response = get(offline_app(), "/css/themes/education.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap();
    assert_eq!(request_id.len(), 36);
}
