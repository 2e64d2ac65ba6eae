//! Theme stylesheet endpoint.

mod common;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use common::{body_json, body_text, get, offline_app};

#[tokio::test]
async fn club_theme_uses_supplied_colours() {
    let response = get(
        offline_app(),
        "/css/themes/club-organization-colors.css?p=FF0000&s=00FF00&mw=640",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/css"));

    let css = body_text(response).await;
    assert!(css.contains("background-color: #FF0000;"));
    assert!(css.contains("color: #00FF00;"));
    assert!(css.contains("max-width: 640px"));
}

#[tokio::test]
async fn markup_in_colours_is_stripped() {
    let response = get(
        offline_app(),
        "/css/themes/club-organization-colors.css?p=%3Cscript%3E",
        None,
    )
    .await;
    let css = body_text(response).await;
    assert!(css.contains("#script"));
    assert!(!css.contains('<'));
}

#[tokio::test]
async fn missing_params_fall_back_to_defaults() {
    let response = get(offline_app(), "/css/themes/club-organization-colors.css", None).await;
    let css = body_text(response).await;
    assert!(css.contains("#1D3444"));
    assert!(css.contains("max-width: 800px"));
}

#[tokio::test]
async fn unknown_theme_is_404() {
    let response = get(offline_app(), "/css/themes/space-pirates.css", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
}
