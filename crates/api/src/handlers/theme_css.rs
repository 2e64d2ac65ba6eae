//! Campaign theme stylesheets.

use axum::extract::{Path, Query};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use charitable_core::theme_css::{self, Theme, ThemeParams};

use crate::error::{AppError, AppResult};

/// GET /css/themes/{theme}.css?p=&s=&t=&b=&mw=
///
/// Public: the stylesheet is linked from campaign pages.
pub async fn stylesheet(
    Path(file): Path<String>,
    Query(params): Query<ThemeParams>,
) -> AppResult<Response> {
    let theme = Theme::from_slug(&file)
        .ok_or_else(|| AppError::NotFound(format!("Unknown theme '{file}'")))?;
    let css = theme_css::render(theme, &params);
    Ok(([(CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response())
}
