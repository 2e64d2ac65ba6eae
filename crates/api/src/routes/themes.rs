//! Public theme stylesheet routes, mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::theme_css;
use crate::state::AppState;

/// GET /css/themes/{file}  -> stylesheet (`{file}` is `<theme>.css`)
pub fn router() -> Router<AppState> {
    Router::new().route("/css/themes/{file}", get(theme_css::stylesheet))
}
