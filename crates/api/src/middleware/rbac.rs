//! Capability-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use charitable_core::error::CoreError;
use charitable_core::roles::{has_capability, CAP_MANAGE_OPTIONS};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role carrying `manage_options`. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn report(RequireManageOptions(user): RequireManageOptions) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireManageOptions(pub AuthUser);

impl FromRequestParts<AppState> for RequireManageOptions {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_capability(&user.role, CAP_MANAGE_OPTIONS) {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Missing manage_options");
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not have permission to view reports".into(),
            )));
        }
        Ok(RequireManageOptions(user))
    }
}
