//! Nonce checks bound to the authenticated user.

use charitable_core::nonce::{create_nonce, verify_nonce, NonceAge};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Mint a nonce for `action` and the calling user.
pub fn issue(state: &AppState, user: &AuthUser, action: &str) -> AppResult<String> {
    Ok(create_nonce(
        &state.config.nonce_secret,
        action,
        &user.user_id.to_string(),
        Utc::now(),
    )?)
}

/// Reject with [`AppError::InvalidNonce`] unless `nonce` was minted for
/// `action` and this user within its lifetime.
pub fn check(
    state: &AppState,
    user: &AuthUser,
    nonce: Option<&str>,
    action: &str,
) -> AppResult<NonceAge> {
    let nonce = nonce.filter(|n| !n.trim().is_empty()).ok_or(AppError::InvalidNonce)?;
    match verify_nonce(
        &state.config.nonce_secret,
        nonce,
        action,
        &user.user_id.to_string(),
        Utc::now(),
    ) {
        Some(age) => Ok(age),
        None => {
            tracing::warn!(user_id = user.user_id, action, "Rejected request with invalid nonce");
            Err(AppError::InvalidNonce)
        }
    }
}
