//! Request nonces for the admin reporting actions.
//!
//! A nonce is the first 10 hex chars of `HMAC-SHA256(secret, tick|action|user)`
//! where `tick` advances every half nonce lifetime. A nonce stays valid for
//! the tick it was minted in and the one after it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Action guarding the AJAX report refreshes.
pub const NONCE_ACTION_REPORTING: &str = "charitable-reporting";

/// Action guarding CSV and print exports.
pub const NONCE_ACTION_EXPORT: &str = "charitable_export_report";

/// Full validity window of a nonce, in seconds.
pub const NONCE_LIFETIME_SECS: i64 = 24 * 60 * 60;

const NONCE_LEN: usize = 10;

type HmacSha256 = Hmac<Sha256>;

/// Result of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAge {
    /// Minted in the current tick.
    Fresh,
    /// Minted in the previous tick.
    Aging,
}

/// Encode bytes as a lowercase hex string.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn tick(now: Timestamp) -> i64 {
    let half = NONCE_LIFETIME_SECS / 2;
    // ceil for non-negative timestamps
    (now.timestamp() + half - 1).div_euclid(half)
}

fn nonce_for_tick(
    secret: &str,
    action: &str,
    user_id: &str,
    tick: i64,
) -> Result<String, CoreError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Internal(format!("nonce key: {e}")))?;
    mac.update(format!("{tick}|{action}|{user_id}").as_bytes());
    let digest = hex_encode(mac.finalize().into_bytes());
    Ok(digest[..NONCE_LEN].to_string())
}

pub fn create_nonce(
    secret: &str,
    action: &str,
    user_id: &str,
    now: Timestamp,
) -> Result<String, CoreError> {
    nonce_for_tick(secret, action, user_id, tick(now))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check `nonce` for `action` and `user_id`. Returns `None` when invalid.
pub fn verify_nonce(
    secret: &str,
    nonce: &str,
    action: &str,
    user_id: &str,
    now: Timestamp,
) -> Option<NonceAge> {
    let nonce = nonce.trim();
    if nonce.len() != NONCE_LEN {
        return None;
    }
    let current = tick(now);
    for (t, age) in [(current, NonceAge::Fresh), (current - 1, NonceAge::Aging)] {
        match nonce_for_tick(secret, action, user_id, t) {
            Ok(expected) if constant_time_eq(expected.as_bytes(), nonce.as_bytes()) => {
                return Some(age);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Nonce verification failed");
                return None;
            }
        }
    }
    None
}
