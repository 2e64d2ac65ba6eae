//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`nonce`] -- per-user action nonce checks for report requests.

pub mod jwt;
pub mod nonce;
