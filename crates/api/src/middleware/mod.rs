//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireManageOptions`] -- Requires the `manage_options` capability.

pub mod auth;
pub mod rbac;
