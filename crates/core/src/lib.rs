//! Domain logic for the Charitable reporting backend.
//!
//! Everything here is free of I/O apart from the [`cache::TransientStore`]
//! seam; the `charitable-db` crate supplies rows and the `charitable-api`
//! crate wires requests to these functions.

pub mod activity;
pub mod axis;
pub mod cache;
pub mod donors;
pub mod error;
pub mod export;
pub mod money;
pub mod nonce;
pub mod pagination;
pub mod render;
pub mod report_args;
pub mod reports;
pub mod roles;
pub mod settings;
pub mod status;
pub mod theme_css;
pub mod types;
