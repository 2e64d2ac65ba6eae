//! Row structs returned by the repositories.
//!
//! Report rows convert into the plain `charitable_core` input types, so the
//! aggregation code never sees `sqlx`.

pub mod option;
pub mod report;
pub mod role;
pub mod transient;
