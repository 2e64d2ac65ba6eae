//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod option_repo;
pub mod report_repo;
pub mod role_repo;
pub mod transient_repo;

pub use option_repo::OptionRepo;
pub use report_repo::{ReportFilter, ReportRepo};
pub use role_repo::RoleRepo;
pub use transient_repo::TransientRepo;
