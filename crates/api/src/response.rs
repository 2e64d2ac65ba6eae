//! Response envelope for the admin AJAX endpoints.
//!
//! Successful replies use `{ "success": true, "data": ... }`; failures are
//! produced by [`crate::error::AppError`] with `success: false`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AjaxResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> AjaxResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
