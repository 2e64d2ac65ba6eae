pub mod reports_ajax;
pub mod reports_download;
pub mod theme_css;
