//! CSV and print exports of the report tables.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Form;
use charitable_core::export::{self, ExportFormat, ExportKind};
use charitable_core::nonce::NONCE_ACTION_EXPORT;
use charitable_core::render;
use charitable_core::report_args::{ReportArgs, ReportInput};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::nonce;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireManageOptions;
use crate::reporting;
use crate::state::AppState;

/// Form body of `POST /reports/download`.
#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub charitable_report_action: String,
    pub charitable_export_report_nonce: Option<String>,
    pub format: Option<String>,
    #[serde(flatten)]
    pub input: ReportInput,
}

/// POST /api/v1/reports/download
///
/// Streams a CSV attachment, or a printable HTML page when `format=print`.
pub async fn download(
    RequireManageOptions(user): RequireManageOptions,
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> AppResult<Response> {
    let kind = ExportKind::from_action(&form.charitable_report_action).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown export '{}'",
            form.charitable_report_action
        ))
    })?;
    nonce::check(
        &state,
        &user,
        form.charitable_export_report_nonce.as_deref(),
        NONCE_ACTION_EXPORT,
    )?;

    let today = Utc::now().date_naive();
    let args = ReportArgs::for_tab(
        &form.input,
        kind.default_report_type(),
        today,
        state.config.reports_per_page,
    );
    let format = reporting::currency_format(&state.pool).await?;
    let rows = reporting::export_rows(&state.pool, kind, &args, &format, today).await?;

    let output = ExportFormat::parse_or_default(form.format.as_deref());
    tracing::info!(
        user_id = user.user_id,
        export = kind.slug(),
        format = ?output,
        rows = rows.len(),
        "Report exported",
    );

    match output {
        ExportFormat::Csv => {
            let body = export::write_csv(kind.columns(), &rows)?;
            let filename = kind.filename(&args.range, "csv");
            Ok((
                [
                    (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
        ExportFormat::Print => {
            let html = render::print_document(kind.title(), &args.range, kind.columns(), &rows);
            Ok(([(CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response())
        }
    }
}
