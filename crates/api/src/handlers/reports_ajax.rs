//! Admin AJAX endpoint for the reports screens.
//!
//! The admin UI posts form-encoded fields with an `action` naming the
//! report to refresh. Every action requires `manage_options` and a
//! `charitable-reporting` nonce, stores the resolved args for its tab, and
//! replies `{ "success": true, "data": ... }`.

use axum::extract::{Path, State};
use axum::{Form, Json};
use charitable_core::cache::ArgsKind;
use charitable_core::nonce::{NONCE_ACTION_EXPORT, NONCE_ACTION_REPORTING};
use charitable_core::render;
use charitable_core::report_args::{ReportArgs, ReportInput, ReportType};
use charitable_core::reports::ComparisonWindows;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::nonce;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireManageOptions;
use crate::reporting;
use crate::response::AjaxResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AjaxAction {
    OverviewData,
    ActivityData,
    DonorData,
    DonorDataPagination,
    DashboardData,
    AdvancedUi,
    AdvancedData,
}

impl AjaxAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim() {
            "charitable_report_overview_data" => Some(Self::OverviewData),
            "charitable_report_activity_data" => Some(Self::ActivityData),
            "charitable_report_donor_data" => Some(Self::DonorData),
            "charitable_report_donor_data_pagination" => Some(Self::DonorDataPagination),
            "charitable_report_dashboard_data" => Some(Self::DashboardData),
            "charitable_report_advanced_ui" => Some(Self::AdvancedUi),
            "charitable_report_advanced_data" => Some(Self::AdvancedData),
            _ => None,
        }
    }

    pub fn default_report_type(self) -> ReportType {
        match self {
            Self::OverviewData => ReportType::Overview,
            Self::ActivityData => ReportType::Activity,
            Self::DonorData | Self::DonorDataPagination => ReportType::DonorsTop,
            Self::DashboardData => ReportType::Dashboard,
            Self::AdvancedUi | Self::AdvancedData => ReportType::Lybunt,
        }
    }

    pub fn args_kind(self) -> ArgsKind {
        ArgsKind::for_report(self.default_report_type())
    }

    pub fn resolve_args(self, input: &ReportInput, today: NaiveDate, per_page: u32) -> ReportArgs {
        ReportArgs::for_tab(input, self.default_report_type(), today, per_page)
    }
}

/// Form body of `POST /ajax`.
#[derive(Debug, Deserialize)]
pub struct AjaxForm {
    #[serde(default)]
    pub action: String,
    pub nonce: Option<String>,
    #[serde(flatten)]
    pub input: ReportInput,
}

/// POST /api/v1/ajax
pub async fn dispatch(
    RequireManageOptions(user): RequireManageOptions,
    State(state): State<AppState>,
    Form(form): Form<AjaxForm>,
) -> AppResult<Json<AjaxResponse<Value>>> {
    let action = AjaxAction::parse(&form.action)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown action '{}'", form.action)))?;
    nonce::check(&state, &user, form.nonce.as_deref(), NONCE_ACTION_REPORTING)?;

    let today = Utc::now().date_naive();
    let args = action.resolve_args(&form.input, today, state.config.reports_per_page);
    let cache = state.report_cache();
    cache.save_args(action.args_kind(), &args).await;

    let data = match action {
        AjaxAction::AdvancedUi => {
            let windows = ComparisonWindows::for_args(&args, today);
            json!({
                "report_type": args.report_type,
                "windows": windows,
                "html": render::advanced_report_ui(args.report_type, &windows),
            })
        }
        _ => {
            cache
                .maybe_cache_report(&args, || compute(&state, action, &args, today))
                .await?
        }
    };

    tracing::debug!(
        user_id = user.user_id,
        action = ?action,
        report_type = %args.report_type,
        start = %args.range.start,
        end = %args.range.end,
        "Report data served",
    );

    Ok(Json(AjaxResponse::ok(data)))
}

async fn compute(
    state: &AppState,
    action: AjaxAction,
    args: &ReportArgs,
    today: NaiveDate,
) -> AppResult<Value> {
    let pool = &state.pool;
    let format = reporting::currency_format(pool).await?;
    let value = match action {
        AjaxAction::OverviewData => {
            serde_json::to_value(reporting::overview(pool, args, &format).await?)
        }
        AjaxAction::ActivityData => {
            serde_json::to_value(reporting::activity(pool, args, &format).await?)
        }
        AjaxAction::DonorData | AjaxAction::DonorDataPagination => {
            let threshold = state.config.pagination_dot_threshold;
            serde_json::to_value(reporting::donors(pool, args, &format, threshold).await?)
        }
        AjaxAction::DashboardData => {
            serde_json::to_value(reporting::dashboard(pool, args, &format).await?)
        }
        AjaxAction::AdvancedUi | AjaxAction::AdvancedData => {
            serde_json::to_value(reporting::advanced(pool, args, &format, today).await?)
        }
    };
    value.map_err(|e| AppError::InternalError(format!("Failed to serialize report: {e}")))
}

#[derive(Debug, Serialize)]
pub struct ReportNonces {
    pub reporting: String,
    pub export: String,
}

/// GET /api/v1/reports/nonce
///
/// Fresh nonces for the AJAX and export actions, bound to the caller.
pub async fn nonces(
    RequireManageOptions(user): RequireManageOptions,
    State(state): State<AppState>,
) -> AppResult<Json<AjaxResponse<ReportNonces>>> {
    Ok(Json(AjaxResponse::ok(ReportNonces {
        reporting: nonce::issue(&state, &user, NONCE_ACTION_REPORTING)?,
        export: nonce::issue(&state, &user, NONCE_ACTION_EXPORT)?,
    })))
}

/// GET /api/v1/reports/args/{kind}
///
/// The args a report tab was last rendered with, or `null`.
pub async fn cached_args(
    RequireManageOptions(_user): RequireManageOptions,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<AjaxResponse<Option<ReportArgs>>>> {
    let kind = ArgsKind::parse(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown report tab '{kind}'")))?;
    let args = state.report_cache().load_args(kind).await;
    Ok(Json(AjaxResponse::ok(args)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn input(report_type: &str) -> ReportInput {
        ReportInput {
            report_type: Some(report_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn every_action_name_parses() {
        for name in [
            "charitable_report_overview_data",
            "charitable_report_activity_data",
            "charitable_report_donor_data",
            "charitable_report_donor_data_pagination",
            "charitable_report_dashboard_data",
            "charitable_report_advanced_ui",
            "charitable_report_advanced_data",
        ] {
            assert!(AjaxAction::parse(name).is_some(), "{name}");
        }
        assert_eq!(AjaxAction::parse("charitable_report_bogus"), None);
    }

    #[test]
    fn donor_action_keeps_donor_types_only() {
        let args = AjaxAction::DonorData.resolve_args(&input("donors-recurring"), today(), 10);
        assert_eq!(args.report_type, ReportType::DonorsRecurring);

        let args = AjaxAction::DonorData.resolve_args(&input("lybunt"), today(), 10);
        assert_eq!(args.report_type, ReportType::DonorsTop);
    }

    #[test]
    fn advanced_action_accepts_sybunt() {
        let args = AjaxAction::AdvancedData.resolve_args(&input("sybunt"), today(), 10);
        assert_eq!(args.report_type, ReportType::Sybunt);
        assert_eq!(AjaxAction::AdvancedData.args_kind(), ArgsKind::Advanced);
    }

    #[test]
    fn overview_ignores_submitted_type() {
        let args = AjaxAction::OverviewData.resolve_args(&input("donors-top"), today(), 10);
        assert_eq!(args.report_type, ReportType::Overview);
        assert_eq!(AjaxAction::DashboardData.args_kind(), ArgsKind::Dashboard);
    }
}
