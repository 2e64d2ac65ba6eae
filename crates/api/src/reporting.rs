//! Report assembly shared by the AJAX and download handlers.
//!
//! Each builder fetches rows through [`ReportRepo`], runs the pure
//! aggregation in `charitable_core`, and returns a serializable payload.

use std::collections::HashSet;

use charitable_core::activity::ActivityItem;
use charitable_core::axis::ChartAxis;
use charitable_core::donors::{DonorPage, DonorSummary};
use charitable_core::export::{self, ExportKind};
use charitable_core::money::CurrencyFormat;
use charitable_core::render;
use charitable_core::report_args::{DonorSegment, ReportArgs, ReportType};
use charitable_core::reports::{
    self, ComparisonWindows, DayBucket, DonationRecord, DonorAmount, DonorWindowAggregate,
    GatewayTotal, HeadlineTotals, LybuntOptions, LybuntReport, LybuntSortField,
    PaymentBreakdown, RefundRecord, RefundSummary, TopDonor,
};
use charitable_core::settings::{CharitableSettings, SETTINGS_OPTION};
use charitable_core::types::DbId;
use charitable_db::repositories::{OptionRepo, ReportFilter, ReportRepo};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

/// Donors listed on the overview and dashboard top-donor widgets.
pub const TOP_DONORS_LIMIT: usize = 5;

/// Activity entries shown on the dashboard.
pub const DASHBOARD_ACTIVITY_LIMIT: i64 = 10;

/// Currency format from the stored settings, defaults when unset.
pub async fn currency_format(pool: &PgPool) -> Result<CurrencyFormat, sqlx::Error> {
    let stored = OptionRepo::get(pool, SETTINGS_OPTION).await?;
    Ok(CharitableSettings::from_value(stored).currency_format())
}

// ---------------------------------------------------------------------------
// Shared fetches
// ---------------------------------------------------------------------------

struct Breakdown {
    donations: Vec<DonationRecord>,
    days: Vec<DayBucket>,
    refunds: RefundSummary,
}

async fn breakdown(
    pool: &PgPool,
    args: &ReportArgs,
    format: Option<&CurrencyFormat>,
) -> Result<Breakdown, sqlx::Error> {
    let filter = ReportFilter::from_args(args);
    let donations: Vec<DonationRecord> = ReportRepo::donations_in_range(pool, &filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let refund_rows: Vec<RefundRecord> = ReportRepo::refund_rows(pool, &filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Breakdown {
        days: reports::donations_by_day(&args.range, &donations, format),
        refunds: reports::summarize_refunds(&refund_rows),
        donations,
    })
}

async fn fetch_top_donors(pool: &PgPool, args: &ReportArgs) -> Result<Vec<TopDonor>, sqlx::Error> {
    let filter = ReportFilter::from_args(args);
    let rows: Vec<DonorAmount> = ReportRepo::top_donor_rows(pool, &filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(reports::top_donors_overview(&rows, TOP_DONORS_LIMIT))
}

async fn activity_items(
    pool: &PgPool,
    args: &ReportArgs,
    limit: i64,
    format: &CurrencyFormat,
) -> Result<Vec<ActivityItem>, sqlx::Error> {
    let records = ReportRepo::activities(pool, &args.range, args.campaign_id, limit).await?;
    Ok(records
        .into_iter()
        .map(|r| ActivityItem::from_record(r, format))
        .collect())
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OverviewReport {
    pub headline: HeadlineTotals,
    pub days: Vec<DayBucket>,
    pub refunds: RefundSummary,
    pub axis: ChartAxis,
    pub payment_methods: PaymentBreakdown,
    pub top_donors: Vec<TopDonor>,
    pub payment_methods_html: String,
    pub top_donors_html: String,
}

pub async fn overview(
    pool: &PgPool,
    args: &ReportArgs,
    format: &CurrencyFormat,
) -> Result<OverviewReport, sqlx::Error> {
    let data = breakdown(pool, args, Some(format)).await?;
    let filter = ReportFilter::from_args(args);
    let gateways: Vec<GatewayTotal> = ReportRepo::gateway_totals(pool, &filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let payment_methods = reports::payment_breakdown(&gateways);
    let top_donors = fetch_top_donors(pool, args).await?;

    Ok(OverviewReport {
        headline: reports::headline_totals(&data.donations, &data.refunds),
        axis: ChartAxis::with_donations(&args.range, &data.days, &data.refunds),
        payment_methods_html: render::payment_methods(&payment_methods, format),
        top_donors_html: render::top_donors(&top_donors, format),
        days: data.days,
        refunds: data.refunds,
        payment_methods,
        top_donors,
    })
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ActivityReport {
    pub items: Vec<ActivityItem>,
    pub html: String,
}

pub async fn activity(
    pool: &PgPool,
    args: &ReportArgs,
    format: &CurrencyFormat,
) -> Result<ActivityReport, sqlx::Error> {
    let limit = i64::try_from(args.limit).unwrap_or(i64::MAX);
    let items = activity_items(pool, args, limit, format).await?;
    Ok(ActivityReport {
        html: render::activity_list(&items),
        items,
    })
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DonorReport {
    pub report_type: ReportType,
    pub page: DonorPage,
    pub html: String,
    pub pagination_html: String,
}

fn segment_of(args: &ReportArgs) -> DonorSegment {
    args.report_type.donor_segment().unwrap_or(DonorSegment::Top)
}

pub async fn donors(
    pool: &PgPool,
    args: &ReportArgs,
    format: &CurrencyFormat,
    dot_threshold: u32,
) -> Result<DonorReport, sqlx::Error> {
    let filter = ReportFilter::from_args(args);
    let segment = segment_of(args);
    let total = ReportRepo::count_donor_aggregates(pool, &filter, segment).await?;
    let rows: Vec<DonorSummary> =
        ReportRepo::donor_aggregates(pool, &filter, segment, args.page, args.per_page)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

    let page = DonorPage::new(rows, total, args.page, args.per_page, dot_threshold);
    Ok(DonorReport {
        report_type: args.report_type,
        html: render::donor_table(&page.rows, format),
        pagination_html: render::pagination(&page.pagination, args.report_type),
        page,
    })
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub headline: HeadlineTotals,
    pub axis: ChartAxis,
    pub top_donors: Vec<TopDonor>,
    pub activity: Vec<ActivityItem>,
    pub top_donors_html: String,
    pub activity_html: String,
}

pub async fn dashboard(
    pool: &PgPool,
    args: &ReportArgs,
    format: &CurrencyFormat,
) -> Result<DashboardReport, sqlx::Error> {
    let data = breakdown(pool, args, None).await?;
    let top_donors = fetch_top_donors(pool, args).await?;
    let activity = activity_items(pool, args, DASHBOARD_ACTIVITY_LIMIT, format).await?;

    Ok(DashboardReport {
        headline: reports::headline_totals(&data.donations, &data.refunds),
        axis: ChartAxis::with_donations(&args.range, &data.days, &data.refunds),
        top_donors_html: render::top_donors(&top_donors, format),
        activity_html: render::activity_list(&activity),
        top_donors,
        activity,
    })
}

// ---------------------------------------------------------------------------
// Advanced (LYBUNT / SYBUNT)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AdvancedReport {
    pub report_type: ReportType,
    pub windows: ComparisonWindows,
    pub report: LybuntReport,
    pub html: String,
}

pub async fn advanced(
    pool: &PgPool,
    args: &ReportArgs,
    format: &CurrencyFormat,
    today: NaiveDate,
) -> Result<AdvancedReport, sqlx::Error> {
    let windows = ComparisonWindows::for_args(args, today);
    let from: Vec<DonorWindowAggregate> =
        ReportRepo::window_aggregates(pool, &windows.compare_from, args.status)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
    let to: Vec<DonorWindowAggregate> =
        ReportRepo::window_aggregates(pool, &windows.compare_to, args.status)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

    let donor_ids: Vec<DbId> = from
        .iter()
        .chain(&to)
        .map(|a| a.donor_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let lifetime = ReportRepo::lifetime_totals(pool, &donor_ids, args.status).await?;

    let options = LybuntOptions {
        sort_by: LybuntSortField::parse_or_default(args.sort_by.as_deref()),
        order: args.sort_order,
        limit: args.limit,
        only_lapsed: true,
    };
    let report = reports::merge_lybunt(&from, &to, &lifetime, options);

    Ok(AdvancedReport {
        report_type: args.report_type,
        windows,
        html: render::lybunt_table(&report, format),
        report,
    })
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Flat rows for `kind`, matching `kind.columns()`.
pub async fn export_rows(
    pool: &PgPool,
    kind: ExportKind,
    args: &ReportArgs,
    format: &CurrencyFormat,
    today: NaiveDate,
) -> Result<Vec<Vec<String>>, sqlx::Error> {
    match kind {
        ExportKind::DonationBreakdown => {
            let data = breakdown(pool, args, None).await?;
            Ok(export::breakdown_rows(&data.days, &data.refunds))
        }
        ExportKind::Activity => {
            let limit = i64::try_from(args.limit).unwrap_or(i64::MAX);
            let items = activity_items(pool, args, limit, format).await?;
            Ok(export::activity_rows(&items))
        }
        ExportKind::Donors => {
            let filter = ReportFilter::from_args(args);
            let segment = segment_of(args);
            let total = ReportRepo::count_donor_aggregates(pool, &filter, segment).await?;
            if total == 0 {
                return Ok(Vec::new());
            }
            // Every donor on one page.
            let per_page = u32::try_from(total).unwrap_or(u32::MAX);
            let rows: Vec<DonorSummary> =
                ReportRepo::donor_aggregates(pool, &filter, segment, 1, per_page)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();
            Ok(export::donor_rows(&rows))
        }
        ExportKind::Advanced => {
            let report = advanced(pool, args, format, today).await?;
            Ok(export::lybunt_rows(&report.report))
        }
    }
}
