//! Report aggregation over raw donation rows.
//!
//! Every function here is pure: the repository layer fetches rows, these
//! functions bucket, deduplicate, merge, and sort them.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::money::{self, CurrencyFormat};
use crate::report_args::{DateRange, ReportArgs, ReportType, SortOrder, MAX_RANGE_DAYS};
use crate::types::{Amount, DbId, Timestamp};

/// Label format for day buckets and chart categories (`Mar 05`).
pub const DAY_LABEL_FORMAT: &str = "%b %d";

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One donation as seen by a single donor, amounts summed across campaigns.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationRecord {
    pub donation_id: DbId,
    pub donor_id: DbId,
    pub date: Timestamp,
    pub amount: Amount,
    pub gateway: String,
    pub refund_amount: Amount,
}

/// A refund-related row. The same donation may appear several times (one row
/// per campaign it was split across).
#[derive(Debug, Clone, PartialEq)]
pub struct RefundRecord {
    pub donation_id: DbId,
    pub date: NaiveDate,
    pub refund_amount: Amount,
}

/// A donor/amount pair as returned by the top-donor query. `amount` is
/// `None` when the donor has no aggregate yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorAmount {
    pub donor_id: DbId,
    pub name: String,
    pub email: String,
    pub amount: Option<Amount>,
}

/// Per-donor aggregate over one date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorWindowAggregate {
    pub donor_id: DbId,
    pub name: String,
    pub email: String,
    pub total_amount: Amount,
    pub donation_count: i64,
    pub last_donation_date: Option<Timestamp>,
    pub last_donation_amount: Option<Amount>,
    pub last_campaign: Option<String>,
}

/// Totals for one payment gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayTotal {
    pub gateway: String,
    pub count: i64,
    pub amount: Amount,
}

// ---------------------------------------------------------------------------
// Donations by day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub label: String,
    pub amount: Amount,
    pub count: i64,
    pub donors: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_amount: Option<String>,
}

/// Build one bucket per calendar day of `range` (inclusive), fold the
/// donations into them, and return the buckets most recent first.
///
/// Days with no donations keep zero amount, count, and donors. Donations
/// dated outside the range are ignored. When `format` is given, each bucket
/// also carries its money-formatted amount.
pub fn donations_by_day(
    range: &DateRange,
    donations: &[DonationRecord],
    format: Option<&CurrencyFormat>,
) -> Vec<DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, (Amount, HashSet<DbId>, HashSet<DbId>)> = range
        .days()
        .map(|day| (day, (0.0, HashSet::new(), HashSet::new())))
        .collect();

    for donation in donations {
        let day = donation.date.date_naive();
        if let Some((amount, ids, donors)) = buckets.get_mut(&day) {
            *amount += donation.amount;
            ids.insert(donation.donation_id);
            donors.insert(donation.donor_id);
        }
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, (amount, ids, donors))| DayBucket {
            date,
            label: date.format(DAY_LABEL_FORMAT).to_string(),
            amount,
            count: ids.len() as i64,
            donors: donors.len() as i64,
            formatted_amount: format.map(|f| f.format(amount)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Refunds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundDay {
    pub date: NaiveDate,
    pub count: i64,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RefundSummary {
    pub total_count: i64,
    pub total_amount: Amount,
    /// Oldest first.
    pub by_day: Vec<RefundDay>,
}

impl RefundSummary {
    pub fn amount_on(&self, date: NaiveDate) -> Amount {
        self.by_day
            .iter()
            .find(|d| d.date == date)
            .map_or(0.0, |d| d.amount)
    }
}

/// Total refunds per day and overall, counting each donation once.
///
/// Totals are deduplicated across the whole input; each day's bucket is
/// deduplicated within that day.
pub fn summarize_refunds(rows: &[RefundRecord]) -> RefundSummary {
    let mut seen: HashSet<DbId> = HashSet::new();
    let mut seen_per_day: HashMap<NaiveDate, HashSet<DbId>> = HashMap::new();
    let mut days: BTreeMap<NaiveDate, (i64, Amount)> = BTreeMap::new();
    let mut summary = RefundSummary::default();

    for row in rows {
        if seen.insert(row.donation_id) {
            summary.total_count += 1;
            summary.total_amount += row.refund_amount;
        }
        if seen_per_day
            .entry(row.date)
            .or_default()
            .insert(row.donation_id)
        {
            let entry = days.entry(row.date).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += row.refund_amount;
        }
    }

    summary.by_day = days
        .into_iter()
        .map(|(date, (count, amount))| RefundDay { date, count, amount })
        .collect();
    summary
}

// ---------------------------------------------------------------------------
// Top donors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDonor {
    pub donor_id: DbId,
    pub name: String,
    pub email: String,
    pub total_amount: Amount,
    pub donation_count: i64,
}

/// Collapse per-donation rows into one entry per donor, sorted by total
/// amount descending (ties by donor id) and truncated to `limit`.
pub fn top_donors_overview(rows: &[DonorAmount], limit: usize) -> Vec<TopDonor> {
    let mut by_donor: HashMap<DbId, TopDonor> = HashMap::new();

    for row in rows {
        let entry = by_donor.entry(row.donor_id).or_insert_with(|| TopDonor {
            donor_id: row.donor_id,
            name: row.name.clone(),
            email: row.email.clone(),
            total_amount: 0.0,
            donation_count: 0,
        });
        entry.total_amount += row.amount.unwrap_or(0.0);
        entry.donation_count += 1;
    }

    let mut donors: Vec<TopDonor> = by_donor.into_values().collect();
    donors.sort_by(|a, b| {
        b.total_amount
            .partial_cmp(&a.total_amount)
            .unwrap_or(Ordering::Equal)
            .then(a.donor_id.cmp(&b.donor_id))
    });
    donors.truncate(limit);
    donors
}

// ---------------------------------------------------------------------------
// Headline totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineTotals {
    pub total_amount: Amount,
    pub donation_count: i64,
    pub donor_count: i64,
    pub average_amount: Amount,
    pub refund_count: i64,
    pub refund_amount: Amount,
    pub net_amount: Amount,
}

pub fn headline_totals(donations: &[DonationRecord], refunds: &RefundSummary) -> HeadlineTotals {
    let total_amount: Amount = donations.iter().map(|d| d.amount).sum();
    let donation_count = donations
        .iter()
        .map(|d| d.donation_id)
        .collect::<HashSet<_>>()
        .len() as i64;
    let donor_count = donations
        .iter()
        .map(|d| d.donor_id)
        .collect::<HashSet<_>>()
        .len() as i64;

    HeadlineTotals {
        total_amount,
        donation_count,
        donor_count,
        average_amount: money::average(total_amount, donation_count),
        refund_count: refunds.total_count,
        refund_amount: refunds.total_amount,
        net_amount: money::net(total_amount, refunds.total_amount),
    }
}

// ---------------------------------------------------------------------------
// Payment methods
// ---------------------------------------------------------------------------

/// Display label for a gateway id.
pub fn gateway_label(gateway: &str) -> String {
    match gateway {
        "offline" => "Offline".to_string(),
        "paypal" => "PayPal".to_string(),
        "stripe" => "Stripe".to_string(),
        "square" => "Square".to_string(),
        "braintree" => "Braintree".to_string(),
        "authorize_net" => "Authorize.Net".to_string(),
        "manual" => "Manual".to_string(),
        "" => "Unknown".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodRow {
    pub gateway: String,
    pub label: String,
    pub count: i64,
    pub amount: Amount,
    pub amount_pct: f64,
    pub count_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PaymentBreakdown {
    pub rows: Vec<PaymentMethodRow>,
    pub total_amount: Amount,
    pub total_count: i64,
}

/// Merge gateway totals (same gateway may appear more than once) and compute
/// each gateway's share of amount and count. Sorted by amount descending.
pub fn payment_breakdown(totals: &[GatewayTotal]) -> PaymentBreakdown {
    let mut merged: BTreeMap<String, (i64, Amount)> = BTreeMap::new();
    for t in totals {
        let entry = merged.entry(t.gateway.clone()).or_insert((0, 0.0));
        entry.0 += t.count;
        entry.1 += t.amount;
    }

    let total_amount: Amount = merged.values().map(|(_, a)| a).sum();
    let total_count: i64 = merged.values().map(|(c, _)| c).sum();

    let mut rows: Vec<PaymentMethodRow> = merged
        .into_iter()
        .map(|(gateway, (count, amount))| PaymentMethodRow {
            label: gateway_label(&gateway),
            gateway,
            count,
            amount,
            amount_pct: money::percentage(amount, total_amount),
            count_pct: money::percentage(count as f64, total_count as f64),
        })
        .collect();
    rows.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));

    PaymentBreakdown {
        rows,
        total_amount,
        total_count,
    }
}

// ---------------------------------------------------------------------------
// LYBUNT / SYBUNT
// ---------------------------------------------------------------------------

/// The two disjoint windows compared by the advanced donor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonWindows {
    /// Earlier window: donors who gave here are candidates.
    pub compare_from: DateRange,
    /// Later window: giving here means the donor is retained.
    pub compare_to: DateRange,
}

fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl ComparisonWindows {
    /// Last calendar year against this year to date.
    pub fn lybunt(today: NaiveDate) -> Self {
        let this_year = year_start(today.year());
        let last_year = year_start(today.year() - 1);
        Self {
            compare_from: DateRange::new(last_year, this_year - Duration::days(1)),
            compare_to: DateRange::new(this_year, today),
        }
    }

    /// Any earlier time (bounded by the maximum report span) against this
    /// year to date.
    pub fn sybunt(today: NaiveDate) -> Self {
        let this_year = year_start(today.year());
        let last_day = this_year - Duration::days(1);
        Self {
            compare_from: DateRange::new(last_day - Duration::days(MAX_RANGE_DAYS - 1), last_day),
            compare_to: DateRange::new(this_year, today),
        }
    }

    /// Windows for `args`: the report type's defaults, replaced by any
    /// window the user picked.
    pub fn for_args(args: &ReportArgs, today: NaiveDate) -> Self {
        let defaults = match args.report_type {
            ReportType::Sybunt => Self::sybunt(today),
            _ => Self::lybunt(today),
        };
        Self {
            compare_from: args.compare_from.unwrap_or(defaults.compare_from),
            compare_to: args.compare_to.unwrap_or(defaults.compare_to),
        }
    }
}

/// Sort key for the advanced report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LybuntSortField {
    Name,
    Email,
    LastDonationAmount,
    LastDonationDate,
    CompareFromTotal,
    CompareToTotal,
    #[default]
    LifetimeTotal,
}

impl LybuntSortField {
    pub fn parse_or_default(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            Some("name") => Self::Name,
            Some("email") => Self::Email,
            Some("last_donation_amount") => Self::LastDonationAmount,
            Some("last_donation_date") => Self::LastDonationDate,
            Some("compare_from_total") => Self::CompareFromTotal,
            Some("compare_to_total") => Self::CompareToTotal,
            _ => Self::LifetimeTotal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LybuntRow {
    pub donor_id: DbId,
    pub name: String,
    pub email: String,
    pub compare_from_total: Amount,
    pub compare_from_count: i64,
    pub compare_to_total: Amount,
    pub compare_to_count: i64,
    pub last_donation_amount: Amount,
    pub last_donation_date: Option<Timestamp>,
    pub last_campaign: Option<String>,
    pub lifetime_total: Amount,
    /// Gave in the earlier window but not in the later one.
    pub lapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct LybuntReport {
    pub rows: Vec<LybuntRow>,
    pub lapsed_count: i64,
    pub retained_count: i64,
    pub lapsed_amount: Amount,
}

/// Options controlling [`merge_lybunt`] output.
#[derive(Debug, Clone, Copy)]
pub struct LybuntOptions {
    pub sort_by: LybuntSortField,
    pub order: SortOrder,
    pub limit: usize,
    /// Keep only lapsed donors in `rows`.
    pub only_lapsed: bool,
}

fn compare_rows(a: &LybuntRow, b: &LybuntRow, field: LybuntSortField) -> Ordering {
    let by_f64 = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match field {
        LybuntSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        LybuntSortField::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        LybuntSortField::LastDonationAmount => {
            by_f64(a.last_donation_amount, b.last_donation_amount)
        }
        LybuntSortField::LastDonationDate => a.last_donation_date.cmp(&b.last_donation_date),
        LybuntSortField::CompareFromTotal => by_f64(a.compare_from_total, b.compare_from_total),
        LybuntSortField::CompareToTotal => by_f64(a.compare_to_total, b.compare_to_total),
        LybuntSortField::LifetimeTotal => by_f64(a.lifetime_total, b.lifetime_total),
    }
}

/// Merge the two window aggregates by donor id.
///
/// Descriptive fields (name, email, last donation, last campaign) from the
/// later window override the earlier window's when both are present.
/// `lifetime` supplies all-time totals; donors missing from it fall back to
/// the sum of both windows.
pub fn merge_lybunt(
    compare_from: &[DonorWindowAggregate],
    compare_to: &[DonorWindowAggregate],
    lifetime: &HashMap<DbId, Amount>,
    options: LybuntOptions,
) -> LybuntReport {
    let mut merged: HashMap<DbId, LybuntRow> = HashMap::new();

    for agg in compare_from {
        merged.insert(
            agg.donor_id,
            LybuntRow {
                donor_id: agg.donor_id,
                name: agg.name.clone(),
                email: agg.email.clone(),
                compare_from_total: agg.total_amount,
                compare_from_count: agg.donation_count,
                compare_to_total: 0.0,
                compare_to_count: 0,
                last_donation_amount: agg.last_donation_amount.unwrap_or(0.0),
                last_donation_date: agg.last_donation_date,
                last_campaign: agg.last_campaign.clone(),
                lifetime_total: 0.0,
                lapsed: false,
            },
        );
    }

    for agg in compare_to {
        let row = merged.entry(agg.donor_id).or_insert_with(|| LybuntRow {
            donor_id: agg.donor_id,
            name: String::new(),
            email: String::new(),
            compare_from_total: 0.0,
            compare_from_count: 0,
            compare_to_total: 0.0,
            compare_to_count: 0,
            last_donation_amount: 0.0,
            last_donation_date: None,
            last_campaign: None,
            lifetime_total: 0.0,
            lapsed: false,
        });
        row.compare_to_total = agg.total_amount;
        row.compare_to_count = agg.donation_count;
        if !agg.name.is_empty() {
            row.name = agg.name.clone();
        }
        if !agg.email.is_empty() {
            row.email = agg.email.clone();
        }
        if let Some(amount) = agg.last_donation_amount {
            row.last_donation_amount = amount;
        }
        if agg.last_donation_date.is_some() {
            row.last_donation_date = agg.last_donation_date;
        }
        if agg.last_campaign.is_some() {
            row.last_campaign = agg.last_campaign.clone();
        }
    }

    let mut report = LybuntReport::default();
    let mut rows: Vec<LybuntRow> = Vec::with_capacity(merged.len());

    for mut row in merged.into_values() {
        row.lifetime_total = lifetime
            .get(&row.donor_id)
            .copied()
            .unwrap_or(row.compare_from_total + row.compare_to_total);
        row.lapsed = row.compare_from_count > 0 && row.compare_to_count == 0;

        if row.lapsed {
            report.lapsed_count += 1;
            report.lapsed_amount += row.compare_from_total;
        } else if row.compare_from_count > 0 {
            report.retained_count += 1;
        }

        if !options.only_lapsed || row.lapsed {
            rows.push(row);
        }
    }

    rows.sort_by(|a, b| {
        let ord = compare_rows(a, b, options.sort_by);
        let ord = match options.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        ord.then(a.donor_id.cmp(&b.donor_id))
    });
    rows.truncate(options.limit);
    report.rows = rows;
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
