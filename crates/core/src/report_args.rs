//! Report types and the filter argument bag shared by the AJAX and export
//! layers.
//!
//! Submitted values are parsed permissively: anything malformed falls back
//! to a default instead of being rejected.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::status::DonationStatus;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Days covered by a report when no start date is supplied (end inclusive).
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// Longest range a single report may span. Earlier start dates are clamped.
pub const MAX_RANGE_DAYS: i64 = 3660;

/// Default donor table page size.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound for a requested page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Default number of rows returned by the advanced (LYBUNT/SYBUNT) report.
pub const DEFAULT_ADVANCED_LIMIT: usize = 50;

/// Accepted date input formats, tried in order.
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d", "%m/%d/%Y"];

// ---------------------------------------------------------------------------
// Report type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    Overview,
    Activity,
    DonorsTop,
    DonorsRecurring,
    DonorsFirstTime,
    Lybunt,
    Sybunt,
    Dashboard,
}

/// Donor grouping applied to the donor aggregate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonorSegment {
    /// Every donor, ordered by lifetime value in the window.
    Top,
    /// Donors with more than one donation in the window.
    Recurring,
    /// Donors with exactly one donation in the window.
    FirstTime,
}

impl DonorSegment {
    /// Classify a donor by their donation count within a window.
    ///
    /// Returns `None` for donors with no donations at all.
    pub fn classify(donation_count: i64) -> Option<Self> {
        match donation_count {
            c if c > 1 => Some(Self::Recurring),
            1 => Some(Self::FirstTime),
            _ => None,
        }
    }

    /// Inclusive donation-count bounds `(min, max)` of the segment. `None`
    /// means unbounded. The SQL `HAVING` filter binds these same values.
    pub fn count_bounds(self) -> (i64, Option<i64>) {
        match self {
            Self::Top => (1, None),
            Self::Recurring => (2, None),
            Self::FirstTime => (1, Some(1)),
        }
    }

    /// Whether a donor with `donation_count` donations belongs to this segment.
    pub fn includes(self, donation_count: i64) -> bool {
        let (min, max) = self.count_bounds();
        donation_count >= min && max.map_or(true, |max| donation_count <= max)
    }
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Activity => "activity",
            Self::DonorsTop => "donors-top",
            Self::DonorsRecurring => "donors-recurring",
            Self::DonorsFirstTime => "donors-first-time",
            Self::Lybunt => "lybunt",
            Self::Sybunt => "sybunt",
            Self::Dashboard => "dashboard",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let all = [
            Self::Overview,
            Self::Activity,
            Self::DonorsTop,
            Self::DonorsRecurring,
            Self::DonorsFirstTime,
            Self::Lybunt,
            Self::Sybunt,
            Self::Dashboard,
        ];
        let needle = input.trim();
        all.into_iter().find(|t| t.as_str() == needle)
    }

    /// Parse `input`, returning `default` when absent or unrecognised.
    pub fn parse_or(input: Option<&str>, default: ReportType) -> Self {
        input.and_then(Self::parse).unwrap_or(default)
    }

    /// The donor segment a donor report selects, if this is a donor report.
    pub fn donor_segment(self) -> Option<DonorSegment> {
        match self {
            Self::DonorsTop => Some(DonorSegment::Top),
            Self::DonorsRecurring => Some(DonorSegment::Recurring),
            Self::DonorsFirstTime => Some(DonorSegment::FirstTime),
            _ => None,
        }
    }

    pub fn is_donor_report(self) -> bool {
        self.donor_segment().is_some()
    }

    pub fn is_advanced(self) -> bool {
        matches!(self, Self::Lybunt | Self::Sybunt)
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if given in reverse and clamping the
    /// span to [`MAX_RANGE_DAYS`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        let earliest = days_before(end, MAX_RANGE_DAYS - 1);
        Self {
            start: start.max(earliest),
            end,
        }
    }

    /// The `days` days ending `today`, at most [`MAX_RANGE_DAYS`].
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        let days = days.clamp(1, MAX_RANGE_DAYS);
        Self::new(days_before(today, days - 1), today)
    }

    /// Number of calendar days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the range, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |offset| start + Duration::days(offset))
    }

    /// Half-open UTC timestamp bounds `[start 00:00, end+1 00:00)` for SQL.
    pub fn bounds(&self) -> (Timestamp, Timestamp) {
        let from = Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN));
        let after_end = self.end.succ_opt().unwrap_or(NaiveDate::MAX);
        let to = Utc.from_utc_datetime(&after_end.and_time(NaiveTime::MIN));
        (from, to)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

/// `day - days`, saturating at the earliest representable date.
fn days_before(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Parse a submitted date in any of the accepted formats.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Loosely-typed POST fields as submitted by the admin UI.
///
/// Every field is optional; [`ReportArgs::from_input`] resolves defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportInput {
    pub report_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub campaign_id: Option<String>,
    pub category_id: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub days: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<String>,
    pub compare_from_start: Option<String>,
    pub compare_from_end: Option<String>,
    pub compare_to_start: Option<String>,
    pub compare_to_end: Option<String>,
}

/// Parse an optional entity filter. Empty, `all`, zero and negative values
/// mean "no filter".
fn parse_filter_id(input: Option<&str>) -> Option<DbId> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
        .and_then(|s| s.parse::<DbId>().ok())
        .filter(|id| *id > 0)
}

/// A window given as two dates. Both must parse, otherwise `None`.
fn parse_window(start: Option<&str>, end: Option<&str>) -> Option<DateRange> {
    let start = start.and_then(parse_date)?;
    let end = end.and_then(parse_date)?;
    Some(DateRange::new(start, end))
}

fn parse_positive(input: Option<&str>) -> Option<u32> {
    input
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

// ---------------------------------------------------------------------------
// Resolved args
// ---------------------------------------------------------------------------

/// Sort direction for tabular reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse_or_default(input: Option<&str>) -> Self {
        match input.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Fully resolved report parameters.
///
/// This is the value cached per report tab so navigation between tabs keeps
/// the user's filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportArgs {
    pub report_type: ReportType,
    pub range: DateRange,
    pub status: DonationStatus,
    pub campaign_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub page: u32,
    pub per_page: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub limit: usize,
    /// Explicit LYBUNT/SYBUNT windows. `None` uses the report type's default.
    #[serde(default)]
    pub compare_from: Option<DateRange>,
    #[serde(default)]
    pub compare_to: Option<DateRange>,
}

impl ReportArgs {
    /// Resolve raw input into args, filling every missing or malformed
    /// field with its default.
    ///
    /// `days` (dashboard) takes precedence over an explicit start date.
    pub fn from_input(
        input: &ReportInput,
        default_type: ReportType,
        today: NaiveDate,
        default_per_page: u32,
    ) -> Self {
        let report_type = ReportType::parse_or(input.report_type.as_deref(), default_type);

        let end = input
            .end_date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(today);
        let range = match parse_positive(input.days.as_deref()) {
            Some(days) => DateRange::last_days(end, i64::from(days)),
            None => match input.start_date.as_deref().and_then(parse_date) {
                Some(start) => DateRange::new(start, end),
                None => DateRange::last_days(end, DEFAULT_RANGE_DAYS),
            },
        };

        let per_page = parse_positive(input.per_page.as_deref())
            .unwrap_or(default_per_page)
            .min(MAX_PER_PAGE);

        let limit = input
            .limit
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_ADVANCED_LIMIT);

        Self {
            report_type,
            range,
            status: DonationStatus::parse_or_default(input.status.as_deref()),
            campaign_id: parse_filter_id(input.campaign_id.as_deref()),
            category_id: parse_filter_id(input.category_id.as_deref()),
            page: parse_positive(input.page.as_deref()).unwrap_or(1),
            per_page,
            sort_by: input
                .sort_by
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            sort_order: SortOrder::parse_or_default(input.sort_order.as_deref()),
            limit,
            compare_from: parse_window(
                input.compare_from_start.as_deref(),
                input.compare_from_end.as_deref(),
            ),
            compare_to: parse_window(
                input.compare_to_start.as_deref(),
                input.compare_to_end.as_deref(),
            ),
        }
    }

    /// Resolve input for one report tab. A submitted report type is kept
    /// only when it belongs to the same tab as `default_type`.
    pub fn for_tab(
        input: &ReportInput,
        default_type: ReportType,
        today: NaiveDate,
        default_per_page: u32,
    ) -> Self {
        let mut args = Self::from_input(input, default_type, today, default_per_page);
        let same_tab = (default_type.is_donor_report() && args.report_type.is_donor_report())
            || (default_type.is_advanced() && args.report_type.is_advanced());
        if !same_tab {
            args.report_type = default_type;
        }
        args
    }

    /// A stable string identifying the filters, used in cache keys.
    pub fn cache_fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{:?}|{}|{}|{}",
            self.report_type,
            self.range.start,
            self.range.end,
            self.status,
            self.campaign_id.map(|id| id.to_string()).unwrap_or_default(),
            self.category_id.map(|id| id.to_string()).unwrap_or_default(),
            self.page,
            self.per_page,
            self.sort_by.as_deref().unwrap_or_default(),
            self.sort_order,
            self.limit,
            window_key(self.compare_from.as_ref()),
            window_key(self.compare_to.as_ref()),
        )
    }
}

fn window_key(window: Option<&DateRange>) -> String {
    window
        .map(|w| format!("{}..{}", w.start, w.end))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_all_formats() {
        assert_eq!(parse_date("2024/03/05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("03/05/2024"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("  "), None);
    }

    #[test]
    fn reversed_range_is_swapped() {
        let range = DateRange::new(day(2024, 3, 10), day(2024, 3, 1));
        assert_eq!(range.start, day(2024, 3, 1));
        assert_eq!(range.end, day(2024, 3, 10));
        assert_eq!(range.num_days(), 10);
    }

    #[test]
    fn oversized_range_is_clamped() {
        let range = DateRange::new(day(1900, 1, 1), day(2024, 1, 1));
        assert_eq!(range.num_days(), MAX_RANGE_DAYS);
    }

    #[test]
    fn bounds_are_half_open() {
        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 1));
        let (from, to) = range.bounds();
        assert_eq!((to - from).num_hours(), 24);
    }

    #[test]
    fn empty_input_resolves_to_defaults() {
        let today = day(2024, 6, 15);
        let args = ReportArgs::from_input(&ReportInput::default(), ReportType::Overview, today, 10);
        assert_eq!(args.report_type, ReportType::Overview);
        assert_eq!(args.range.end, today);
        assert_eq!(args.range.num_days(), DEFAULT_RANGE_DAYS);
        assert_eq!(args.status, DonationStatus::Completed);
        assert_eq!(args.page, 1);
        assert_eq!(args.per_page, 10);
        assert_eq!(args.campaign_id, None);
    }

    #[test]
    fn malformed_input_is_defaulted_not_rejected() {
        let input = ReportInput {
            report_type: Some("bogus".into()),
            start_date: Some("not a date".into()),
            status: Some("weird".into()),
            campaign_id: Some("-1".into()),
            category_id: Some("all".into()),
            page: Some("0".into()),
            per_page: Some("5000".into()),
            ..Default::default()
        };
        let args = ReportArgs::from_input(&input, ReportType::DonorsTop, day(2024, 1, 31), 10);
        assert_eq!(args.report_type, ReportType::DonorsTop);
        assert_eq!(args.status, DonationStatus::Completed);
        assert_eq!(args.campaign_id, None);
        assert_eq!(args.category_id, None);
        assert_eq!(args.page, 1);
        assert_eq!(args.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn days_overrides_start_date() {
        let input = ReportInput {
            start_date: Some("2020-01-01".into()),
            days: Some("30".into()),
            ..Default::default()
        };
        let args = ReportArgs::from_input(&input, ReportType::Dashboard, day(2024, 1, 31), 10);
        assert_eq!(args.range.start, day(2024, 1, 2));
        assert_eq!(args.range.num_days(), 30);
    }

    #[test]
    fn huge_days_is_clamped_instead_of_overflowing() {
        let today = day(2024, 6, 15);
        let input = ReportInput {
            days: Some("999999999".into()),
            ..Default::default()
        };
        let args = ReportArgs::from_input(&input, ReportType::Dashboard, today, 10);
        assert_eq!(args.range.end, today);
        assert_eq!(args.range.num_days(), MAX_RANGE_DAYS);

        let range = DateRange::last_days(NaiveDate::MIN, 30);
        assert_eq!(range.start, NaiveDate::MIN);
        let (from, to) = DateRange::new(NaiveDate::MAX, NaiveDate::MAX).bounds();
        assert!(from <= to);
    }

    #[test]
    fn garbage_dates_fall_back_to_default_range() {
        let today = day(2024, 6, 15);
        let input = ReportInput {
            start_date: Some("2024-13-45".into()),
            end_date: Some("soon".into()),
            days: Some("-3".into()),
            ..Default::default()
        };
        let args = ReportArgs::from_input(&input, ReportType::Overview, today, 10);
        assert_eq!(args.range, DateRange::last_days(today, DEFAULT_RANGE_DAYS));
    }

    #[test]
    fn compare_windows_need_both_dates() {
        let today = day(2024, 6, 15);
        let input = ReportInput {
            compare_from_start: Some("2021-12-31".into()),
            compare_from_end: Some("2021-01-01".into()),
            compare_to_start: Some("2024-01-01".into()),
            compare_to_end: Some("whenever".into()),
            ..Default::default()
        };
        let args = ReportArgs::from_input(&input, ReportType::Lybunt, today, 10);
        assert_eq!(args.compare_from, Some(DateRange::new(day(2021, 1, 1), day(2021, 12, 31))));
        assert_eq!(args.compare_to, None);

        let plain = ReportArgs::from_input(&ReportInput::default(), ReportType::Lybunt, today, 10);
        assert_ne!(args.cache_fingerprint(), plain.cache_fingerprint());
    }

    #[test]
    fn tab_keeps_only_its_own_report_types() {
        let today = day(2024, 6, 15);
        let input = |rt: &str| ReportInput {
            report_type: Some(rt.into()),
            ..Default::default()
        };

        let submitted = input("donors-recurring");
        let args = ReportArgs::for_tab(&submitted, ReportType::DonorsTop, today, 10);
        assert_eq!(args.report_type, ReportType::DonorsRecurring);
        let args = ReportArgs::for_tab(&input("sybunt"), ReportType::DonorsTop, today, 10);
        assert_eq!(args.report_type, ReportType::DonorsTop);
        let args = ReportArgs::for_tab(&input("sybunt"), ReportType::Lybunt, today, 10);
        assert_eq!(args.report_type, ReportType::Sybunt);
        let args = ReportArgs::for_tab(&input("donors-top"), ReportType::Overview, today, 10);
        assert_eq!(args.report_type, ReportType::Overview);
    }

    #[test]
    fn segments_are_disjoint() {
        for count in 0..10 {
            let recurring = DonorSegment::Recurring.includes(count);
            let first_time = DonorSegment::FirstTime.includes(count);
            assert!(!(recurring && first_time), "count {count} in both segments");
        }
        for count in 1..10 {
            assert_eq!(
                DonorSegment::classify(count).is_some_and(|s| s.includes(count)),
                DonorSegment::Top.includes(count),
                "count {count} must land in exactly one of recurring/first-time"
            );
        }
        assert_eq!(DonorSegment::classify(1), Some(DonorSegment::FirstTime));
        assert_eq!(DonorSegment::classify(2), Some(DonorSegment::Recurring));
        assert_eq!(DonorSegment::classify(0), None);
    }

    #[test]
    fn report_type_round_trips_through_slug() {
        assert_eq!(ReportType::parse("donors-first-time"), Some(ReportType::DonorsFirstTime));
        assert_eq!(
            ReportType::DonorsRecurring.donor_segment(),
            Some(DonorSegment::Recurring)
        );
        assert!(ReportType::Sybunt.is_advanced());
        assert!(!ReportType::Overview.is_donor_report());
    }

    #[test]
    fn fingerprint_changes_with_filters() {
        let today = day(2024, 6, 15);
        let a = ReportArgs::from_input(&ReportInput::default(), ReportType::Overview, today, 10);
        let mut b = a.clone();
        b.campaign_id = Some(4);
        assert_ne!(a.cache_fingerprint(), b.cache_fingerprint());
    }
}
