//! CSV and print exports.
//!
//! Each export kind declares its column headers; row builders flatten the
//! same aggregates the AJAX layer renders into string cells so the CSV and
//! print outputs stay identical.

use serde::Serialize;

use crate::activity::{ActivityItem, ActivitySource};
use crate::donors::DonorSummary;
use crate::error::CoreError;
use crate::money;
use crate::report_args::{DateRange, DonorSegment, ReportType};
use crate::reports::{DayBucket, LybuntReport, RefundSummary};
use crate::types::{Amount, Timestamp};

const CSV_DATE_FORMAT: &str = "%Y-%m-%d";
const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    DonationBreakdown,
    Activity,
    Donors,
    Advanced,
}

impl ExportKind {
    /// Resolve a `charitable_report_action` value.
    pub fn from_action(action: &str) -> Option<Self> {
        match action.trim() {
            "charitable_report_download_donation_breakdown" => Some(Self::DonationBreakdown),
            "charitable_report_download_activity" => Some(Self::Activity),
            "charitable_report_download_donors" => Some(Self::Donors),
            "charitable_report_download_advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// Report type used when the form does not pick one for this tab.
    pub fn default_report_type(self) -> ReportType {
        match self {
            Self::DonationBreakdown => ReportType::Overview,
            Self::Activity => ReportType::Activity,
            Self::Donors => ReportType::DonorsTop,
            Self::Advanced => ReportType::Lybunt,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::DonationBreakdown => "donation-breakdown",
            Self::Activity => "activity",
            Self::Donors => "donors",
            Self::Advanced => "advanced",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::DonationBreakdown => "Donation Breakdown",
            Self::Activity => "Activity",
            Self::Donors => "Donors",
            Self::Advanced => "Lapsed Donors",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::DonationBreakdown => &[
                "Date",
                "Donations",
                "Donors",
                "Amount",
                "Refunds",
                "Net",
            ],
            Self::Activity => &[
                "Date",
                "Source",
                "Activity",
                "Campaign",
                "Donor",
                "Amount",
                "Status",
            ],
            Self::Donors => &[
                "Donor ID",
                "Name",
                "Email",
                "Total Donated",
                "Donations",
                "Average Donation",
                "First Donation",
                "Last Donation",
                "Segment",
            ],
            Self::Advanced => &[
                "Donor ID",
                "Name",
                "Email",
                "Last Donation Amount",
                "Last Donation Date",
                "Last Campaign",
                "Compare From Total",
                "Compare To Total",
                "Lifetime Total",
                "Lapsed",
            ],
        }
    }

    /// `charitable-<kind>-<start>-<end>.<ext>`
    pub fn filename(self, range: &DateRange, extension: &str) -> String {
        format!(
            "charitable-{}-{}-{}.{}",
            self.slug(),
            range.start.format(CSV_DATE_FORMAT),
            range.end.format(CSV_DATE_FORMAT),
            extension
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Print,
}

impl ExportFormat {
    pub fn parse_or_default(input: Option<&str>) -> Self {
        match input.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("print") | Some("pdf") => Self::Print,
            _ => Self::Csv,
        }
    }
}

fn amount_cell(amount: Amount) -> String {
    format!("{amount:.2}")
}

fn date_cell(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.format(CSV_DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// One row per day, oldest first.
pub fn breakdown_rows(buckets: &[DayBucket], refunds: &RefundSummary) -> Vec<Vec<String>> {
    let mut ordered: Vec<&DayBucket> = buckets.iter().collect();
    ordered.sort_by_key(|b| b.date);
    ordered
        .into_iter()
        .map(|b| {
            let refunded = refunds.amount_on(b.date);
            vec![
                b.date.format(CSV_DATE_FORMAT).to_string(),
                b.count.to_string(),
                b.donors.to_string(),
                amount_cell(b.amount),
                amount_cell(refunded),
                amount_cell(money::net(b.amount, refunded)),
            ]
        })
        .collect()
}

pub fn activity_rows(items: &[ActivityItem]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            vec![
                item.date_recorded.format(CSV_DATETIME_FORMAT).to_string(),
                match item.source {
                    ActivitySource::Donation => "donation".to_string(),
                    ActivitySource::Campaign => "campaign".to_string(),
                },
                item.label.clone(),
                item.campaign_title.clone().unwrap_or_default(),
                item.donor_name.clone().unwrap_or_default(),
                item.amount.map(amount_cell).unwrap_or_default(),
                item.status.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn donor_rows(rows: &[DonorSummary]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let segment = match row.segment {
                Some(DonorSegment::Recurring) => "recurring",
                Some(DonorSegment::FirstTime) => "first-time",
                Some(DonorSegment::Top) | None => "",
            };
            vec![
                row.donor_id.to_string(),
                row.name.clone(),
                row.email.clone(),
                amount_cell(row.total_amount),
                row.donation_count.to_string(),
                amount_cell(row.average_amount),
                date_cell(row.first_donation_date),
                date_cell(row.last_donation_date),
                segment.to_string(),
            ]
        })
        .collect()
}

pub fn lybunt_rows(report: &LybuntReport) -> Vec<Vec<String>> {
    report
        .rows
        .iter()
        .map(|row| {
            vec![
                row.donor_id.to_string(),
                row.name.clone(),
                row.email.clone(),
                amount_cell(row.last_donation_amount),
                date_cell(row.last_donation_date),
                row.last_campaign.clone().unwrap_or_default(),
                amount_cell(row.compare_from_total),
                amount_cell(row.compare_to_total),
                amount_cell(row.lifetime_total),
                if row.lapsed { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect()
}

/// Write a header row followed by `rows` as CSV.
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(headers)
        .map_err(|e| CoreError::Internal(format!("csv header: {e}")))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| CoreError::Internal(format!("csv row: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("csv flush: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{donations_by_day, summarize_refunds, DonationRecord, RefundRecord};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn actions_map_to_kinds() {
        assert_eq!(
            ExportKind::from_action("charitable_report_download_donors"),
            Some(ExportKind::Donors)
        );
        assert_eq!(ExportKind::from_action("charitable_report_download_pdf"), None);
    }

    #[test]
    fn filename_includes_kind_and_range() {
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 31));
        assert_eq!(
            ExportKind::DonationBreakdown.filename(&range, "csv"),
            "charitable-donation-breakdown-2024-01-01-2024-01-31.csv"
        );
    }

    #[test]
    fn breakdown_rows_are_oldest_first_with_net() {
        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 2));
        let donations = vec![DonationRecord {
            donation_id: 1,
            donor_id: 1,
            date: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
            amount: 50.0,
            gateway: "offline".into(),
            refund_amount: 0.0,
        }];
        let buckets = donations_by_day(&range, &donations, None);
        let refunds = summarize_refunds(&[RefundRecord {
            donation_id: 1,
            date: day(2024, 3, 2),
            refund_amount: 20.0,
        }]);
        let rows = breakdown_rows(&buckets, &refunds);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "2024-03-01");
        assert_eq!(rows[1], vec!["2024-03-02", "1", "1", "50.00", "20.00", "30.00"]);
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let kind = ExportKind::Donors;
        let row = DonorSummary::new(3, "Lee, Ann".into(), "a@x.org".into(), 30.0, 2, None, None);
        let bytes = write_csv(kind.columns(), &donor_rows(&[row])).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().split(',').count(), kind.columns().len());
        assert_eq!(
            lines.next().unwrap(),
            "3,\"Lee, Ann\",a@x.org,30.00,2,15.00,,,recurring"
        );
    }

    #[test]
    fn every_kind_has_columns_matching_rows() {
        let row = DonorSummary::new(1, "A".into(), "a@x.org".into(), 1.0, 1, None, None);
        assert_eq!(donor_rows(&[row])[0].len(), ExportKind::Donors.columns().len());
        assert_eq!(ExportKind::DonationBreakdown.columns().len(), 6);
        assert_eq!(ExportKind::Advanced.columns().len(), 10);
    }

    #[test]
    fn format_parsing() {
        assert_eq!(ExportFormat::parse_or_default(Some("print")), ExportFormat::Print);
        assert_eq!(ExportFormat::parse_or_default(Some("xlsx")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse_or_default(None), ExportFormat::Csv);
    }
}
