//! Donor report rows (top, recurring, first-time).

use serde::Serialize;

use crate::money;
use crate::pagination::{self, Pagination};
use crate::report_args::DonorSegment;
use crate::types::{Amount, DbId, Timestamp};

/// One donor's aggregate over the report window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorSummary {
    pub donor_id: DbId,
    pub name: String,
    pub email: String,
    pub total_amount: Amount,
    pub donation_count: i64,
    pub average_amount: Amount,
    pub first_donation_date: Option<Timestamp>,
    pub last_donation_date: Option<Timestamp>,
    pub segment: Option<DonorSegment>,
}

impl DonorSummary {
    pub fn new(
        donor_id: DbId,
        name: String,
        email: String,
        total_amount: Amount,
        donation_count: i64,
        first_donation_date: Option<Timestamp>,
        last_donation_date: Option<Timestamp>,
    ) -> Self {
        Self {
            donor_id,
            name,
            email,
            total_amount,
            donation_count,
            average_amount: money::average(total_amount, donation_count),
            first_donation_date,
            last_donation_date,
            segment: DonorSegment::classify(donation_count),
        }
    }
}

/// Join first and last name, falling back to the email address.
pub fn display_name(first: Option<&str>, last: Option<&str>, email: &str) -> String {
    let name = [first.unwrap_or(""), last.unwrap_or("")]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        email.to_string()
    } else {
        name
    }
}

/// A page of donor rows plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorPage {
    pub rows: Vec<DonorSummary>,
    pub total_count: i64,
    pub pagination: Pagination,
}

impl DonorPage {
    pub fn new(
        rows: Vec<DonorSummary>,
        total_count: i64,
        page: u32,
        per_page: u32,
        dot_threshold: u32,
    ) -> Self {
        let total_pages = pagination::total_pages(total_count, per_page);
        Self {
            rows,
            total_count,
            pagination: Pagination::new(page, total_pages, dot_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_computes_average_and_segment() {
        let s = DonorSummary::new(1, "Ann".into(), "a@x.org".into(), 90.0, 3, None, None);
        assert_eq!(s.average_amount, 30.0);
        assert_eq!(s.segment, Some(DonorSegment::Recurring));

        let s = DonorSummary::new(2, "Bob".into(), "b@x.org".into(), 10.0, 1, None, None);
        assert_eq!(s.segment, Some(DonorSegment::FirstTime));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(display_name(Some("Ann"), Some("Lee"), "a@x.org"), "Ann Lee");
        assert_eq!(display_name(Some(" "), None, "a@x.org"), "a@x.org");
        assert_eq!(display_name(None, Some("Lee"), "a@x.org"), "Lee");
    }

    #[test]
    fn donor_page_computes_total_pages() {
        let page = DonorPage::new(Vec::new(), 23, 2, 10, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.current, 2);
    }
}
