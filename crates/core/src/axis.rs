//! Time-series chart axes.
//!
//! A chart is two parallel arrays: `categories` (day labels) and one or more
//! value series of the same length, oldest day first.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::report_args::DateRange;
use crate::reports::{DayBucket, RefundSummary, DAY_LABEL_FORMAT};
use crate::types::Amount;

/// Minimum number of points a chart is drawn with.
pub const MIN_AXIS_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChartAxis {
    pub categories: Vec<String>,
    pub donations: Vec<Amount>,
    pub refunds: Vec<Amount>,
}

impl ChartAxis {
    /// Build the date axis for `range`. A single-day range is padded with one
    /// empty day on each side.
    pub fn init(range: &DateRange) -> (Self, Vec<NaiveDate>) {
        let mut days: Vec<NaiveDate> = range.days().collect();
        if days.len() == 1 {
            let only = days[0];
            days = vec![only - Duration::days(1), only, only + Duration::days(1)];
        }

        let axis = Self {
            categories: days
                .iter()
                .map(|d| d.format(DAY_LABEL_FORMAT).to_string())
                .collect(),
            donations: vec![0.0; days.len()],
            refunds: vec![0.0; days.len()],
        };
        (axis, days)
    }

    /// Build both series for `range` from day buckets (any order) and the
    /// refund summary.
    pub fn with_donations(
        range: &DateRange,
        buckets: &[DayBucket],
        refunds: &RefundSummary,
    ) -> Self {
        let (mut axis, days) = Self::init(range);
        axis.set_donations(&days, buckets);
        axis.set_refunds(&days, refunds);
        axis
    }

    fn set_donations(&mut self, days: &[NaiveDate], buckets: &[DayBucket]) {
        for (idx, day) in days.iter().enumerate() {
            if let Some(bucket) = buckets.iter().find(|b| b.date == *day) {
                self.donations[idx] = bucket.amount;
            }
        }
    }

    fn set_refunds(&mut self, days: &[NaiveDate], refunds: &RefundSummary) {
        for (idx, day) in days.iter().enumerate() {
            self.refunds[idx] = refunds.amount_on(*day);
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{donations_by_day, summarize_refunds, DonationRecord, RefundRecord};
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_range_is_padded() {
        let range = DateRange::new(day(2024, 3, 5), day(2024, 3, 5));
        let axis = ChartAxis::with_donations(&range, &[], &RefundSummary::default());
        assert_eq!(axis.len(), MIN_AXIS_POINTS);
        assert_eq!(axis.categories, vec!["Mar 04", "Mar 05", "Mar 06"]);
        assert_eq!(axis.donations, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn series_are_parallel_and_oldest_first() {
        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 4));
        let donations = vec![DonationRecord {
            donation_id: 1,
            donor_id: 1,
            date: Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
            amount: 42.0,
            gateway: "offline".into(),
            refund_amount: 0.0,
        }];
        let buckets = donations_by_day(&range, &donations, None);
        let refunds = summarize_refunds(&[RefundRecord {
            donation_id: 9,
            date: day(2024, 3, 4),
            refund_amount: 7.0,
        }]);
        let axis = ChartAxis::with_donations(&range, &buckets, &refunds);

        assert_eq!(axis.len(), 4);
        assert_eq!(axis.donations.len(), axis.categories.len());
        assert_eq!(axis.refunds.len(), axis.categories.len());
        assert_eq!(axis.categories[0], "Mar 01");
        assert_eq!(axis.donations, vec![0.0, 42.0, 0.0, 0.0]);
        assert_eq!(axis.refunds, vec![0.0, 0.0, 0.0, 7.0]);
    }
}
