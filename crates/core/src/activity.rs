//! Campaign and donation activity feed.
//!
//! Activity rows are stored with a machine `type`; the label and icon shown
//! in the admin UI are derived here.

use serde::Serialize;

use crate::money::CurrencyFormat;
use crate::status::DonationStatus;
use crate::types::{Amount, DbId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    Donation,
    Campaign,
}

/// A raw activity row from either activity table.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub id: DbId,
    pub source: ActivitySource,
    pub activity_type: String,
    pub status: Option<String>,
    pub amount: Option<Amount>,
    pub campaign_id: Option<DbId>,
    pub campaign_title: Option<String>,
    pub donor_name: Option<String>,
    pub donation_id: Option<DbId>,
    pub date_recorded: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    DonationMade,
    DonationRefunded,
    DonationStatusChanged,
    CampaignCreated,
    CampaignUpdated,
    CampaignEnded,
    GoalReached,
    Other,
}

impl ActivityKind {
    pub fn from_type(source: ActivitySource, activity_type: &str) -> Self {
        match (source, activity_type) {
            (ActivitySource::Donation, "donation" | "donation_made" | "new_donation") => {
                Self::DonationMade
            }
            (ActivitySource::Donation, "refund" | "donation_refunded") => Self::DonationRefunded,
            (ActivitySource::Donation, "status_change" | "status_changed") => {
                Self::DonationStatusChanged
            }
            (
                ActivitySource::Campaign,
                "campaign_created" | "campaign_published" | "new_campaign",
            ) => Self::CampaignCreated,
            (ActivitySource::Campaign, "campaign_updated") => Self::CampaignUpdated,
            (ActivitySource::Campaign, "campaign_ended" | "campaign_finished") => {
                Self::CampaignEnded
            }
            (ActivitySource::Campaign, "goal_reached") => Self::GoalReached,
            _ => Self::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::DonationMade => "donation",
            Self::DonationRefunded => "refund",
            Self::DonationStatusChanged => "status",
            Self::CampaignCreated | Self::CampaignUpdated => "campaign",
            Self::CampaignEnded => "campaign-ended",
            Self::GoalReached => "goal",
            Self::Other => "activity",
        }
    }
}

/// An activity row decorated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub id: DbId,
    pub source: ActivitySource,
    pub kind: ActivityKind,
    pub label: String,
    pub icon: &'static str,
    pub campaign_id: Option<DbId>,
    pub campaign_title: Option<String>,
    pub donor_name: Option<String>,
    pub donation_id: Option<DbId>,
    pub amount: Option<Amount>,
    pub formatted_amount: Option<String>,
    pub status: Option<String>,
    pub date_recorded: Timestamp,
}

fn humanize(raw: &str) -> String {
    let spaced = raw.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Activity".to_string(),
    }
}

fn label_for(kind: ActivityKind, record: &ActivityRecord) -> String {
    match kind {
        ActivityKind::DonationMade => "Donation made".to_string(),
        ActivityKind::DonationRefunded => "Donation refunded".to_string(),
        ActivityKind::DonationStatusChanged => {
            let status = DonationStatus::parse_or_default(record.status.as_deref());
            format!("Donation marked as {}", status.label())
        }
        ActivityKind::CampaignCreated => "Campaign created".to_string(),
        ActivityKind::CampaignUpdated => "Campaign updated".to_string(),
        ActivityKind::CampaignEnded => "Campaign ended".to_string(),
        ActivityKind::GoalReached => "Campaign goal reached".to_string(),
        ActivityKind::Other => humanize(&record.activity_type),
    }
}

impl ActivityItem {
    pub fn from_record(record: ActivityRecord, format: &CurrencyFormat) -> Self {
        let kind = ActivityKind::from_type(record.source, &record.activity_type);
        let label = label_for(kind, &record);
        Self {
            id: record.id,
            source: record.source,
            kind,
            label,
            icon: kind.icon(),
            campaign_id: record.campaign_id,
            campaign_title: record.campaign_title,
            donor_name: record.donor_name,
            donation_id: record.donation_id,
            formatted_amount: record.amount.map(|a| format.format(a)),
            amount: record.amount,
            status: record.status,
            date_recorded: record.date_recorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(source: ActivitySource, activity_type: &str, status: Option<&str>) -> ActivityRecord {
        ActivityRecord {
            id: 1,
            source,
            activity_type: activity_type.into(),
            status: status.map(str::to_string),
            amount: Some(12.5),
            campaign_id: Some(3),
            campaign_title: Some("Clean Water".into()),
            donor_name: Some("Ann Lee".into()),
            donation_id: Some(7),
            date_recorded: Utc::now(),
        }
    }

    #[test]
    fn known_types_get_label_and_icon() {
        let item = ActivityItem::from_record(
            record(ActivitySource::Donation, "donation", None),
            &CurrencyFormat::default(),
        );
        assert_eq!(item.kind, ActivityKind::DonationMade);
        assert_eq!(item.label, "Donation made");
        assert_eq!(item.icon, "donation");
        assert_eq!(item.formatted_amount.as_deref(), Some("$12.50"));
    }

    #[test]
    fn status_change_mentions_status_label() {
        let item = ActivityItem::from_record(
            record(ActivitySource::Donation, "status_change", Some("charitable-refunded")),
            &CurrencyFormat::default(),
        );
        assert_eq!(item.label, "Donation marked as Refunded");
    }

    #[test]
    fn source_disambiguates_types() {
        assert_eq!(
            ActivityKind::from_type(ActivitySource::Campaign, "donation"),
            ActivityKind::Other
        );
        assert_eq!(
            ActivityKind::from_type(ActivitySource::Campaign, "goal_reached").icon(),
            "goal"
        );
    }

    #[test]
    fn unknown_types_are_humanized() {
        let item = ActivityItem::from_record(
            record(ActivitySource::Campaign, "milestone_hit", None),
            &CurrencyFormat::default(),
        );
        assert_eq!(item.label, "Milestone hit");
        assert_eq!(item.icon, "activity");
    }
}
