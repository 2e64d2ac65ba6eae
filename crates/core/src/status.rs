//! Donation post statuses.
//!
//! Status values are stored verbatim in `donations.status` using the
//! `charitable-` prefixed slugs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DonationStatus {
    #[default]
    #[serde(rename = "charitable-completed")]
    Completed,
    #[serde(rename = "charitable-pending")]
    Pending,
    #[serde(rename = "charitable-failed")]
    Failed,
    #[serde(rename = "charitable-cancelled")]
    Cancelled,
    #[serde(rename = "charitable-refunded")]
    Refunded,
    #[serde(rename = "charitable-preapproved")]
    Preapproved,
}

impl DonationStatus {
    pub const ALL: [DonationStatus; 6] = [
        Self::Completed,
        Self::Pending,
        Self::Failed,
        Self::Cancelled,
        Self::Refunded,
        Self::Preapproved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "charitable-completed",
            Self::Pending => "charitable-pending",
            Self::Failed => "charitable-failed",
            Self::Cancelled => "charitable-cancelled",
            Self::Refunded => "charitable-refunded",
            Self::Preapproved => "charitable-preapproved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Paid",
            Self::Pending => "Pending",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
            Self::Preapproved => "Pre Approved",
        }
    }

    /// Parse a submitted status, accepting the slug with or without the
    /// `charitable-` prefix. Anything unrecognised falls back to
    /// [`DonationStatus::Completed`].
    pub fn parse_or_default(input: Option<&str>) -> Self {
        let Some(raw) = input else {
            return Self::default();
        };
        let raw = raw.trim();
        let slug = raw.strip_prefix("charitable-").unwrap_or(raw);
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().trim_start_matches("charitable-") == slug)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_slugs() {
        assert_eq!(
            DonationStatus::parse_or_default(Some("charitable-refunded")),
            DonationStatus::Refunded
        );
        assert_eq!(
            DonationStatus::parse_or_default(Some("pending")),
            DonationStatus::Pending
        );
    }

    #[test]
    fn unknown_status_falls_back_to_completed() {
        assert_eq!(
            DonationStatus::parse_or_default(Some("publish")),
            DonationStatus::Completed
        );
        assert_eq!(DonationStatus::parse_or_default(None), DonationStatus::Completed);
        assert_eq!(DonationStatus::parse_or_default(Some("")), DonationStatus::Completed);
    }
}
