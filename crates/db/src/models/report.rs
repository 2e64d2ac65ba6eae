//! Report query rows and their conversions into core input types.

use charitable_core::activity::{ActivityRecord, ActivitySource};
use charitable_core::donors::{display_name, DonorSummary};
use charitable_core::reports::{
    DonationRecord, DonorAmount, DonorWindowAggregate, GatewayTotal, RefundRecord,
};
use charitable_core::types::{Amount, DbId, Timestamp};
use sqlx::FromRow;

/// One donation, amounts summed across its campaign splits.
#[derive(Debug, Clone, FromRow)]
pub struct DonationRow {
    pub donation_id: DbId,
    pub donor_id: DbId,
    pub donation_date: Timestamp,
    pub amount: Amount,
    pub gateway: String,
    pub refund_amount: Amount,
}

impl From<DonationRow> for DonationRecord {
    fn from(row: DonationRow) -> Self {
        Self {
            donation_id: row.donation_id,
            donor_id: row.donor_id,
            date: row.donation_date,
            amount: row.amount,
            gateway: row.gateway,
            refund_amount: row.refund_amount,
        }
    }
}

/// A refunded donation, repeated once per campaign split.
#[derive(Debug, Clone, FromRow)]
pub struct RefundRow {
    pub donation_id: DbId,
    pub refund_date: Timestamp,
    pub refund_amount: Amount,
}

impl From<RefundRow> for RefundRecord {
    fn from(row: RefundRow) -> Self {
        Self {
            donation_id: row.donation_id,
            date: row.refund_date.date_naive(),
            refund_amount: row.refund_amount,
        }
    }
}

/// Per-donor aggregate for the donor tables.
#[derive(Debug, Clone, FromRow)]
pub struct DonorAggregateRow {
    pub donor_id: DbId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_amount: Amount,
    pub donation_count: i64,
    pub first_donation_date: Option<Timestamp>,
    pub last_donation_date: Option<Timestamp>,
}

impl From<DonorAggregateRow> for DonorSummary {
    fn from(row: DonorAggregateRow) -> Self {
        let name = display_name(row.first_name.as_deref(), row.last_name.as_deref(), &row.email);
        DonorSummary::new(
            row.donor_id,
            name,
            row.email,
            row.total_amount,
            row.donation_count,
            row.first_donation_date,
            row.last_donation_date,
        )
    }
}

/// One donor/donation amount pair for the overview's top donors.
#[derive(Debug, Clone, FromRow)]
pub struct DonorAmountRow {
    pub donor_id: DbId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub amount: Option<Amount>,
}

impl From<DonorAmountRow> for DonorAmount {
    fn from(row: DonorAmountRow) -> Self {
        Self {
            donor_id: row.donor_id,
            name: display_name(row.first_name.as_deref(), row.last_name.as_deref(), &row.email),
            email: row.email,
            amount: row.amount,
        }
    }
}

/// Per-donor aggregate over one LYBUNT/SYBUNT window.
#[derive(Debug, Clone, FromRow)]
pub struct DonorWindowRow {
    pub donor_id: DbId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_amount: Amount,
    pub donation_count: i64,
    pub last_donation_date: Option<Timestamp>,
    pub last_donation_amount: Option<Amount>,
    pub last_campaign: Option<String>,
}

impl From<DonorWindowRow> for DonorWindowAggregate {
    fn from(row: DonorWindowRow) -> Self {
        Self {
            donor_id: row.donor_id,
            name: display_name(row.first_name.as_deref(), row.last_name.as_deref(), &row.email),
            email: row.email,
            total_amount: row.total_amount,
            donation_count: row.donation_count,
            last_donation_date: row.last_donation_date,
            last_donation_amount: row.last_donation_amount,
            last_campaign: row.last_campaign.filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct GatewayTotalRow {
    pub gateway: String,
    pub count: i64,
    pub amount: Amount,
}

impl From<GatewayTotalRow> for GatewayTotal {
    fn from(row: GatewayTotalRow) -> Self {
        Self {
            gateway: row.gateway,
            count: row.count,
            amount: row.amount,
        }
    }
}

/// Lifetime giving total for one donor.
#[derive(Debug, Clone, FromRow)]
pub struct LifetimeTotalRow {
    pub donor_id: DbId,
    pub total_amount: Amount,
}

/// A row from either activity table. The source is set by the caller.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: DbId,
    pub activity_type: String,
    pub status: Option<String>,
    pub amount: Option<Amount>,
    pub campaign_id: Option<DbId>,
    pub campaign_title: Option<String>,
    pub donor_name: Option<String>,
    pub donation_id: Option<DbId>,
    pub date_recorded: Timestamp,
}

impl ActivityRow {
    pub fn into_record(self, source: ActivitySource) -> ActivityRecord {
        ActivityRecord {
            id: self.id,
            source,
            activity_type: self.activity_type,
            status: self.status,
            amount: self.amount,
            campaign_id: self.campaign_id,
            campaign_title: self.campaign_title,
            donor_name: self.donor_name.filter(|n| !n.trim().is_empty()),
            donation_id: self.donation_id,
            date_recorded: self.date_recorded,
        }
    }
}
