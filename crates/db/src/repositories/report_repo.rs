//! Read-only report queries over donations, donors and activities.

use std::collections::HashMap;

use charitable_core::activity::{ActivityRecord, ActivitySource};
use charitable_core::pagination::offset_for_page;
use charitable_core::report_args::{DateRange, DonorSegment, ReportArgs};
use charitable_core::status::DonationStatus;
use charitable_core::types::{Amount, DbId, Timestamp};
use sqlx::PgPool;

use crate::models::report::{
    ActivityRow, DonationRow, DonorAggregateRow, DonorAmountRow, DonorWindowRow, GatewayTotalRow,
    LifetimeTotalRow, RefundRow,
};

/// Joins shared by every donation query. `d` = donation, `cd` = campaign
/// split, `c` = campaign.
const DONATION_JOINS: &str = "FROM donations d \
     JOIN campaign_donations cd ON cd.donation_id = d.id \
     LEFT JOIN campaigns c ON c.id = cd.campaign_id";

/// Filter predicates binding `$1..$5` in the order of [`ReportFilter`].
const DONATION_FILTERS: &str = "d.status = $1 \
     AND d.donation_date >= $2 AND d.donation_date < $3 \
     AND ($4::BIGINT IS NULL OR cd.campaign_id = $4) \
     AND ($5::BIGINT IS NULL OR c.category_id = $5)";

const DONOR_AGGREGATE_COLUMNS: &str = "dn.id AS donor_id, dn.email, dn.first_name, dn.last_name, \
     SUM(cd.amount) AS total_amount, \
     COUNT(DISTINCT d.id) AS donation_count, \
     MIN(d.donation_date) AS first_donation_date, \
     MAX(d.donation_date) AS last_donation_date";

const ACTIVITY_TABLES: [&str; 2] = ["donation_activities", "campaign_activities"];

/// Bound values for [`DONATION_FILTERS`].
#[derive(Debug, Clone, Copy)]
pub struct ReportFilter {
    pub status: DonationStatus,
    pub from: Timestamp,
    pub to: Timestamp,
    pub campaign_id: Option<DbId>,
    pub category_id: Option<DbId>,
}

impl ReportFilter {
    pub fn from_args(args: &ReportArgs) -> Self {
        let (from, to) = args.range.bounds();
        Self {
            status: args.status,
            from,
            to,
            campaign_id: args.campaign_id,
            category_id: args.category_id,
        }
    }

    /// Filter for `range` with no campaign or category restriction.
    pub fn for_range(range: &DateRange, status: DonationStatus) -> Self {
        let (from, to) = range.bounds();
        Self {
            status,
            from,
            to,
            campaign_id: None,
            category_id: None,
        }
    }
}

/// Segment filter over the donor's donation count. `$min` and `$max` are
/// bound from [`DonorSegment::count_bounds`].
fn having_clause(min: usize, max: usize) -> String {
    format!(
        "HAVING COUNT(DISTINCT d.id) >= ${min} \
         AND (${max}::BIGINT IS NULL OR COUNT(DISTINCT d.id) <= ${max})"
    )
}

fn order_clause(segment: DonorSegment) -> &'static str {
    match segment {
        DonorSegment::Top => "ORDER BY total_amount DESC, donor_id ASC",
        DonorSegment::Recurring => "ORDER BY donation_count DESC, total_amount DESC, donor_id ASC",
        DonorSegment::FirstTime => "ORDER BY last_donation_date DESC, donor_id ASC",
    }
}

pub struct ReportRepo;

impl ReportRepo {
    /// Donations in the filter window, one row per donation and donor.
    pub async fn donations_in_range(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<DonationRow>, sqlx::Error> {
        let query = format!(
            "SELECT d.id AS donation_id, cd.donor_id, d.donation_date, \
                    SUM(cd.amount) AS amount, d.gateway, d.refund_amount \
             {DONATION_JOINS} \
             WHERE {DONATION_FILTERS} \
             GROUP BY d.id, cd.donor_id, d.donation_date, d.gateway, d.refund_amount \
             ORDER BY d.donation_date DESC"
        );
        sqlx::query_as::<_, DonationRow>(&query)
            .bind(filter.status.as_str())
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.campaign_id)
            .bind(filter.category_id)
            .fetch_all(pool)
            .await
    }

    /// Refunds dated inside the filter window, regardless of donation
    /// status. A donation split across campaigns appears once per split.
    pub async fn refund_rows(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<RefundRow>, sqlx::Error> {
        let query = format!(
            "SELECT d.id AS donation_id, d.refund_date, d.refund_amount \
             {DONATION_JOINS} \
             WHERE d.refund_amount > 0 AND d.refund_date IS NOT NULL \
               AND d.refund_date >= $1 AND d.refund_date < $2 \
               AND ($3::BIGINT IS NULL OR cd.campaign_id = $3) \
               AND ($4::BIGINT IS NULL OR c.category_id = $4) \
             ORDER BY d.refund_date ASC"
        );
        sqlx::query_as::<_, RefundRow>(&query)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.campaign_id)
            .bind(filter.category_id)
            .fetch_all(pool)
            .await
    }

    /// One page of donor aggregates for `segment`.
    pub async fn donor_aggregates(
        pool: &PgPool,
        filter: &ReportFilter,
        segment: DonorSegment,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<DonorAggregateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {DONOR_AGGREGATE_COLUMNS} \
             {DONATION_JOINS} \
             JOIN donors dn ON dn.id = cd.donor_id \
             WHERE {DONATION_FILTERS} \
             GROUP BY dn.id, dn.email, dn.first_name, dn.last_name \
             {having} \
             {order} \
             LIMIT $6 OFFSET $7",
            having = having_clause(8, 9),
            order = order_clause(segment),
        );
        let (min_count, max_count) = segment.count_bounds();
        sqlx::query_as::<_, DonorAggregateRow>(&query)
            .bind(filter.status.as_str())
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.campaign_id)
            .bind(filter.category_id)
            .bind(i64::from(per_page))
            .bind(offset_for_page(page, per_page))
            .bind(min_count)
            .bind(max_count)
            .fetch_all(pool)
            .await
    }

    /// Number of donors in `segment`, for pagination.
    pub async fn count_donor_aggregates(
        pool: &PgPool,
        filter: &ReportFilter,
        segment: DonorSegment,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM ( \
                SELECT dn.id \
                {DONATION_JOINS} \
                JOIN donors dn ON dn.id = cd.donor_id \
                WHERE {DONATION_FILTERS} \
                GROUP BY dn.id \
                {having} \
             ) AS segment_donors",
            having = having_clause(6, 7),
        );
        let (min_count, max_count) = segment.count_bounds();
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(filter.status.as_str())
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.campaign_id)
            .bind(filter.category_id)
            .bind(min_count)
            .bind(max_count)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Per-donation amounts with donor details for the overview's top
    /// donors list.
    pub async fn top_donor_rows(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<DonorAmountRow>, sqlx::Error> {
        let query = format!(
            "SELECT dn.id AS donor_id, dn.email, dn.first_name, dn.last_name, \
                    SUM(cd.amount) AS amount \
             {DONATION_JOINS} \
             JOIN donors dn ON dn.id = cd.donor_id \
             WHERE {DONATION_FILTERS} \
             GROUP BY d.id, dn.id, dn.email, dn.first_name, dn.last_name"
        );
        sqlx::query_as::<_, DonorAmountRow>(&query)
            .bind(filter.status.as_str())
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.campaign_id)
            .bind(filter.category_id)
            .fetch_all(pool)
            .await
    }

    pub async fn gateway_totals(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<GatewayTotalRow>, sqlx::Error> {
        let query = format!(
            "SELECT d.gateway, COUNT(DISTINCT d.id) AS count, SUM(cd.amount) AS amount \
             {DONATION_JOINS} \
             WHERE {DONATION_FILTERS} \
             GROUP BY d.gateway"
        );
        sqlx::query_as::<_, GatewayTotalRow>(&query)
            .bind(filter.status.as_str())
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.campaign_id)
            .bind(filter.category_id)
            .fetch_all(pool)
            .await
    }

    /// Per-donor totals over one comparison window, with each donor's most
    /// recent donation amount and campaign.
    pub async fn window_aggregates(
        pool: &PgPool,
        range: &DateRange,
        status: DonationStatus,
    ) -> Result<Vec<DonorWindowRow>, sqlx::Error> {
        let (from, to) = range.bounds();
        sqlx::query_as::<_, DonorWindowRow>(
            "WITH per_donation AS ( \
                SELECT cd.donor_id, d.id AS donation_id, d.donation_date, \
                       SUM(cd.amount) AS amount, MAX(cd.campaign_name) AS campaign_name \
                FROM donations d \
                JOIN campaign_donations cd ON cd.donation_id = d.id \
                WHERE d.status = $1 AND d.donation_date >= $2 AND d.donation_date < $3 \
                GROUP BY cd.donor_id, d.id, d.donation_date \
             ), ranked AS ( \
                SELECT *, ROW_NUMBER() OVER ( \
                    PARTITION BY donor_id ORDER BY donation_date DESC, donation_id DESC \
                ) AS rn \
                FROM per_donation \
             ) \
             SELECT dn.id AS donor_id, dn.email, dn.first_name, dn.last_name, \
                    SUM(r.amount) AS total_amount, \
                    COUNT(*) AS donation_count, \
                    MAX(r.donation_date) AS last_donation_date, \
                    MAX(r.amount) FILTER (WHERE r.rn = 1) AS last_donation_amount, \
                    MAX(r.campaign_name) FILTER (WHERE r.rn = 1) AS last_campaign \
             FROM ranked r \
             JOIN donors dn ON dn.id = r.donor_id \
             GROUP BY dn.id, dn.email, dn.first_name, dn.last_name",
        )
        .bind(status.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// All-time giving per donor for the given ids.
    pub async fn lifetime_totals(
        pool: &PgPool,
        donor_ids: &[DbId],
        status: DonationStatus,
    ) -> Result<HashMap<DbId, Amount>, sqlx::Error> {
        if donor_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, LifetimeTotalRow>(
            "SELECT cd.donor_id, SUM(cd.amount) AS total_amount \
             FROM campaign_donations cd \
             JOIN donations d ON d.id = cd.donation_id \
             WHERE d.status = $1 AND cd.donor_id = ANY($2) \
             GROUP BY cd.donor_id",
        )
        .bind(status.as_str())
        .bind(donor_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.donor_id, r.total_amount)).collect())
    }

    /// Whether `table` exists in the current schema.
    pub async fn table_exists(pool: &PgPool, table: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                SELECT 1 FROM information_schema.tables \
                WHERE table_schema = current_schema() AND table_name = $1 \
             )",
        )
        .bind(table)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Recent activity from both activity tables, newest first.
    ///
    /// A missing activity table contributes nothing instead of failing.
    pub async fn activities(
        pool: &PgPool,
        range: &DateRange,
        campaign_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<ActivityRecord>, sqlx::Error> {
        let (from, to) = range.bounds();
        let mut records = Vec::new();

        for table in ACTIVITY_TABLES {
            if !Self::table_exists(pool, table).await? {
                tracing::debug!(table, "Activity table missing, skipping");
                continue;
            }
            let (source, query) = match table {
                "donation_activities" => (
                    ActivitySource::Donation,
                    "SELECT a.id, a.type AS activity_type, a.status, a.amount, a.campaign_id, \
                            c.title AS campaign_title, \
                            TRIM(CONCAT(dn.first_name, ' ', dn.last_name)) AS donor_name, \
                            a.donation_id, a.date_recorded \
                     FROM donation_activities a \
                     LEFT JOIN campaigns c ON c.id = a.campaign_id \
                     LEFT JOIN donors dn ON dn.id = a.donor_id \
                     WHERE a.date_recorded >= $1 AND a.date_recorded < $2 \
                       AND ($3::BIGINT IS NULL OR a.campaign_id = $3) \
                     ORDER BY a.date_recorded DESC \
                     LIMIT $4",
                ),
                _ => (
                    ActivitySource::Campaign,
                    "SELECT a.id, a.type AS activity_type, a.status, a.amount, a.campaign_id, \
                            c.title AS campaign_title, \
                            NULL::TEXT AS donor_name, NULL::BIGINT AS donation_id, \
                            a.date_recorded \
                     FROM campaign_activities a \
                     LEFT JOIN campaigns c ON c.id = a.campaign_id \
                     WHERE a.date_recorded >= $1 AND a.date_recorded < $2 \
                       AND ($3::BIGINT IS NULL OR a.campaign_id = $3) \
                     ORDER BY a.date_recorded DESC \
                     LIMIT $4",
                ),
            };
            let rows = sqlx::query_as::<_, ActivityRow>(query)
                .bind(from)
                .bind(to)
                .bind(campaign_id)
                .bind(limit)
                .fetch_all(pool)
                .await?;
            records.extend(rows.into_iter().map(|r| r.into_record(source)));
        }

        records.sort_by(|a, b| b.date_recorded.cmp(&a.date_recorded));
        records.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn having_clause_binds_both_bounds() {
        let clause = having_clause(8, 9);
        assert!(clause.starts_with("HAVING COUNT(DISTINCT d.id) >= $8"));
        assert!(clause.contains("$9::BIGINT IS NULL"));
        assert!(clause.ends_with("<= $9)"));
    }

    #[test]
    fn segment_bounds_never_overlap() {
        let (_, first_time_max) = DonorSegment::FirstTime.count_bounds();
        let (recurring_min, _) = DonorSegment::Recurring.count_bounds();
        assert!(first_time_max.is_some_and(|max| max < recurring_min));
        assert_eq!(DonorSegment::Top.count_bounds(), (1, None));
    }
}
