//! Report queries against a live database.
//!
//! Run with `DATABASE_URL` set and `--ignored`.

use charitable_core::report_args::{DateRange, DonorSegment};
use charitable_core::reports::{summarize_refunds, RefundRecord};
use charitable_core::status::DonationStatus;
use charitable_db::repositories::{ReportFilter, ReportRepo};
use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

fn march() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )
}

async fn seed(pool: &PgPool) {
    sqlx::raw_sql(
        "INSERT INTO campaigns (id, title) VALUES (1, 'Clean Water'), (2, 'School Meals'); \
         INSERT INTO donors (id, email, first_name, last_name) VALUES \
            (1, 'ann@example.org', 'Ann', 'Lee'), \
            (2, 'bob@example.org', 'Bob', NULL), \
            (3, 'cy@example.org', NULL, NULL);",
    )
    .execute(pool)
    .await
    .unwrap();

    // Ann: two donations, Bob: one split across two campaigns, Cy: pending only.
    let donations = [
        (1, "charitable-completed", 5, "stripe", 0.0, None),
        (2, "charitable-completed", 9, "paypal", 0.0, None),
        (3, "charitable-completed", 12, "stripe", 30.0, Some(14)),
        (4, "charitable-pending", 12, "offline", 0.0, None),
    ];
    for (id, status, day, gateway, refund, refund_day) in donations {
        sqlx::query(
            "INSERT INTO donations \
             (id, status, donation_date, gateway, refund_amount, refund_date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id as i64)
        .bind(status)
        .bind(Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap())
        .bind(gateway)
        .bind(refund)
        .bind(refund_day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()))
        .execute(pool)
        .await
        .unwrap();
    }

    sqlx::query(
        "INSERT INTO campaign_donations \
            (donation_id, donor_id, campaign_id, campaign_name, amount) VALUES \
            (1, 1, 1, 'Clean Water', 20.0), \
            (2, 1, 1, 'Clean Water', 40.0), \
            (3, 2, 1, 'Clean Water', 25.0), \
            (3, 2, 2, 'School Meals', 25.0), \
            (4, 3, 2, 'School Meals', 99.0)",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn donor_segments_are_disjoint(pool: PgPool) {
    seed(&pool).await;
    let filter = ReportFilter::for_range(&march(), DonationStatus::Completed);

    let recurring = ReportRepo::donor_aggregates(&pool, &filter, DonorSegment::Recurring, 1, 10)
        .await
        .unwrap();
    let first_time = ReportRepo::donor_aggregates(&pool, &filter, DonorSegment::FirstTime, 1, 10)
        .await
        .unwrap();

    assert_eq!(recurring.iter().map(|r| r.donor_id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(first_time.iter().map(|r| r.donor_id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(first_time[0].total_amount, 50.0);
    assert_eq!(first_time[0].donation_count, 1);

    let top_count = ReportRepo::count_donor_aggregates(&pool, &filter, DonorSegment::Top)
        .await
        .unwrap();
    assert_eq!(top_count, 2, "pending donor excluded by status filter");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn campaign_filter_limits_amounts(pool: PgPool) {
    seed(&pool).await;
    let mut filter = ReportFilter::for_range(&march(), DonationStatus::Completed);
    filter.campaign_id = Some(2);

    let rows = ReportRepo::donations_in_range(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 25.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn split_refund_rows_dedupe_in_core(pool: PgPool) {
    seed(&pool).await;
    let filter = ReportFilter::for_range(&march(), DonationStatus::Completed);

    let rows = ReportRepo::refund_rows(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 2, "one row per campaign split");

    let records: Vec<RefundRecord> = rows.into_iter().map(Into::into).collect();
    let summary = summarize_refunds(&records);
    assert_eq!(summary.total_count, 1);
    assert_eq!(summary.total_amount, 30.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn gateway_totals_and_lifetime(pool: PgPool) {
    seed(&pool).await;
    let filter = ReportFilter::for_range(&march(), DonationStatus::Completed);

    let totals = ReportRepo::gateway_totals(&pool, &filter).await.unwrap();
    let stripe = totals.iter().find(|t| t.gateway == "stripe").unwrap();
    assert_eq!(stripe.count, 2);
    assert_eq!(stripe.amount, 70.0);

    let lifetime = ReportRepo::lifetime_totals(&pool, &[1, 2, 3], DonationStatus::Completed)
        .await
        .unwrap();
    assert_eq!(lifetime.get(&1), Some(&60.0));
    assert_eq!(lifetime.get(&3), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn window_aggregates_pick_latest_donation(pool: PgPool) {
    seed(&pool).await;
    let rows = ReportRepo::window_aggregates(&pool, &march(), DonationStatus::Completed)
        .await
        .unwrap();
    let ann = rows.iter().find(|r| r.donor_id == 1).unwrap();
    assert_eq!(ann.donation_count, 2);
    assert_eq!(ann.total_amount, 60.0);
    assert_eq!(ann.last_donation_amount, Some(40.0));
    assert_eq!(ann.last_campaign.as_deref(), Some("Clean Water"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn missing_activity_table_is_skipped(pool: PgPool) {
    sqlx::query("DROP TABLE donation_activities")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::raw_sql(
        "INSERT INTO campaigns (id, title) VALUES (1, 'Clean Water'); \
         INSERT INTO campaign_activities (campaign_id, type, date_recorded) \
         VALUES (1, 'campaign_created', '2024-03-02T12:00:00Z');",
    )
    .execute(&pool)
    .await
    .unwrap();

    let records = ReportRepo::activities(&pool, &march(), None, 20).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].campaign_title.as_deref(), Some("Clean Water"));
}
