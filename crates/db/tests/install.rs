//! Installer and option/transient storage against a live database.

use std::time::Duration;

use charitable_core::cache::TransientStore;
use charitable_core::roles::{CAP_MANAGE_OPTIONS, ROLE_ADMINISTRATOR};
use charitable_core::settings::{CharitableSettings, ACTIVE_ADDONS_OPTION, SETTINGS_OPTION};
use charitable_db::install::Installer;
use charitable_db::repositories::{OptionRepo, TransientRepo};
use charitable_db::transient_store::PgTransientStore;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn installer_is_idempotent(pool: PgPool) {
    let first = Installer::new(&pool, "1.8.0").run(Utc::now()).await.unwrap();
    assert!(first.settings_seeded);
    assert!(first.upgrade_logged);
    assert!(first.missing_tables.is_empty());

    let second = Installer::new(&pool, "1.8.0").run(Utc::now()).await.unwrap();
    assert!(!second.settings_seeded);
    assert!(!second.upgrade_logged);

    let (caps,): (Vec<String>,) = sqlx::query_as("SELECT capabilities FROM roles WHERE name = $1")
        .bind(ROLE_ADMINISTRATOR)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(caps.iter().any(|c| c == CAP_MANAGE_OPTIONS));

    let stored = OptionRepo::get(&pool, SETTINGS_OPTION).await.unwrap();
    let settings = CharitableSettings::from_value(stored);
    assert_eq!(settings, CharitableSettings::default());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn inactive_square_addon_settings_are_removed(pool: PgPool) {
    OptionRepo::set(
        &pool,
        SETTINGS_OPTION,
        &json!({
            "default_gateway": "square",
            "active_gateways": ["square", "offline"],
            "gateways_square": { "mode": "live" }
        }),
    )
    .await
    .unwrap();
    OptionRepo::set(&pool, ACTIVE_ADDONS_OPTION, &json!(["charitable-recurring"]))
        .await
        .unwrap();

    let report = Installer::new(&pool, "1.8.0").run(Utc::now()).await.unwrap();
    assert!(report.gateway_settings_removed);

    let stored = OptionRepo::get(&pool, SETTINGS_OPTION).await.unwrap();
    let settings = CharitableSettings::from_value(stored);
    assert_eq!(settings.default_gateway, "offline");
    assert_eq!(settings.active_gateways, vec!["offline".to_string()]);
    assert!(!settings.extra.contains_key("gateways_square"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live Postgres"]
async fn transients_expire_and_purge(pool: PgPool) {
    let store = PgTransientStore::new(pool.clone());
    store.set("live", json!({"a": 1}), Duration::from_secs(3600)).await.unwrap();
    store.set("dead", json!(2), Duration::ZERO).await.unwrap();

    assert_eq!(store.get("live").await.unwrap(), Some(json!({"a": 1})));
    assert_eq!(store.get("dead").await.unwrap(), None);

    assert_eq!(TransientRepo::purge_expired(&pool).await.unwrap(), 1);
    store.delete("live").await.unwrap();
    assert_eq!(store.get("live").await.unwrap(), None);
}
