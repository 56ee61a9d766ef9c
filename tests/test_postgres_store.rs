//! Runs against a live Postgres named by `DATABASE_URL`:
//! `cargo test --test test_postgres_store -- --ignored`

mod utils;

use orgbase::config::{PoolSettings, Settings};
use orgbase::db;
use orgbase::store::{OrganizationStore, PgOrganizationStore};
use uuid::Uuid;

async fn setup_store() -> PgOrganizationStore {
    let settings = Settings::load().expect("Failed to load settings");
    let pool = db::create_pool(&settings.database, &PoolSettings::default())
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    PgOrganizationStore::new(pool)
}

#[tokio::test]
#[ignore]
async fn test_postgres_fetch_existing_and_missing() {
    let store = setup_store().await;

    let mut organization = utils::organization("Test Organization");
    organization.industry = Some("Technology".to_string());

    sqlx::query(
        "INSERT INTO organizations (id, company_name, industry, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(organization.id)
    .bind(&organization.company_name)
    .bind(&organization.industry)
    .bind(organization.created_at)
    .bind(organization.updated_at)
    .execute(store.pool())
    .await
    .expect("Failed to insert organization");

    let fetched = store
        .fetch(organization.id)
        .await
        .expect("Failed to fetch organization")
        .expect("Organization not found");
    assert_eq!(fetched.id, organization.id);
    assert_eq!(fetched.company_name, "Test Organization");
    assert_eq!(fetched.industry.as_deref(), Some("Technology"));
    assert!(fetched.company_email.is_none());

    assert!(store
        .fetch(Uuid::now_v7())
        .await
        .expect("Failed to fetch organization")
        .is_none());

    sqlx::query("DELETE FROM organizations WHERE id = $1")
        .bind(organization.id)
        .execute(store.pool())
        .await
        .expect("Failed to clean up organization");

    store.health_check().await.expect("Health check failed");
}
