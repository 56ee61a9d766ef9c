use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::OrganizationStore;
use crate::models::organization::Organization;

#[derive(Clone)]
pub struct PgOrganizationStore {
    pool: PgPool,
}

impl PgOrganizationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, company_name, company_email, industry, organization_type,
                    country, state, address, lga, created_at, updated_at
             FROM organizations
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch organization")
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
