use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::organization::Organization;

/// Read access to persisted organizations
#[async_trait]
pub trait OrganizationStore: Send + Sync + 'static {
    /// Fetch the organization with the given id, if any
    async fn fetch(&self, id: Uuid) -> Result<Option<Organization>>;

    /// Perform a health check on the backing store
    async fn health_check(&self) -> Result<()>;
}

pub mod postgres;

pub use postgres::PgOrganizationStore;
