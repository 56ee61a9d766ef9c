use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow, ToSchema)]
pub struct Organization {
    /// Unique organization ID
    pub id: Uuid,
    /// Registered company name
    pub company_name: String,
    /// Contact email for the company
    pub company_email: Option<String>,
    pub industry: Option<String>,
    /// e.g. "Tech", "NGO"
    pub organization_type: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    /// Local government area
    pub lga: Option<String>,
    /// When the organization was created
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}
