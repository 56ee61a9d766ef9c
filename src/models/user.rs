use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub is_super_admin: bool,
}

impl CurrentUser {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            email: None,
            is_super_admin: false,
        }
    }
}
