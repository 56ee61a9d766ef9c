use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{organization::Organization, user::CurrentUser},
    response::{ApiResponse, ErrorResponse, OrganizationResponse},
    AppState,
};

pub const RETRIEVE_SUCCESS_MESSAGE: &str = "Retrieve Organization successfully";
const INVALID_ID_MESSAGE: &str = "Invalid organization id";

/// Organization id taken from the request path.
///
/// Rejects anything that is not a UUID with a 422 before any other extractor
/// or the store is consulted.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationIdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for OrganizationIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(INVALID_ID_MESSAGE, e.body_text()))?;

        Uuid::parse_str(&raw).map(Self).map_err(|e| {
            tracing::debug!("Rejected organization id '{}': {}", raw, e);
            ApiError::validation(INVALID_ID_MESSAGE, e.to_string())
        })
    }
}

/// Get organization details by ID
#[utoipa::path(
    get,
    path = "/organizations/{org_id}",
    tag = "organizations",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization retrieved successfully", body = OrganizationResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 422, description = "Malformed organization id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization(
    State(state): State<AppState>,
    OrganizationIdPath(org_id): OrganizationIdPath,
    user: CurrentUser,
) -> Result<ApiResponse<Organization>, ApiError> {
    tracing::debug!("User {} fetching organization {}", user.id, org_id);

    match state.store.fetch(org_id).await {
        Ok(Some(organization)) => {
            record_lookup("found");
            Ok(ApiResponse::ok(RETRIEVE_SUCCESS_MESSAGE, organization))
        }
        Ok(None) => {
            record_lookup("not_found");
            tracing::debug!("Organization {} not found", org_id);
            Err(ApiError::organization_not_found())
        }
        Err(e) => {
            record_lookup("error");
            Err(ApiError::Internal(
                e.context(format!("Failed to fetch organization {}", org_id)),
            ))
        }
    }
}

fn record_lookup(outcome: &'static str) {
    metrics::counter!("organization_lookups_total", "outcome" => outcome).increment(1);
}
