use crate::handlers::organizations;
use crate::AppState;
use axum::{routing::get, Router};

pub fn organization_router() -> Router<AppState> {
    Router::new().route("/:org_id", get(organizations::get_organization))
}
