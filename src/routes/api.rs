use crate::AppState;
use axum::Router;

pub fn api_router() -> Router<AppState> {
    // Mount organization routes under /organizations prefix
    Router::new().nest("/organizations", super::organizations::organization_router())
}
