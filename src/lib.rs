use axum::Router;
use std::sync::Arc;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub config: config::Settings,
    pub store: Arc<dyn store::OrganizationStore>,
    pub authenticator: Arc<dyn auth::Authenticator>,
}

/// Create the main Axum application router
pub async fn create_app(state: AppState) -> Router {
    let api_prefix = state.config.server.api_prefix.clone();
    // Register API documentation, listed under the same prefix as the router
    let openapi = openapi::document(&api_prefix);

    Router::new()
        .nest(&api_prefix, routes::api::api_router())
        // Health and monitoring endpoints
        .merge(routes::health::health_router())
        // Serve Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}
