use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::{health, organizations};
use crate::models::organization::Organization;
use crate::response::{ErrorResponse, OrganizationResponse};

/// Generate the OpenAPI documentation for the entire API.
///
/// Paths of [`ApiRoutesDoc`] are relative to the configured API prefix; use
/// [`document`] to get the document as it is served.
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        health::check,
    ),
    components(
        schemas(
            health::HealthResponse,
            Organization,
            OrganizationResponse,
            ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "organizations", description = "Organization lookup"),
    )
)]
pub struct ApiDoc;

/// Endpoints mounted under `API_PREFIX`
#[derive(OpenApi)]
#[openapi(paths(
    // Organization endpoints
    organizations::get_organization,
))]
pub struct ApiRoutesDoc;

/// The full document with API routes listed under `api_prefix`.
pub fn document(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut routes = ApiRoutesDoc::openapi();
    routes.paths.paths = std::mem::take(&mut routes.paths.paths)
        .into_iter()
        .map(|(path, item)| (format!("{}{}", api_prefix, path), item))
        .collect();

    let mut doc = ApiDoc::openapi();
    doc.merge(routes);
    doc
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
