use super::handlers::{auth, health};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder, tag::TagBuilder};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::register::register))
        .routes(routes!(auth::verification::verify_email))
        .routes(routes!(auth::login::login))
        .routes(routes!(auth::session::refresh_token))
        .routes(routes!(auth::session::logout))
        .routes(routes!(auth::profile::profile))
        .routes(routes!(auth::oauth::google_redirect))
        .routes(routes!(auth::oauth::google_callback))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    OpenApiBuilder::new()
        .info(info)
        .tags(Some([
            TagBuilder::new()
                .name("auth")
                .description(Some("Registration, verification and sessions"))
                .build(),
            TagBuilder::new()
                .name("oauth")
                .description(Some("Federated sign-in via Google"))
                .build(),
            TagBuilder::new()
                .name("health")
                .description(Some("Service and database health"))
                .build(),
        ]))
        .build()
}
