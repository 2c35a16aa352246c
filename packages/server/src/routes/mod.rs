use axum::{
    Router,
    routing::{MethodRouter, get},
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;
use crate::handlers::{self, fallback};
use crate::state::AppState;

/// Every area lives on a single path; the `resource` query parameter picks
/// the handler inside it.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            area(get(handlers::students::handle_get)
                .post(handlers::students::handle_post)
                .put(handlers::students::handle_put)
                .delete(handlers::students::handle_delete)),
        )
        .route(
            "/assignments",
            area(get(handlers::assignments::handle_get)
                .post(handlers::assignments::handle_post)
                .put(handlers::assignments::handle_put)
                .delete(handlers::assignments::handle_delete)),
        )
        .route(
            "/weekly",
            area(get(handlers::weekly::handle_get)
                .post(handlers::weekly::handle_post)
                .put(handlers::weekly::handle_put)
                .delete(handlers::weekly::handle_delete)),
        )
        .route(
            "/discussion",
            area(get(handlers::discussion::handle_get)
                .post(handlers::discussion::handle_post)
                .put(handlers::discussion::handle_put)
                .delete(handlers::discussion::handle_delete)),
        )
}

/// Answer preflight on every area and turn any other method into a `405`
/// envelope.
fn area(methods: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods
        .options(fallback::preflight)
        .fallback(fallback::method_not_allowed)
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .max_age(std::time::Duration::from_secs(config.max_age));

    let origins: Vec<axum::http::HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
