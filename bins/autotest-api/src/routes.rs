// Router, CORS policy and request tracing

use axum::{
    http::{request::Parts, HeaderValue},
    routing::{get, post, put},
    Router,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Local frontend origins
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://localhost:3000"];

/// Preview deployments: any subdomain of cloud.kavia.ai, optional port
static PREVIEW_ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-zA-Z0-9\-]+\.)*cloud\.kavia\.ai(:\d+)?$")
        .expect("preview origin pattern is valid")
});

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/tests", get(handlers::list_tests).post(handlers::create_test))
        .route("/tests/run", post(handlers::run_tests))
        .route(
            "/tests/:id",
            put(handlers::update_test).delete(handlers::delete_test),
        )
}

/// Full application: routes, shared state, CORS and tracing layers
pub fn app(state: Arc<AppState>) -> Router {
    routes()
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub fn origin_allowed(origin: &str) -> bool {
    ALLOWED_ORIGINS.contains(&origin) || PREVIEW_ORIGIN.is_match(origin)
}

/// Credentialed requests cannot use `*`, so methods and headers are mirrored
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().map(origin_allowed).unwrap_or(false)
            },
        ))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
