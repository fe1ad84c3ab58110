//! API Routes
//!
//! Configures the Axum router for the public site and admin panel.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    contact_handler, delete_page_handler, health_handler, invalidate_key_handler,
    invalidate_prefix_handler, list_pages_handler, page_handler, stats_handler,
    upsert_page_handler, AppState,
};
use super::middleware::{rate_limit, RouteLimit};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /pages/:kind` - Cached list of pages of a kind
/// - `GET /pages/:kind/:slug` - Cached page
/// - `POST /contact` - Contact form, rate limited per client
/// - `PUT|DELETE /admin/pages/:kind/:slug` - Page mutations with invalidation
/// - `DELETE /admin/cache?prefix=` - Prefix invalidation
/// - `DELETE /admin/cache/:key` - Single key invalidation
/// - `GET /admin/stats` - Cache and limiter statistics
///
/// # Middleware
/// - Rate limiting: applied per route, only on `/contact`
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let contact_limit = middleware::from_fn_with_state(
        RouteLimit::new(state.contact_limiter.clone(), state.trust_proxy_headers),
        rate_limit,
    );

    Router::new()
        .route("/health", get(health_handler))
        .route("/pages/:kind", get(list_pages_handler))
        .route("/pages/:kind/:slug", get(page_handler))
        .route("/contact", post(contact_handler).route_layer(contact_limit))
        .route(
            "/admin/pages/:kind/:slug",
            put(upsert_page_handler).delete(delete_page_handler),
        )
        .route("/admin/cache", delete(invalidate_prefix_handler))
        .route("/admin/cache/:key", delete(invalidate_key_handler))
        .route("/admin/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
