//! Rate limiting middleware
//!
//! Wraps individual routes with a [`RateLimiter`]. Throttled requests get a
//! 429 and never reach the wrapped handler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::models::ErrorResponse;
use crate::ratelimit::{Decision, RateLimiter};

/// Identifier used when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// State for one rate-limited route.
#[derive(Debug, Clone)]
pub struct RouteLimit {
    /// Limiter shared with the stats endpoint and sweeper
    pub limiter: Arc<RateLimiter>,
    /// Key on proxy headers instead of the socket peer
    pub trust_proxy_headers: bool,
}

impl RouteLimit {
    pub fn new(limiter: Arc<RateLimiter>, trust_proxy_headers: bool) -> Self {
        Self {
            limiter,
            trust_proxy_headers,
        }
    }
}

/// Consults the route's limiter before running the rest of the stack.
///
/// Install per route with
/// `route_layer(middleware::from_fn_with_state(route_limit, rate_limit))`.
pub async fn rate_limit(
    State(route): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_identifier(&request, route.trust_proxy_headers);

    match route.limiter.evaluate(&client) {
        Decision::Allowed { remaining } => {
            debug!(client = %client, remaining, "Request admitted");
            next.run(request).await
        }
        Decision::Denied { retry_after } => {
            warn!(
                client = %client,
                path = %request.uri().path(),
                "Rate limit exceeded"
            );
            throttled_response(retry_after)
        }
    }
}

/// Resolves the client address from the socket peer.
///
/// With `trust_proxy_headers`, the first `X-Forwarded-For` hop and then
/// `X-Real-IP` take precedence. Otherwise those headers are client-controlled
/// and ignored.
pub fn client_identifier(request: &Request, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = proxy_client(request) {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn proxy_client(request: &Request) -> Option<String> {
    let headers = request.headers();

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Create a 429 Too Many Requests response
fn throttled_response(retry_after: Duration) -> Response {
    // Round up so clients never retry early
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, secs.max(1).to_string())],
        Json(ErrorResponse::new("Too many requests. Try again later.")),
    )
        .into_response()
}
