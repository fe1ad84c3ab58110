//! API Handlers
//!
//! HTTP request handlers for the public site and the admin panel. Page reads
//! go through the page cache (cache-aside); admin writes invalidate it by
//! key prefix.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

use crate::cache::{keys, CacheStore};
use crate::config::Config;
use crate::content::{render, PageRepository};
use crate::error::{AppError, Result};
use crate::models::{
    ContactRequest, ContactResponse, HealthResponse, InvalidateQuery, InvalidateResponse,
    LimiterStats, PageSavedResponse, StatsResponse, UpsertPageRequest,
};
use crate::ratelimit::RateLimiter;

/// Response header reporting whether a page came from the cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
///
/// Built once at startup and handed to the router; nothing here is global.
#[derive(Clone)]
pub struct AppState {
    /// Rendered page cache
    pub cache: Arc<CacheStore>,
    /// Content store
    pub pages: Arc<PageRepository>,
    /// Limiter guarding POST /contact
    pub contact_limiter: Arc<RateLimiter>,
    /// TTL in seconds for rendered pages
    pub page_ttl: i64,
    /// Key rate limits on proxy headers instead of the socket peer
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        cache: CacheStore,
        pages: PageRepository,
        contact_limiter: RateLimiter,
        page_ttl: i64,
    ) -> Self {
        Self {
            cache: Arc::new(cache),
            pages: Arc::new(pages),
            contact_limiter: Arc::new(contact_limiter),
            page_ttl,
            trust_proxy_headers: false,
        }
    }

    /// Sets whether rate limits trust `X-Forwarded-For` / `X-Real-IP`.
    pub fn with_trusted_proxy(mut self, trust_proxy_headers: bool) -> Self {
        self.trust_proxy_headers = trust_proxy_headers;
        self
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CacheStore::new(),
            PageRepository::new(),
            RateLimiter::new(config.contact_rate_limit, config.contact_rate_window()),
            config.page_cache_ttl,
        )
        .with_trusted_proxy(config.trust_proxy_headers)
    }

    /// Returns the cached value for `key`, or renders, caches and returns it.
    ///
    /// Rendering happens outside the cache lock. If an invalidation lands
    /// while rendering, the result is served but not cached.
    fn cached_html<F>(&self, key: String, render: F) -> Result<Response>
    where
        F: FnOnce() -> Result<String>,
    {
        let generation = self.cache.generation();
        if let Some(html) = self.cache.get(&key) {
            debug!(key = %key, "Page cache hit");
            return Ok(html_response(html, "HIT"));
        }

        let html = render()?;
        if !self
            .cache
            .set_if_unchanged(key.clone(), html.clone(), self.page_ttl, generation)
        {
            debug!(key = %key, "Page invalidated during render, not cached");
        }
        Ok(html_response(html, "MISS"))
    }
}

/// Rejects kinds and slugs that would not map to a unique cache key.
fn ensure_segments(segments: &[&str]) -> Result<()> {
    match segments.iter().find(|s| !keys::is_valid_segment(s)) {
        Some(bad) => Err(AppError::InvalidRequest(format!(
            "Invalid path segment '{}': must be non-empty and not contain '{}'",
            bad,
            keys::SEPARATOR
        ))),
        None => Ok(()),
    }
}

fn html_response(html: String, cache_status: &'static str) -> Response {
    ([(CACHE_STATUS_HEADER, cache_status)], Html(html)).into_response()
}

/// Handler for GET /pages/:kind
pub async fn list_pages_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response> {
    ensure_segments(&[kind.as_str()])?;
    state.cached_html(keys::page_list(&kind), || {
        let pages = state.pages.list(&kind);
        Ok(render::page_list(&kind, &pages))
    })
}

/// Handler for GET /pages/:kind/:slug
pub async fn page_handler(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> Result<Response> {
    ensure_segments(&[kind.as_str(), slug.as_str()])?;
    state.cached_html(keys::page_detail(&kind, &slug), || {
        let page = state
            .pages
            .get(&kind, &slug)
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", kind, slug)))?;
        Ok(render::page_detail(&page))
    })
}

/// Handler for POST /contact
///
/// Only reached when the contact limiter admits the request.
pub async fn contact_handler(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    state.pages.submit_contact(req.name, req.email, req.message);
    info!("Contact message received");

    Ok((StatusCode::ACCEPTED, Json(ContactResponse::received())))
}

/// Handler for PUT /admin/pages/:kind/:slug
///
/// Saves the page, then drops the cached list and every cached page of the
/// same kind.
pub async fn upsert_page_handler(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
    Json(req): Json<UpsertPageRequest>,
) -> Result<Json<PageSavedResponse>> {
    ensure_segments(&[kind.as_str(), slug.as_str()])?;
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    state.pages.upsert(&kind, &slug, req.title, req.body);
    let invalidated = state.cache.delete_by_prefix(&keys::page_prefix(&kind));
    info!(kind = %kind, slug = %slug, invalidated, "Page saved");

    Ok(Json(PageSavedResponse::new("saved", kind, slug, invalidated)))
}

/// Handler for DELETE /admin/pages/:kind/:slug
pub async fn delete_page_handler(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> Result<Json<PageSavedResponse>> {
    ensure_segments(&[kind.as_str(), slug.as_str()])?;
    if !state.pages.remove(&kind, &slug) {
        return Err(AppError::NotFound(format!("{}/{}", kind, slug)));
    }

    let invalidated = state.cache.delete_by_prefix(&keys::page_prefix(&kind));
    info!(kind = %kind, slug = %slug, invalidated, "Page deleted");

    Ok(Json(PageSavedResponse::new("deleted", kind, slug, invalidated)))
}

/// Handler for DELETE /admin/cache?prefix=...
pub async fn invalidate_prefix_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>> {
    if query.prefix.is_empty() {
        return Err(AppError::InvalidRequest("Prefix cannot be empty".to_string()));
    }

    let removed = state.cache.delete_by_prefix(&query.prefix);
    info!(prefix = %query.prefix, removed, "Cache prefix invalidated");

    Ok(Json(InvalidateResponse::new(&query.prefix, removed)))
}

/// Handler for DELETE /admin/cache/:key
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = usize::from(state.cache.delete(&key));
    Json(InvalidateResponse::new(&key, removed))
}

/// Handler for GET /admin/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let limiter = &state.contact_limiter;
    let limiters = vec![LimiterStats {
        route: "/contact".to_string(),
        limit: limiter.limit(),
        window_secs: limiter.window().as_secs(),
        tracked_identifiers: limiter.tracked_identifiers(),
    }];

    Json(StatsResponse::new(state.cache.stats(), limiters))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
