//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles: cache-aside page reads, invalidation
//! after admin writes, and throttling of the contact form.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use cms_edge::{
    api::create_router, cache::CacheStore, clock::ManualClock, content::PageRepository,
    ratelimit::RateLimiter, AppState,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

const HOUR: Duration = Duration::from_secs(3600);

/// State behind a trusted reverse proxy, so tests can pick the client via
/// `X-Forwarded-For`.
fn create_state(clock: Arc<ManualClock>) -> AppState {
    create_direct_state(clock).with_trusted_proxy(true)
}

/// State exposed directly to clients: proxy headers are ignored.
fn create_direct_state(clock: Arc<ManualClock>) -> AppState {
    AppState::new(
        CacheStore::with_clock(clock.clone()),
        PageRepository::new(),
        RateLimiter::with_clock(5, HOUR, clock),
        600,
    )
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache = response
        .headers()
        .get("x-cache")
        .map(|v| v.to_str().unwrap().to_string());
    (status, cache, body_to_string(response.into_body()).await)
}

async fn put_page(app: &Router, kind: &str, slug: &str, title: &str, body: &str) -> Value {
    let payload = serde_json::json!({ "title": title, "body": body }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/admin/pages/{kind}/{slug}"))
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

async fn post_contact(app: &Router, client: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header("content-type", "application/json")
                .header("x-forwarded-for", client)
                .body(Body::from(
                    r#"{"name":"Ada","email":"ada@example.com","message":"Hello"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

// == Cache-Aside Reads ==

#[tokio::test]
async fn test_page_read_is_cached_until_ttl() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_state(clock.clone()));

    put_page(&app, "products", "widget-9", "Widget 9", "Detects things").await;

    let (status, cache, body) = get(&app, "/pages/products/widget-9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("MISS"));
    assert!(body.contains("Widget 9"));

    let (_, cache, _) = get(&app, "/pages/products/widget-9").await;
    assert_eq!(cache.as_deref(), Some("HIT"));

    clock.advance(Duration::from_secs(600));
    let (_, cache, _) = get(&app, "/pages/products/widget-9").await;
    assert_eq!(cache.as_deref(), Some("MISS"));
}

#[tokio::test]
async fn test_admin_write_invalidates_list_and_detail() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_state(clock));

    put_page(&app, "products", "widget-9", "Widget 9", "v1").await;
    put_page(&app, "news", "launch", "Launch", "news").await;

    get(&app, "/pages/products").await;
    get(&app, "/pages/products/widget-9").await;
    get(&app, "/pages/news/launch").await;

    let saved = put_page(&app, "products", "widget-9", "Widget 9", "v2").await;
    assert_eq!(saved["invalidated"], 2);

    let (_, cache, body) = get(&app, "/pages/products/widget-9").await;
    assert_eq!(cache.as_deref(), Some("MISS"));
    assert!(body.contains("v2"));

    let (_, cache, _) = get(&app, "/pages/products").await;
    assert_eq!(cache.as_deref(), Some("MISS"));

    // Other kinds stay cached
    let (_, cache, _) = get(&app, "/pages/news/launch").await;
    assert_eq!(cache.as_deref(), Some("HIT"));
}

#[tokio::test]
async fn test_admin_delete_page() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_state(clock));

    put_page(&app, "news", "old", "Old", "gone soon").await;
    get(&app, "/pages/news/old").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/admin/pages/news/old")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _, _) = get(&app, "/pages/news/old").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Admin Cache Endpoints ==

#[tokio::test]
async fn test_prefix_invalidation_endpoint() {
    let clock = Arc::new(ManualClock::new(0));
    let state = create_state(clock);
    state.cache.set("page:products", "A".to_string(), 600);
    state.cache.set("page:products:cat1", "B".to_string(), 600);
    state.cache.set("page:other", "C".to_string(), 600);
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/admin/cache?prefix=page:products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);

    assert!(state.cache.get("page:products").is_none());
    assert!(state.cache.get("page:products:cat1").is_none());
    assert_eq!(state.cache.get("page:other").as_deref(), Some("C"));
}

#[tokio::test]
async fn test_key_invalidation_endpoint() {
    let clock = Arc::new(ManualClock::new(0));
    let state = create_state(clock);
    state.cache.set("page:news", "list".to_string(), 600);
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/admin/cache/page:news")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn test_stats_endpoint() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_state(clock));

    put_page(&app, "news", "a", "A", "").await;
    get(&app, "/pages/news/a").await; // miss
    get(&app, "/pages/news/a").await; // hit
    post_contact(&app, "198.51.100.1").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cache"]["hits"], 1);
    assert_eq!(json["cache"]["misses"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["limiters"][0]["route"], "/contact");
    assert_eq!(json["limiters"][0]["tracked_identifiers"], 1);
}

#[tokio::test]
async fn test_separator_in_kind_cannot_shadow_detail_page() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_state(clock));

    put_page(&app, "a", "b", "DetailTitle", "Body").await;

    let (status, cache, _) = get(&app, "/pages/a:b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cache, None);

    let (status, cache, body) = get(&app, "/pages/a/b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("MISS"));
    assert!(body.contains("DetailTitle"));
}

// == Rate Limiting ==

async fn post_contact_from(app: &Router, peer: SocketAddr, forwarded_for: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header("content-type", "application/json")
                .header("x-forwarded-for", forwarded_for)
                .extension(ConnectInfo(peer))
                .body(Body::from(
                    r#"{"name":"Ada","email":"ada@example.com","message":"Hello"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_quota() {
    let clock = Arc::new(ManualClock::new(0));
    let state = create_direct_state(clock);
    let app = create_router(state.clone());
    let peer = SocketAddr::from(([198, 51, 100, 20], 40000));

    for i in 1..=5 {
        let spoofed = format!("1.1.1.{i}");
        assert_eq!(
            post_contact_from(&app, peer, &spoofed).await,
            StatusCode::ACCEPTED
        );
    }
    assert_eq!(
        post_contact_from(&app, peer, "1.1.1.6").await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(state.contact_limiter.tracked_identifiers(), 1);

    // A different socket peer still has its own quota
    let other = SocketAddr::from(([198, 51, 100, 21], 40000));
    assert_eq!(
        post_contact_from(&app, other, "1.1.1.6").await,
        StatusCode::ACCEPTED
    );
}

#[tokio::test]
async fn test_rotating_forwarded_for_without_peer_shares_quota() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_direct_state(clock));

    for i in 1..=5 {
        let spoofed = format!("1.1.1.{i}");
        assert_eq!(post_contact(&app, &spoofed).await, StatusCode::ACCEPTED);
    }
    assert_eq!(
        post_contact(&app, "1.1.1.6").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_contact_form_throttling_scenario() {
    let clock = Arc::new(ManualClock::new(0));
    let state = create_state(clock.clone());
    let app = create_router(state.clone());

    for _ in 0..5 {
        assert_eq!(post_contact(&app, "1.2.3.4").await, StatusCode::ACCEPTED);
    }

    clock.advance(Duration::from_secs(10));
    assert_eq!(
        post_contact(&app, "1.2.3.4").await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // The handler never ran for the throttled request
    assert_eq!(state.pages.contact_count(), 5);

    clock.set(3_601_000);
    assert_eq!(post_contact(&app, "1.2.3.4").await, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_contact_clients_are_independent() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(create_state(clock));

    for _ in 0..5 {
        post_contact(&app, "1.1.1.1").await;
    }
    assert_eq!(
        post_contact(&app, "1.1.1.1").await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(post_contact(&app, "2.2.2.2").await, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_throttled_response_body() {
    let clock = Arc::new(ManualClock::new(0));
    let app = create_router(AppState::new(
        CacheStore::with_clock(clock.clone()),
        PageRepository::new(),
        RateLimiter::with_clock(0, HOUR, clock),
        600,
    ));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"A","email":"a@b","message":"m"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "3600");
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Too many requests"));
}

#[tokio::test]
async fn test_invalid_contact_still_consumes_quota() {
    let clock = Arc::new(ManualClock::new(0));
    let state = create_state(clock);
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header("content-type", "application/json")
                .header("x-forwarded-for", "5.6.7.8")
                .body(Body::from(r#"{"name":"","email":"a@b","message":"m"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.contact_limiter.tracked_identifiers(), 1);
}
