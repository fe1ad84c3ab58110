//! API Module
//!
//! HTTP handlers, routing and per-route middleware.
//!
//! # Endpoints
//! - `GET /pages/:kind[/:slug]` - Cached page reads
//! - `POST /contact` - Rate limited contact form
//! - `/admin/...` - Page mutations, cache invalidation, statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
