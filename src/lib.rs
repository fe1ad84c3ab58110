//! CMS Edge - request-path caching and admission control for a CMS
//!
//! Provides a time-bounded page cache with prefix invalidation and per-route
//! sliding window rate limiting, each kept bounded by a background sweeper.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweeper;
