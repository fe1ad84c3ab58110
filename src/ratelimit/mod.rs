//! Rate Limiting Module
//!
//! Sliding window admission control applied per route.

mod limiter;

pub use limiter::{Decision, RateLimiter};
