//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for rendered pages
    pub page_cache_ttl: i64,
    /// Page cache sweep interval in seconds
    pub cache_sweep_interval: u64,
    /// Rate limiter sweep interval in seconds
    pub rate_limit_sweep_interval: u64,
    /// Contact form submissions allowed per window
    pub contact_rate_limit: usize,
    /// Contact form window length in seconds
    pub contact_rate_window: u64,
    /// Identify clients by `X-Forwarded-For` / `X-Real-IP` instead of the
    /// socket peer. Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PAGE_CACHE_TTL` - Rendered page TTL in seconds (default: 600)
    /// - `CACHE_SWEEP_INTERVAL` - Cache sweep frequency in seconds (default: 300)
    /// - `RATE_LIMIT_SWEEP_INTERVAL` - Limiter sweep frequency in seconds (default: 60)
    /// - `CONTACT_RATE_LIMIT` - Contact submissions per window (default: 5)
    /// - `CONTACT_RATE_WINDOW` - Contact window in seconds (default: 3600)
    /// - `TRUST_PROXY_HEADERS` - `true` to key limiters on proxy headers (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            page_cache_ttl: env_or("PAGE_CACHE_TTL", defaults.page_cache_ttl),
            cache_sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.cache_sweep_interval)
                .max(1),
            rate_limit_sweep_interval: env_or(
                "RATE_LIMIT_SWEEP_INTERVAL",
                defaults.rate_limit_sweep_interval,
            )
            .max(1),
            contact_rate_limit: env_or("CONTACT_RATE_LIMIT", defaults.contact_rate_limit),
            contact_rate_window: env_or("CONTACT_RATE_WINDOW", defaults.contact_rate_window),
            trust_proxy_headers: env_or("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers),
        }
    }

    /// Cache sweep interval as a `Duration`.
    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval)
    }

    /// Rate limiter sweep interval as a `Duration`.
    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_interval)
    }

    /// Contact form window as a `Duration`.
    pub fn contact_rate_window(&self) -> Duration {
        Duration::from_secs(self.contact_rate_window)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            page_cache_ttl: 600,
            cache_sweep_interval: 300,
            rate_limit_sweep_interval: 60,
            contact_rate_limit: 5,
            contact_rate_window: 3600,
            trust_proxy_headers: false,
        }
    }
}

/// Reads and parses `key`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
