//! Response DTOs for the CMS edge API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for admin page mutations
#[derive(Debug, Clone, Serialize)]
pub struct PageSavedResponse {
    /// Success message
    pub message: String,
    pub kind: String,
    pub slug: String,
    /// Cache entries invalidated by the write
    pub invalidated: usize,
}

impl PageSavedResponse {
    /// Creates a new PageSavedResponse
    pub fn new(
        action: &str,
        kind: impl Into<String>,
        slug: impl Into<String>,
        invalidated: usize,
    ) -> Self {
        let kind = kind.into();
        let slug = slug.into();
        Self {
            message: format!("Page '{}/{}' {} successfully", kind, slug, action),
            kind,
            slug,
            invalidated,
        }
    }
}

/// Response body for admin cache invalidation
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(target: &str, removed: usize) -> Self {
        Self {
            message: format!("Invalidated {} cache entries for '{}'", removed, target),
            removed,
        }
    }
}

/// Response body for POST /contact
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub message: String,
}

impl ContactResponse {
    pub fn received() -> Self {
        Self {
            message: "Thanks, your message has been received".to_string(),
        }
    }
}

/// Per-limiter figures reported by GET /admin/stats
#[derive(Debug, Clone, Serialize)]
pub struct LimiterStats {
    pub route: String,
    pub limit: usize,
    pub window_secs: u64,
    /// Identifiers currently holding timestamps
    pub tracked_identifiers: usize,
}

/// Response body for GET /admin/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub limiters: Vec<LimiterStats>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(cache: CacheStats, limiters: Vec<LimiterStats>) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            limiters,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body, also used for throttled requests
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_saved_response_serialize() {
        let resp = PageSavedResponse::new("saved", "products", "widget-9", 3);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("products/widget-9"));
        assert!(json.contains("\"invalidated\":3"));
    }

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new("page:products", 2);
        assert_eq!(resp.removed, 2);
        assert!(resp.message.contains("page:products"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let cache = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(cache, Vec::new());
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Too many requests");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Too many requests"));
    }
}
