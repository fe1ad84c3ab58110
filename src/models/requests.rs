//! Request DTOs for the CMS edge API
//!
//! Defines the structure of incoming HTTP request bodies and queries.

use serde::Deserialize;

/// Request body for PUT /admin/pages/:kind/:slug
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPageRequest {
    /// Page title
    pub title: String,
    /// Page body (plain text, escaped on render)
    #[serde(default)]
    pub body: String,
}

impl UpsertPageRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /contact
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if !self.email.contains('@') {
            return Some("Email address is invalid".to_string());
        }
        if self.message.trim().is_empty() {
            return Some("Message cannot be empty".to_string());
        }
        None
    }
}

/// Query for DELETE /admin/cache
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateQuery {
    /// Key prefix to invalidate
    pub prefix: String,
}
