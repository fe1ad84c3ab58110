//! Request and Response models for the CMS edge API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ContactRequest, InvalidateQuery, UpsertPageRequest};
pub use responses::{
    ContactResponse, ErrorResponse, HealthResponse, InvalidateResponse, LimiterStats,
    PageSavedResponse, StatsResponse,
};
