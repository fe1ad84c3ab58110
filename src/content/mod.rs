//! Content Module
//!
//! Page storage and rendering consumed by the public and admin handlers.

pub mod render;
mod repository;

pub use repository::{ContactMessage, Page, PageRepository};
