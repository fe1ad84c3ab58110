//! Page Repository
//!
//! In-memory stand-in for the relational content store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

// == Page ==
/// A published page, addressed by `kind` and `slug`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub kind: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

// == Contact Message ==
/// A message submitted through the public contact form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

// == Page Repository ==
/// Pages ordered by `(kind, slug)` plus the contact inbox.
#[derive(Debug, Default)]
pub struct PageRepository {
    pages: RwLock<BTreeMap<(String, String), Page>>,
    inbox: RwLock<Vec<ContactMessage>>,
}

impl PageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a page, returning the stored copy.
    pub fn upsert(&self, kind: &str, slug: &str, title: String, body: String) -> Page {
        let page = Page {
            kind: kind.to_string(),
            slug: slug.to_string(),
            title,
            body,
            updated_at: Utc::now(),
        };
        self.pages
            .write()
            .insert((kind.to_string(), slug.to_string()), page.clone());
        page
    }

    pub fn get(&self, kind: &str, slug: &str) -> Option<Page> {
        self.pages
            .read()
            .get(&(kind.to_string(), slug.to_string()))
            .cloned()
    }

    /// All pages of `kind`, ordered by slug.
    pub fn list(&self, kind: &str) -> Vec<Page> {
        self.pages
            .read()
            .values()
            .filter(|page| page.kind == kind)
            .cloned()
            .collect()
    }

    /// Removes a page. Returns whether it existed.
    pub fn remove(&self, kind: &str, slug: &str) -> bool {
        self.pages
            .write()
            .remove(&(kind.to_string(), slug.to_string()))
            .is_some()
    }

    pub fn submit_contact(&self, name: String, email: String, message: String) {
        self.inbox.write().push(ContactMessage {
            name,
            email,
            message,
            received_at: Utc::now(),
        });
    }

    pub fn contact_count(&self) -> usize {
        self.inbox.read().len()
    }
}
