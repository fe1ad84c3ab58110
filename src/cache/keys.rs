//! Cache key scheme for rendered pages.
//!
//! Keys follow `page:<kind>[:<slug>]`. A kind's list key is a literal prefix
//! of every detail key under it, so `page_prefix(kind)` invalidates both.
//! Segments must pass [`is_valid_segment`]; otherwise `page_list("a:b")` and
//! `page_detail("a", "b")` would name the same entry.

/// Namespace shared by every page key.
pub const PAGE_NAMESPACE: &str = "page";

/// Separator between key segments.
pub const SEPARATOR: char = ':';

/// Returns true if `segment` can be used as a kind or slug in a key.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(SEPARATOR)
}

/// Key for the rendered list of all pages of `kind`.
pub fn page_list(kind: &str) -> String {
    format!("{PAGE_NAMESPACE}{SEPARATOR}{kind}")
}

/// Key for the rendered detail page `kind/slug`.
pub fn page_detail(kind: &str, slug: &str) -> String {
    format!("{PAGE_NAMESPACE}{SEPARATOR}{kind}{SEPARATOR}{slug}")
}

/// Prefix covering the list page and every detail page of `kind`.
pub fn page_prefix(kind: &str) -> String {
    page_list(kind)
}
