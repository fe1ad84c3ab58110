//! Minimal HTML rendering for pages.

use super::Page;

/// Renders a single page.
pub fn page_detail(page: &Page) -> String {
    format!(
        "<article><h1>{}</h1><div>{}</div><footer>Updated {}</footer></article>",
        escape_html(&page.title),
        escape_html(&page.body),
        page.updated_at.to_rfc3339()
    )
}

/// Renders the index of all pages of `kind`.
pub fn page_list(kind: &str, pages: &[Page]) -> String {
    let items: String = pages
        .iter()
        .map(|page| {
            format!(
                "<li><a href=\"/pages/{}/{}\">{}</a></li>",
                escape_html(&page.kind),
                escape_html(&page.slug),
                escape_html(&page.title)
            )
        })
        .collect();

    format!("<section><h1>{}</h1><ul>{}</ul></section>", escape_html(kind), items)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
