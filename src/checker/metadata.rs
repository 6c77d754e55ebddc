// src/checker/metadata.rs
// =============================================================================
// This module pulls page metadata out of HTML.
//
// We look at two things:
// - The text of the <title> element
// - The content attribute of <meta name="description">
//
// We use the `scraper` crate which parses HTML into a DOM and lets us query
// it with CSS selectors. It is built on html5ever, so broken markup still
// parses into *something* instead of failing.
// =============================================================================

use scraper::{Html, Selector};

/// Metadata found on a page. `None` means the page didn't have it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

// Extracts the title and description from an HTML document
//
// Parameters:
//   html: the raw response body (borrowed as &str)
//
// Returns: PageMetadata, with None for a missing or blank title and for a
// missing description tag. content="" is kept as an empty description.
//
// Example:
//   html = "<title> Rust </title><meta name='description' content='A language'>"
//   result = PageMetadata { title: Some("Rust"), description: Some("A language") }
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    PageMetadata {
        title: extract_title(&document),
        description: extract_description(&document),
    }
}

// Returns the text of the first <title> element, trimmed
fn extract_title(document: &Html) -> Option<String> {
    let selector = selector("title")?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .and_then(non_blank)
}

// Returns the content of the first <meta name="description"> that has one,
// trimmed. An empty content attribute still counts as a description.
//
// The name is compared case-insensitively: pages in the wild use
// name="Description" about as often as name="description".
fn extract_description(document: &Html) -> Option<String> {
    let selector = selector("meta[name]")?;

    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
        })
        .find_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
}

// Our selectors are constants, so parsing only fails on a typo here.
// Treat that as "not found" rather than panicking in the middle of a batch.
fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
