//! Basic HTML extraction utilities.
//!
//! This module provides functions to extract document metadata:
//! - Page title
//! - Meta keywords and description
//! - All `name`/`property` meta tags
//! - Mobile-friendliness detection

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::selectors::parse_selector_with_fallback;
use crate::error_handling::{ServiceStats, WarningType};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("title", "title extraction"));

static META_KEYWORDS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("meta[name='keywords']", "meta keywords"));

static META_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("meta[name='description']", "meta description")
});

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("meta", "meta tags"));

/// Extracts the page title from an HTML document.
///
/// Returns the trimmed text of the first `<title>` element, or `None` (and a
/// `MissingTitle` warning) when there is none or it is blank.
pub fn extract_title(document: &Html, stats: &ServiceStats) -> Option<String> {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty());

    if title.is_none() {
        log::debug!("No usable title element found in document");
        stats.increment_warning(WarningType::MissingTitle);
    }
    title
}

/// Extracts the `content` of `<meta name="keywords">`, trimmed.
///
/// The raw comma-separated string is kept as published.
pub fn extract_meta_keywords(document: &Html, stats: &ServiceStats) -> Option<String> {
    let keywords = document
        .select(&META_KEYWORDS_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string());

    if keywords.is_none() {
        stats.increment_warning(WarningType::MissingMetaKeywords);
    }
    keywords
}

/// Extracts the meta description from an HTML document.
///
/// Searches for `<meta name="description">` and returns its content, trimmed of whitespace.
pub fn extract_meta_description(document: &Html, stats: &ServiceStats) -> Option<String> {
    let description = document
        .select(&META_DESCRIPTION_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string());

    if description.is_none() {
        stats.increment_warning(WarningType::MissingMetaDescription);
    }
    description
}

/// Collects every meta tag keyed by its `name`, or `property` when it has no
/// name. Tags without `content` map to an empty string; later duplicates win.
pub fn extract_meta_tags(document: &Html) -> BTreeMap<String, String> {
    document
        .select(&META_SELECTOR)
        .filter_map(|element| {
            let attrs = element.value();
            let key = attrs
                .attr("name")
                .filter(|n| !n.is_empty())
                .or_else(|| attrs.attr("property").filter(|p| !p.is_empty()))?;
            Some((key.to_string(), attrs.attr("content").unwrap_or("").to_string()))
        })
        .collect()
}

/// Checks if an HTML document is mobile-friendly by looking for a viewport meta tag.
pub fn is_mobile_friendly(html: &str) -> bool {
    html.contains("viewport")
}
