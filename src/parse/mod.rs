//! HTML parsing and data extraction.
//!
//! This module extracts static signals from HTML content:
//! - Title, meta description, meta keywords and every named meta tag
//! - Links, images, stylesheets and external scripts
//! - Interactivity hints (scripts, forms, asynchronous request code)
//!
//! All parsing is done using CSS selectors via the `scraper` crate. Nothing is
//! executed; pages fetched through untrusted proxies go through the same path.

mod html;
mod resources;
mod selectors;

// Re-export public API
pub use html::{
    extract_meta_description, extract_meta_keywords, extract_meta_tags, extract_title,
    is_mobile_friendly,
};
pub use resources::{extract_page_signals, has_ajax_indicators, PageSignals};
