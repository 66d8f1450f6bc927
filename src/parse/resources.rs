//! Page resources and interactivity signals.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::html::{
    extract_meta_description, extract_meta_keywords, extract_meta_tags, extract_title,
    is_mobile_friendly,
};
use super::selectors::parse_selector_with_fallback;
use crate::config::AJAX_INDICATORS;
use crate::error_handling::ServiceStats;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a[href]", "links"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("img[src]", "images"));
static STYLESHEET_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("link[rel='stylesheet'][href]", "stylesheets")
});
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("script", "scripts"));
static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("form", "forms"));

/// Everything the prober extracts from one HTML body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub meta_tags: BTreeMap<String, String>,
    /// `href` of every `<a>`, in document order
    pub links: Vec<String>,
    /// `src` of every `<img>`, in document order
    pub images: Vec<String>,
    pub stylesheets: Vec<String>,
    /// `src` of external scripts only
    pub scripts: Vec<String>,
    /// Any `<script>` element, inline or external
    pub has_javascript: bool,
    pub has_forms: bool,
    pub has_ajax_indicators: bool,
    pub mobile_friendly: bool,
}

impl PageSignals {
    /// A page is dynamic if it has any script, any form, or asynchronous
    /// request code.
    pub fn is_dynamic(&self) -> bool {
        self.has_javascript || self.has_forms || self.has_ajax_indicators
    }

    pub fn website_type(&self) -> &'static str {
        if self.is_dynamic() {
            "Dynamic"
        } else {
            "Static"
        }
    }
}

/// True if `body` contains any known asynchronous-request marker.
pub fn has_ajax_indicators(body: &str) -> bool {
    AJAX_INDICATORS.iter().any(|marker| body.contains(marker))
}

fn collect_attr(document: &Html, selector: &Selector, attr: &str) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect()
}

/// Parses `body` and extracts all static page signals.
pub fn extract_page_signals(body: &str, stats: &ServiceStats) -> PageSignals {
    let document = Html::parse_document(body);

    PageSignals {
        title: extract_title(&document, stats),
        description: extract_meta_description(&document, stats),
        keywords: extract_meta_keywords(&document, stats),
        meta_tags: extract_meta_tags(&document),
        links: collect_attr(&document, &LINK_SELECTOR, "href"),
        images: collect_attr(&document, &IMAGE_SELECTOR, "src"),
        stylesheets: collect_attr(&document, &STYLESHEET_SELECTOR, "href"),
        scripts: collect_attr(&document, &SCRIPT_SELECTOR, "src"),
        has_javascript: document.select(&SCRIPT_SELECTOR).next().is_some(),
        has_forms: document.select(&FORM_SELECTOR).next().is_some(),
        has_ajax_indicators: has_ajax_indicators(body),
        mobile_friendly: is_mobile_friendly(body),
    }
}
