//! Technology detection.
//!
//! Case-insensitive substring search of the page body (and the `Server` /
//! `X-Powered-By` headers) against a fixed vocabulary. Incidental matches
//! produce false positives; that is accepted.

use std::collections::BTreeSet;

use crate::config::{HEADER_SERVER, HEADER_X_POWERED_BY};

/// Technology name and the lowercase markers that imply it.
///
/// To add/remove detections, modify this array.
const TECHNOLOGY_MARKERS: &[(&str, &[&str])] = &[
    ("WordPress", &["wp-content", "wp-includes", "wordpress"]),
    ("Drupal", &["drupal"]),
    ("Joomla", &["joomla"]),
    ("Shopify", &["cdn.shopify.com", "shopify"]),
    ("Wix", &["wixstatic.com", "wix.com"]),
    ("Squarespace", &["squarespace"]),
    ("Ghost", &["ghost-"]),
    ("React", &["react", "data-reactroot"]),
    ("Next.js", &["__next", "_next/static"]),
    ("Vue.js", &["vue.js", "vue.min.js", "data-v-"]),
    ("Nuxt.js", &["__nuxt", "_nuxt/"]),
    ("Angular", &["ng-version", "angular"]),
    ("Svelte", &["svelte"]),
    ("Ember.js", &["ember"]),
    ("Gatsby", &["gatsby"]),
    ("jQuery", &["jquery"]),
    ("Bootstrap", &["bootstrap"]),
    ("Tailwind CSS", &["tailwind"]),
    ("Font Awesome", &["font-awesome", "fontawesome"]),
    ("Google Analytics", &["google-analytics.com", "gtag("]),
    ("Google Tag Manager", &["googletagmanager.com"]),
    ("Cloudflare", &["cloudflare"]),
    ("PHP", &["php"]),
    ("ASP.NET", &["asp.net", "__viewstate"]),
    ("Laravel", &["laravel"]),
    ("Django", &["csrfmiddlewaretoken", "django"]),
    ("Ruby on Rails", &["csrf-param", "rails"]),
    ("Express", &["express"]),
    ("Nginx", &["nginx"]),
    ("Apache", &["apache"]),
];

/// Detects technologies mentioned in `body` or the identifying headers.
///
/// Returns every match, sorted and deduplicated.
pub fn detect_technologies(body: &str, headers: &[(String, String)]) -> Vec<String> {
    let mut haystack = body.to_lowercase();
    for (name, value) in headers {
        if name == HEADER_SERVER || name == HEADER_X_POWERED_BY {
            haystack.push('\n');
            haystack.push_str(&value.to_lowercase());
        }
    }

    TECHNOLOGY_MARKERS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| haystack.contains(m)))
        .map(|(name, _)| name.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
