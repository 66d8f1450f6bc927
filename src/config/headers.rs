//! HTTP header name constants.
//!
//! This module defines the browser header set sent with probe requests and
//! the response headers used to fingerprint CDNs and hosting platforms.

/// Realistic browser request headers to reduce bot detection.
///
/// Sent with every probe request alongside a rotated User-Agent. They mimic a
/// modern Chrome navigation so header analysis alone does not flag us.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("referer", "https://www.google.com/"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
    ("cache-control", "max-age=0"),
];

// Infrastructure/Server identification
/// Server header (identifies server software)
pub const HEADER_SERVER: &str = "server";
/// X-Powered-By header (identifies server framework)
pub const HEADER_X_POWERED_BY: &str = "x-powered-by";

// CDN/Proxy identification
/// CF-Ray header (Cloudflare request ID)
pub const HEADER_CF_RAY: &str = "cf-ray";
/// X-Served-By header (Fastly server identification)
pub const HEADER_X_SERVED_BY: &str = "x-served-by";
/// X-Amz-Cf-Id header (CloudFront request ID)
pub const HEADER_X_AMZ_CF_ID: &str = "x-amz-cf-id";
/// X-Vercel-Id header (Vercel edge request ID)
pub const HEADER_X_VERCEL_ID: &str = "x-vercel-id";
/// X-NF-Request-Id header (Netlify request ID)
pub const HEADER_X_NF_REQUEST_ID: &str = "x-nf-request-id";
/// X-GitHub-Request-Id header (GitHub Pages)
pub const HEADER_X_GITHUB_REQUEST_ID: &str = "x-github-request-id";

/// CDN fingerprints: a response header whose presence identifies the edge.
///
/// To add/remove fingerprints, modify this array.
pub const CDN_HEADER_FINGERPRINTS: &[(&str, &str)] = &[
    (HEADER_CF_RAY, "Cloudflare"),
    (HEADER_X_AMZ_CF_ID, "Amazon CloudFront"),
    (HEADER_X_VERCEL_ID, "Vercel"),
    (HEADER_X_NF_REQUEST_ID, "Netlify"),
    (HEADER_X_GITHUB_REQUEST_ID, "GitHub Pages"),
    (HEADER_X_SERVED_BY, "Fastly"),
];
