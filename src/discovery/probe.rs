//! Path-pattern probing: lightweight HEAD existence checks against common
//! and industry-specific path segments. Only paths answering with a
//! success status are kept. Probes run with bounded concurrency and a
//! short timeout so a slow origin cannot stall discovery.

use crate::discovery::robots::RobotsRules;
use crate::http::HttpClient;
use crate::model::{DiscoveredUrl, DiscoveryMethod};
use crate::pagetype;
use tracing::debug;

/// Paths most small-business and marketing sites expose.
const COMMON_PATHS: &[&str] = &[
    "/about",
    "/about-us",
    "/contact",
    "/contact-us",
    "/services",
    "/blog",
    "/faq",
    "/reviews",
    "/testimonials",
    "/gallery",
    "/pricing",
];

/// Industry-specific segments seen on local-service sites.
const INDUSTRY_PATHS: &[&str] = &[
    "/locations",
    "/service-areas",
    "/areas-we-serve",
    "/our-work",
    "/portfolio",
    "/team",
    "/careers",
    "/financing",
    "/coupons",
    "/specials",
];

const PROBE_CONCURRENCY: usize = 8;
const PROBE_TIMEOUT_MS: u64 = 5_000;

/// Probe the enumerated path list against the base URL.
///
/// Paths disallowed by robots.txt are skipped before any request is made.
pub async fn probe_paths(
    base_url: &str,
    robots: &RobotsRules,
    client: &HttpClient,
) -> Vec<DiscoveredUrl> {
    let base = base_url.trim_end_matches('/');

    let candidates: Vec<String> = COMMON_PATHS
        .iter()
        .chain(INDUSTRY_PATHS.iter())
        .filter(|path| robots.is_allowed(path))
        .map(|path| format!("{base}{path}"))
        .collect();

    let results = client
        .head_many(&candidates, PROBE_CONCURRENCY, PROBE_TIMEOUT_MS)
        .await;

    let live: Vec<DiscoveredUrl> = results
        .into_iter()
        .filter(|r| r.is_live())
        .map(|r| DiscoveredUrl {
            page_type_hint: pagetype::url_signal(&r.url),
            url: r.url,
            method: DiscoveryMethod::Pattern,
        })
        .collect();

    debug!(
        "path probe: {}/{} candidates live",
        live.len(),
        COMMON_PATHS.len() + INDUSTRY_PATHS.len()
    );
    live
}
