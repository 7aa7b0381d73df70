//! Multi-strategy page discovery.
//!
//! Up to five independent strategies run against the profiled site and
//! their results are unioned: homepage link extraction, sitemap parsing
//! (robots.txt directives plus conventional paths), path-pattern probing,
//! and — for render-dependent sites — API-endpoint sniffing. Each strategy
//! is individually fault-tolerant: a failure contributes zero URLs and a
//! warning, never an aborted discovery.

pub mod api_sniff;
pub mod probe;
pub mod robots;
pub mod sitemap;

use crate::config::AuditConfig;
use crate::doc::ParsedDoc;
use crate::extract;
use crate::http::HttpClient;
use crate::model::{DiscoveredUrl, DiscoveryMethod, SiteProfile};
use crate::pagetype;
use robots::RobotsRules;
use std::collections::HashSet;
use tracing::{info, warn};

/// File extensions that are never audit pages.
const NON_PAGE_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "zip", "rar", "gz", "tar", "mp3",
    "mp4", "avi", "mov", "webm", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "css", "js", "woff",
    "woff2", "ttf",
];

/// Maximum sitemap files fetched per source list (index children included).
const MAX_SITEMAP_FETCHES: usize = 5;

/// Everything discovery produced for a run.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Candidate pages, deduplicated by normalized URL.
    pub pages: Vec<DiscoveredUrl>,
    /// Same-origin API endpoints (recorded, not fetched as pages).
    pub api_endpoints: Vec<DiscoveredUrl>,
}

/// Run all discovery strategies for the profiled site.
///
/// `homepage_html` is the best available homepage markup — the profiler's
/// static fetch, or rendered DOM when the pipeline pre-rendered a
/// JavaScript-heavy homepage.
pub async fn discover(
    profile: &SiteProfile,
    homepage_html: Option<&str>,
    config: &AuditConfig,
    client: &HttpClient,
) -> DiscoveryOutcome {
    let base_url = profile.base_url.trim_end_matches('/').to_string();

    // robots.txt is fetched once and shared by the sitemap and probe
    // strategies.
    let robots = fetch_robots(&base_url, client).await;

    let (sitemap_urls, probed) = tokio::join!(
        discover_from_sitemaps(&base_url, &robots, client, config.sitemap_url_cap),
        probe::probe_paths(&base_url, &robots, client),
    );

    // Homepage link extraction and API sniffing are pure passes over the
    // already-fetched markup.
    let (linked, api_endpoints) = match homepage_html {
        Some(html) => {
            let doc = ParsedDoc::parse(html);
            let linked = discover_from_links(&doc, &base_url);
            let api = if profile.is_render_dependent {
                api_sniff::sniff_endpoints(&extract::inline_scripts(&doc), &base_url)
            } else {
                Vec::new()
            };
            (linked, api)
        }
        None => (Vec::new(), Vec::new()),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut pages: Vec<DiscoveredUrl> = Vec::new();

    // Union in a fixed strategy order so repeated runs enumerate the same
    // candidate list.
    for candidate in linked
        .into_iter()
        .chain(sitemap_urls)
        .chain(probed)
    {
        let Some(normalized) = normalize_url(&candidate.url) else {
            continue;
        };
        if !is_valid_page_url(&normalized, &base_url, config.include_subdomains) {
            continue;
        }
        if seen.insert(normalized.clone()) {
            pages.push(DiscoveredUrl {
                url: normalized,
                method: candidate.method,
                page_type_hint: candidate.page_type_hint,
            });
        }
    }

    info!(
        "discovery: {} candidate pages, {} api endpoints",
        pages.len(),
        api_endpoints.len()
    );

    DiscoveryOutcome {
        pages,
        api_endpoints,
    }
}

async fn fetch_robots(base_url: &str, client: &HttpClient) -> RobotsRules {
    let robots_url = format!("{base_url}/robots.txt");
    match client.get(&robots_url).await {
        Ok(resp) if resp.status == 200 => RobotsRules::parse(&resp.body),
        Ok(_) => RobotsRules::default(),
        Err(e) => {
            warn!("robots.txt fetch failed ({e}), proceeding without rules");
            RobotsRules::default()
        }
    }
}

/// Homepage link extraction: internal anchors become candidates.
fn discover_from_links(doc: &ParsedDoc, base_url: &str) -> Vec<DiscoveredUrl> {
    extract::extract_links(doc, base_url)
        .into_iter()
        .filter(|link| link.is_internal)
        .map(|link| DiscoveredUrl {
            page_type_hint: pagetype::url_signal(&link.href),
            url: link.href,
            method: DiscoveryMethod::Link,
        })
        .collect()
}

/// Sitemap strategy: robots.txt directives first, conventional paths as
/// fallback, one level of sitemap-index recursion, capped per file.
async fn discover_from_sitemaps(
    base_url: &str,
    robots: &RobotsRules,
    client: &HttpClient,
    url_cap: usize,
) -> Vec<DiscoveredUrl> {
    let sources: Vec<String> = if robots.sitemaps.is_empty() {
        sitemap::CONVENTIONAL_SITEMAP_PATHS
            .iter()
            .map(|p| format!("{base_url}{p}"))
            .collect()
    } else {
        robots.sitemaps.clone()
    };

    let mut page_urls: Vec<String> = Vec::new();
    let mut children: Vec<String> = Vec::new();

    for source in sources.iter().take(MAX_SITEMAP_FETCHES) {
        match fetch_and_parse_sitemap(source, client, url_cap).await {
            Some(file) => {
                let found = !file.page_urls.is_empty();
                page_urls.extend(file.page_urls);
                children.extend(file.child_sitemaps);
                // Conventional probing stops at the first hit; robots.txt
                // sources are all honored.
                if robots.sitemaps.is_empty() && (found || !children.is_empty()) {
                    break;
                }
            }
            None => continue,
        }
    }

    for child in children.iter().take(MAX_SITEMAP_FETCHES) {
        if let Some(file) = fetch_and_parse_sitemap(child, client, url_cap).await {
            page_urls.extend(file.page_urls);
        }
    }

    page_urls
        .into_iter()
        .map(|url| DiscoveredUrl {
            page_type_hint: pagetype::url_signal(&url),
            url,
            method: DiscoveryMethod::Sitemap,
        })
        .collect()
}

async fn fetch_and_parse_sitemap(
    url: &str,
    client: &HttpClient,
    url_cap: usize,
) -> Option<sitemap::SitemapFile> {
    let resp = client.get(url).await.ok()?;
    if resp.status != 200 || resp.body.trim().is_empty() {
        return None;
    }
    match sitemap::parse_sitemap(&resp.body, url_cap) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("sitemap {url} unparseable: {e}");
            None
        }
    }
}

/// Normalize a URL for dedup comparison: lowercase host, strip query and
/// fragment, strip trailing slash on non-root paths.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut parsed = url::Url::parse(raw).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.set_query(None);
    parsed.set_fragment(None);

    let host = match parsed.port() {
        Some(port) => format!("{}:{port}", parsed.host_str()?.to_lowercase()),
        None => parsed.host_str()?.to_lowercase(),
    };
    let path = if parsed.path() == "/" {
        "/".to_string()
    } else {
        parsed.path().trim_end_matches('/').to_string()
    };
    Some(format!("{}://{}{}", parsed.scheme(), host, path))
}

/// Scope and extension filter for candidate pages.
pub fn is_valid_page_url(url: &str, base_url: &str, include_subdomains: bool) -> bool {
    let (Ok(parsed), Ok(base)) = (url::Url::parse(url), url::Url::parse(base_url)) else {
        return false;
    };
    let (Some(host), Some(base_host)) = (parsed.host_str(), base.host_str()) else {
        return false;
    };

    let host = host.trim_start_matches("www.");
    let base_host = base_host.trim_start_matches("www.");
    let in_scope = host == base_host
        || (include_subdomains && host.ends_with(&format!(".{base_host}")));
    if !in_scope {
        return false;
    }

    if let Some(ext) = parsed.path().rsplit('.').next() {
        if parsed.path().contains('.') && NON_PAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        {
            return false;
        }
    }
    true
}
