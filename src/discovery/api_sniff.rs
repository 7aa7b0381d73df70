//! API-endpoint sniffing for render-dependent sites.
//!
//! Regex-scans inline scripts for common REST/GraphQL path patterns and
//! resolves them to absolute URLs. Endpoints are recorded for crawl
//! completeness — they are not fetched as pages.

use crate::model::{DiscoveredUrl, DiscoveryMethod};
use regex::Regex;
use std::sync::OnceLock;

fn endpoint_res() -> &'static [Regex; 4] {
    static RES: OnceLock<[Regex; 4]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            // fetch('/api/...') / fetch("https://host/api/...")
            Regex::new(r#"fetch\(\s*["']([^"']+)["']"#).expect("valid regex"),
            // axios.get('/api/...') and friends
            Regex::new(r#"axios\.(?:get|post|put|delete|patch)\(\s*["']([^"']+)["']"#)
                .expect("valid regex"),
            // bare quoted REST-ish paths
            Regex::new(r#"["'](/(?:api|rest|wp-json|graphql)[^"'\s]*)["']"#).expect("valid regex"),
            // XMLHttpRequest open('GET', '/endpoint')
            Regex::new(r#"\.open\(\s*["'][A-Z]+["']\s*,\s*["']([^"']+)["']"#).expect("valid regex"),
        ]
    })
}

/// Extract API endpoints from inline script bodies.
///
/// Relative paths are resolved against `base_url`; cross-origin endpoints
/// are dropped. Results are deduplicated and sorted for determinism.
pub fn sniff_endpoints(inline_scripts: &[String], base_url: &str) -> Vec<DiscoveredUrl> {
    let Ok(base) = url::Url::parse(base_url) else {
        return Vec::new();
    };

    let mut endpoints: Vec<String> = Vec::new();
    for script in inline_scripts {
        for re in endpoint_res().iter() {
            for cap in re.captures_iter(script) {
                let Some(m) = cap.get(1) else { continue };
                let raw = m.as_str();
                if !looks_like_endpoint(raw) {
                    continue;
                }
                let Ok(resolved) = base.join(raw) else {
                    continue;
                };
                if resolved.host_str() != base.host_str() {
                    continue;
                }
                endpoints.push(resolved.to_string());
            }
        }
    }

    endpoints.sort();
    endpoints.dedup();

    endpoints
        .into_iter()
        .map(|url| DiscoveredUrl {
            url,
            method: DiscoveryMethod::Api,
            page_type_hint: None,
        })
        .collect()
}

/// Filter out asset paths and template fragments the regexes over-match.
fn looks_like_endpoint(raw: &str) -> bool {
    if raw.contains("${") || raw.contains("{{") {
        return false;
    }
    let path = raw.split(['?', '#']).next().unwrap_or(raw);
    let is_asset = path.ends_with(".js")
        || path.ends_with(".css")
        || path.ends_with(".png")
        || path.ends_with(".jpg")
        || path.ends_with(".svg")
        || path.ends_with(".woff2");
    if is_asset {
        return false;
    }
    path.starts_with('/') || path.starts_with("http://") || path.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_fetch_and_axios() {
        let scripts = vec![
            r#"async function load() { const r = await fetch('/api/v1/listings'); }"#.to_string(),
            r#"axios.get('/api/reviews?limit=10').then(render);"#.to_string(),
        ];
        let found = sniff_endpoints(&scripts, "https://example.com");
        let urls: Vec<&str> = found.iter().map(|d| d.url.as_str()).collect();
        assert!(urls.contains(&"https://example.com/api/v1/listings"));
        assert!(urls.contains(&"https://example.com/api/reviews?limit=10"));
        assert!(found.iter().all(|d| d.method == DiscoveryMethod::Api));
    }

    #[test]
    fn test_sniff_graphql_and_wp_json() {
        let scripts = vec![
            r#"const ENDPOINT = "/graphql";"#.to_string(),
            r#"var rest = '/wp-json/wp/v2/posts';"#.to_string(),
        ];
        let found = sniff_endpoints(&scripts, "https://example.com");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_cross_origin_dropped() {
        let scripts = vec![r#"fetch('https://api.thirdparty.io/v2/track')"#.to_string()];
        let found = sniff_endpoints(&scripts, "https://example.com");
        assert!(found.is_empty());
    }

    #[test]
    fn test_template_fragments_and_assets_dropped() {
        let scripts = vec![
            r#"fetch(`/api/items/${id}`)"#.to_string(),
            r#"fetch('/bundle.js')"#.to_string(),
            r#"fetch('main.css')"#.to_string(),
        ];
        let found = sniff_endpoints(&scripts, "https://example.com");
        assert!(found.is_empty());
    }

    #[test]
    fn test_results_deduplicated_and_sorted() {
        let scripts = vec![
            r#"fetch('/api/b'); fetch('/api/a'); fetch('/api/a');"#.to_string(),
        ];
        let found = sniff_endpoints(&scripts, "https://example.com");
        let urls: Vec<&str> = found.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/api/a", "https://example.com/api/b"]);
    }
}
