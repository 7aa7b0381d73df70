//! Audit configuration.
//!
//! All tunable constants live here so callers can override them without
//! touching pipeline code. The similarity threshold and category weights
//! are preserved defaults, not derived values — treat them as tunable.

use serde::{Deserialize, Serialize};

/// Configuration for a single audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum pages fetched beyond the homepage (the homepage is always
    /// fetched and does not consume this budget).
    pub max_pages: usize,
    /// Treat subdomains of the target host as in-scope.
    pub include_subdomains: bool,
    /// Allow the headless-render path for JavaScript-heavy sites. When
    /// false, every page is fetched via plain HTTP even if the profiler
    /// flags the site as render-dependent.
    pub analyze_javascript: bool,
    /// Run the separate competitor-comparison pass over
    /// `competitor_urls`. Carried through untouched; the core pipeline
    /// does not fetch competitors.
    pub analyze_competitors: bool,
    pub competitor_urls: Vec<String>,
    /// Timeout for a single static HTTP fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Timeout for a single rendered page, in milliseconds.
    pub render_timeout_ms: u64,
    /// Maximum concurrent browser contexts in the render pool.
    pub render_concurrency: usize,
    /// Retry attempts for a failed page fetch (static or rendered).
    pub fetch_retries: u32,
    /// Settle interval after DOM readiness, for deferred rendering.
    pub settle_ms: u64,
    /// Jaccard similarity above which two same-typed pages are duplicates.
    pub similarity_threshold: f64,
    /// Per-category weights for the overall score.
    pub category_weights: CategoryWeights,
    /// Maximum URLs taken from any single sitemap file.
    pub sitemap_url_cap: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_pages: 25,
            include_subdomains: false,
            analyze_javascript: true,
            analyze_competitors: false,
            competitor_urls: Vec::new(),
            fetch_timeout_ms: 15_000,
            render_timeout_ms: 60_000,
            render_concurrency: 4,
            fetch_retries: 2,
            settle_ms: 1_500,
            similarity_threshold: 0.85,
            category_weights: CategoryWeights::default(),
            sitemap_url_cap: 50,
        }
    }
}

/// Fixed weights for combining category means into the overall score.
/// Must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub content: f64,
    pub technical: f64,
    pub local: f64,
    pub ux: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            content: 0.25,
            technical: 0.30,
            local: 0.25,
            ux: 0.20,
        }
    }
}

impl CategoryWeights {
    pub fn sum(&self) -> f64 {
        self.content + self.technical + self.local + self.ux
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = CategoryWeights::default();
        assert!((w.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_config() {
        let cfg = AuditConfig::default();
        assert_eq!(cfg.max_pages, 25);
        assert!(cfg.analyze_javascript);
        assert!(!cfg.include_subdomains);
        assert!((cfg.similarity_threshold - 0.85).abs() < 1e-9);
        assert_eq!(cfg.sitemap_url_cap, 50);
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = AuditConfig {
            max_pages: 10,
            include_subdomains: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: AuditConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.max_pages, 10);
        assert!(parsed.include_subdomains);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AuditConfig = serde_json::from_str(r#"{"max_pages": 5}"#).unwrap();
        assert_eq!(parsed.max_pages, 5);
        assert_eq!(parsed.render_concurrency, 4);
        assert!((parsed.category_weights.technical - 0.30).abs() < 1e-9);
    }
}
