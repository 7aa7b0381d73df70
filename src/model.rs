// Copyright 2026 Sitescore Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared record types flowing through the audit pipeline.
//!
//! Every record here is created by exactly one phase and read-only
//! afterward. The OFI classifier produces new enriched records rather than
//! mutating assessments in place, so raw analyzer output stays auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Technology profile of the audited site, built once at run start.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Normalized base URL of the audit (scheme + host, no trailing path).
    pub base_url: String,
    /// True when meaningful content requires JavaScript execution.
    pub is_render_dependent: bool,
    /// Total `<script>` tag count on the homepage.
    pub script_count: usize,
    /// Fraction of script tags carrying `async` or `defer`.
    pub async_script_ratio: f32,
    /// Framework tokens found in markup or script URLs.
    pub framework_markers: Vec<String>,
    /// `Server` response header, if present.
    pub server_header: Option<String>,
    /// `<meta name="generator">` or `X-Generator`-style header.
    pub generator: Option<String>,
    /// Homepage HTML, kept so discovery can reuse it without a second GET.
    pub homepage_html: Option<String>,
}

impl SiteProfile {
    /// Conservative default used when the homepage cannot be fetched:
    /// assume a static site and let the cheap fetch path handle it.
    pub fn fallback(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            is_render_dependent: false,
            script_count: 0,
            async_script_ratio: 0.0,
            framework_markers: Vec::new(),
            server_header: None,
            generator: None,
            homepage_html: None,
        }
    }
}

/// How a candidate URL was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveryMethod {
    /// Extracted from an `<a href>` on the homepage.
    Link,
    /// Listed in a sitemap file.
    Sitemap,
    /// Confirmed by a path-pattern existence probe.
    Pattern,
    /// Sniffed from inline scripts as an API endpoint.
    Api,
}

/// A candidate page produced by discovery. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredUrl {
    /// Absolute URL.
    pub url: String,
    pub method: DiscoveryMethod,
    /// Estimated page type from URL shape alone, refined post-fetch.
    pub page_type_hint: Option<PageType>,
}

/// Page classification used for grouping, priority, and dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Homepage,
    Contact,
    Service,
    ServiceArea,
    Location,
    About,
    Blog,
    Product,
    Other,
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Homepage => "homepage",
            Self::Contact => "contact",
            Self::Service => "service",
            Self::ServiceArea => "service-area",
            Self::Location => "location",
            Self::About => "about",
            Self::Blog => "blog",
            Self::Product => "product",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Which fetch strategy produced a page record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlMethod {
    /// Plain HTTP GET + HTML parse.
    Static,
    /// Headless browser navigation and DOM extraction.
    Rendered,
}

/// An image reference extracted from a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// A link extracted from a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: String,
    pub text: String,
    pub is_internal: bool,
}

/// Canonical representation of a fetched page. Created by the fetcher,
/// read-only thereafter, owned by the pipeline run that created it.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: String,
    pub status: u16,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<String>,
    /// Body text with script/style/nav/header/footer/aside stripped.
    pub body_text: String,
    pub word_count: usize,
    /// Heading level (1–6) to ordered heading texts.
    pub headings: BTreeMap<u8, Vec<String>>,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
    /// External script URLs.
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    /// Parsed JSON-LD blocks.
    pub structured_data: Vec<serde_json::Value>,
    pub crawl_method: CrawlMethod,
    pub load_time_ms: u64,
    pub byte_size: usize,
    pub page_type: PageType,
    /// Raw HTML, retained so analyzers can build a parsed document.
    pub raw_html: String,
}

/// Priority tier and score weight for a page. Derived deterministically
/// from URL shape and page type; never recomputed within a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePriority {
    /// 1 = high, 2 = medium, 3 = low.
    pub tier: u8,
    /// Exactly 3.0, 2.0, or 1.0.
    pub weight: f64,
}

impl PagePriority {
    pub const TIER1: Self = Self {
        tier: 1,
        weight: 3.0,
    };
    pub const TIER2: Self = Self {
        tier: 2,
        weight: 2.0,
    };
    pub const TIER3: Self = Self {
        tier: 3,
        weight: 1.0,
    };
}

/// Outcome of evaluating one quality factor on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorStatus {
    /// Meets best practice.
    Ok,
    /// Opportunity for improvement.
    Ofi,
    /// Escalated, top-priority opportunity.
    PriorityOfi,
    /// The factor does not apply to this page. Never scored as a defect.
    NotApplicable,
}

impl std::fmt::Display for FactorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Ofi => write!(f, "OFI"),
            Self::PriorityOfi => write!(f, "Priority OFI"),
            Self::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// How much a factor matters within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Importance {
    High,
    Medium,
    Low,
}

/// The four analyzer catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactorCategory {
    ContentQuality,
    TechnicalSeo,
    LocalTrust,
    UxPerformance,
}

impl std::fmt::Display for FactorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentQuality => write!(f, "Content Quality"),
            Self::TechnicalSeo => write!(f, "Technical SEO"),
            Self::LocalTrust => write!(f, "Local & Trust Signals"),
            Self::UxPerformance => write!(f, "UX & Performance"),
        }
    }
}

impl FactorCategory {
    pub const ALL: [Self; 4] = [
        Self::ContentQuality,
        Self::TechnicalSeo,
        Self::LocalTrust,
        Self::UxPerformance,
    ];
}

/// One evaluated quality factor for one page. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorAssessment {
    pub name: String,
    pub category: FactorCategory,
    pub status: FactorStatus,
    pub importance: Importance,
    /// Human-readable explanation of how the status was computed.
    pub rationale: String,
    /// URL of the page this factor was evaluated on.
    pub page_url: String,
}

/// Business-impact / technical-complexity / effort tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    High,
    Medium,
    Low,
}

/// Rough implementation effort for fixing a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    /// Under an hour of work.
    Minimal,
    /// Hours.
    Moderate,
    /// Days or more, possibly requiring a developer.
    Substantial,
}

/// Enriched classification derived from one FactorAssessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfiClassification {
    pub factor_name: String,
    pub page_url: String,
    /// Final status after escalation. Escalation only raises OFI to
    /// Priority OFI, never the reverse.
    pub status: FactorStatus,
    pub business_impact: Tier,
    pub technical_complexity: Tier,
    pub effort: Effort,
    /// Low-effort, high-visibility fix.
    pub quick_win: bool,
}

/// Counts of assessments per status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub ok: u32,
    pub ofi: u32,
    pub priority_ofi: u32,
    pub not_applicable: u32,
}

impl StatusCounts {
    pub fn tally(assessments: &[FactorAssessment]) -> Self {
        let mut counts = Self::default();
        for a in assessments {
            match a.status {
                FactorStatus::Ok => counts.ok += 1,
                FactorStatus::Ofi => counts.ofi += 1,
                FactorStatus::PriorityOfi => counts.priority_ofi += 1,
                FactorStatus::NotApplicable => counts.not_applicable += 1,
            }
        }
        counts
    }
}

/// Terminal aggregate of a pipeline run. Immutable; handed to external
/// collaborators for persistence, export, or enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub pages_analyzed: u32,
    pub render_dependent: bool,
    pub total_factors: u32,
    pub status_counts: StatusCounts,
    /// Overall score, 0–100.
    pub overall_score: u8,
    /// Per-category mean scores.
    pub category_scores: BTreeMap<FactorCategory, f64>,
    pub assessments: Vec<FactorAssessment>,
    pub classifications: Vec<OfiClassification>,
}
