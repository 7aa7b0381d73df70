//! Pluggable factor-analyzer framework.
//!
//! Each analyzer owns one factor catalog, is stateless across pages, and
//! computes every status from deterministic, explainable rules — word
//! counts, regex matches, element counts, ratios against fixed
//! thresholds. Analyzers only read shared immutable input, so they run
//! safely over the same page concurrently, and a fifth catalog can be
//! added without touching the existing four.

pub mod content;
pub mod local_trust;
pub mod technical;
pub mod ux;

use crate::doc::ParsedDoc;
use crate::model::{FactorAssessment, FactorCategory, FactorStatus, Importance, PageRecord};

/// One factor catalog evaluated against a page.
///
/// Implementations must degrade gracefully on malformed input — a parse
/// failure yields a conservative assessment (`N/A` or a low-confidence
/// `OFI`), never a panic.
pub trait FactorAnalyzer: Send + Sync {
    /// Stable analyzer name, used in logs and analysis-error reporting.
    fn name(&self) -> &'static str;
    fn category(&self) -> FactorCategory;
    fn analyze(&self, page: &PageRecord, doc: &ParsedDoc) -> Vec<FactorAssessment>;
}

/// The standard catalog set, in fixed evaluation order.
pub fn analyzers() -> Vec<Box<dyn FactorAnalyzer>> {
    vec![
        Box::new(content::ContentQualityAnalyzer),
        Box::new(technical::TechnicalSeoAnalyzer),
        Box::new(local_trust::LocalTrustAnalyzer),
        Box::new(ux::UxPerformanceAnalyzer),
    ]
}

/// Accumulates assessments for one page within one catalog.
pub(crate) struct FactorSheet<'a> {
    page: &'a PageRecord,
    category: FactorCategory,
    out: Vec<FactorAssessment>,
}

impl<'a> FactorSheet<'a> {
    pub fn new(page: &'a PageRecord, category: FactorCategory) -> Self {
        Self {
            page,
            category,
            out: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        name: &str,
        importance: Importance,
        status: FactorStatus,
        rationale: impl Into<String>,
    ) {
        self.out.push(FactorAssessment {
            name: name.to_string(),
            category: self.category,
            status,
            importance,
            rationale: rationale.into(),
            page_url: self.page.url.clone(),
        });
    }

    /// Two-way factor: pass or opportunity.
    pub fn check(
        &mut self,
        name: &str,
        importance: Importance,
        passed: bool,
        rationale: impl Into<String>,
    ) {
        let status = if passed {
            FactorStatus::Ok
        } else {
            FactorStatus::Ofi
        };
        self.add(name, importance, status, rationale);
    }

    pub fn finish(self) -> Vec<FactorAssessment> {
        self.out
    }
}

/// Case-insensitive keyword presence over body text.
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageType;
    use testutil::bare_page;

    #[test]
    fn test_registry_covers_all_categories() {
        let set = analyzers();
        assert_eq!(set.len(), 4);
        let categories: Vec<FactorCategory> = set.iter().map(|a| a.category()).collect();
        for cat in FactorCategory::ALL {
            assert!(categories.contains(&cat), "missing {cat}");
        }
    }

    #[test]
    fn test_analyzers_never_panic_on_hostile_pages() {
        let hostile_bodies = ["", "\x00\x01", "<<<", "a"];
        for body in hostile_bodies {
            let page = bare_page("https://example.com/x", PageType::Other, body);
            let doc = ParsedDoc::parse(body);
            for analyzer in analyzers() {
                let assessments = analyzer.analyze(&page, &doc);
                for a in &assessments {
                    assert!(!a.name.is_empty());
                    assert!(!a.rationale.is_empty(), "{} has empty rationale", a.name);
                }
            }
        }
    }

    #[test]
    fn test_assessments_carry_page_url_and_category() {
        let page = bare_page(
            "https://example.com/services",
            PageType::Service,
            "some service description text with enough words to avoid the thin path",
        );
        let doc = ParsedDoc::parse("<html><body><p>hi</p></body></html>");
        for analyzer in analyzers() {
            for a in analyzer.analyze(&page, &doc) {
                assert_eq!(a.page_url, page.url);
                assert_eq!(a.category, analyzer.category());
            }
        }
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("Call us TODAY for a quote", &["quote"]));
        assert!(!contains_any("nothing relevant", &["quote", "schedule"]));
    }
}
