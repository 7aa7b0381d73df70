//! OFI classification: business-context escalation over raw assessments.
//!
//! Escalation rules apply in order, first match wins, and only ever raise
//! `OFI` to `Priority OFI` — never the reverse. Impact, complexity,
//! effort, and quick-win lookups are keyword tables passed in as data so
//! the logic stays testable in isolation and tunable per vertical.

use crate::model::{
    Effort, FactorAssessment, FactorStatus, Importance, OfiClassification, PagePriority, Tier,
};

/// Per-page business context consulted by the escalation rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusinessContext {
    /// The page exists to convert (contact, quote, booking).
    pub is_conversion_page: bool,
}

/// Keyword-matched rule tables. Substrings are matched case-insensitively
/// against factor names; first match wins within each table.
#[derive(Debug, Clone)]
pub struct OfiRules {
    /// Factors always escalated when failing.
    pub critical_factors: Vec<String>,
    /// Factors that matter on conversion pages.
    pub conversion_factors: Vec<String>,
    pub impact_table: Vec<(String, Tier)>,
    pub complexity_table: Vec<(String, Tier)>,
    pub effort_table: Vec<(String, Effort)>,
    /// Low-effort, high-visibility fixes.
    pub quick_win_factors: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for OfiRules {
    fn default() -> Self {
        Self {
            critical_factors: owned(&[
                "ssl",
                "title tag",
                "meta description",
                "meta robots",
                "readability",
                "page speed",
                "perceived load speed",
                "mobile",
                "canonical",
                "structured data",
                "nap",
                "core web vitals",
            ]),
            conversion_factors: owned(&[
                "call-to-action",
                "phone",
                "address",
                "nap",
                "review",
                "trust",
                "credentials",
                "speed",
                "mobile",
                "form",
            ]),
            impact_table: vec![
                ("ssl".into(), Tier::High),
                ("speed".into(), Tier::High),
                ("mobile".into(), Tier::High),
                ("nap".into(), Tier::High),
                ("phone".into(), Tier::High),
                ("call-to-action".into(), Tier::High),
                ("title tag".into(), Tier::High),
                ("content depth".into(), Tier::High),
                ("meta description".into(), Tier::Medium),
                ("canonical".into(), Tier::Medium),
                ("structured data".into(), Tier::Medium),
                ("review".into(), Tier::Medium),
                ("internal linking".into(), Tier::Medium),
                ("navigation".into(), Tier::Medium),
            ],
            complexity_table: vec![
                ("speed".into(), Tier::High),
                ("core web vitals".into(), Tier::High),
                ("render-blocking".into(), Tier::High),
                ("page weight".into(), Tier::High),
                ("mobile".into(), Tier::Medium),
                ("structured data".into(), Tier::Medium),
                ("readability".into(), Tier::Medium),
                ("content".into(), Tier::Medium),
                ("meta".into(), Tier::Low),
                ("title".into(), Tier::Low),
                ("alt text".into(), Tier::Low),
                ("favicon".into(), Tier::Low),
                ("copyright".into(), Tier::Low),
            ],
            effort_table: vec![
                ("meta".into(), Effort::Minimal),
                ("title".into(), Effort::Minimal),
                ("alt text".into(), Effort::Minimal),
                ("favicon".into(), Effort::Minimal),
                ("phone".into(), Effort::Minimal),
                ("address".into(), Effort::Minimal),
                ("copyright".into(), Effort::Minimal),
                ("charset".into(), Effort::Minimal),
                ("speed".into(), Effort::Substantial),
                ("mobile".into(), Effort::Substantial),
                ("render-blocking".into(), Effort::Substantial),
                ("page weight".into(), Effort::Substantial),
                ("structured data".into(), Effort::Moderate),
            ],
            quick_win_factors: owned(&[
                "title tag",
                "meta description",
                "alt text",
                "phone",
                "address",
                "favicon",
                "robots",
                "charset",
                "copyright",
            ]),
        }
    }
}

impl OfiRules {
    fn matches(list: &[String], factor_name: &str) -> bool {
        let name = factor_name.to_lowercase();
        list.iter().any(|token| name.contains(token.as_str()))
    }

    fn lookup<T: Copy>(table: &[(String, T)], factor_name: &str, default: T) -> T {
        let name = factor_name.to_lowercase();
        table
            .iter()
            .find(|(token, _)| name.contains(token.as_str()))
            .map(|(_, value)| *value)
            .unwrap_or(default)
    }
}

/// Classify one assessment against its page priority and business
/// context. Produces a new record; the raw assessment is not touched.
pub fn classify(
    assessment: &FactorAssessment,
    priority: PagePriority,
    ctx: &BusinessContext,
    rules: &OfiRules,
) -> OfiClassification {
    let status = escalate(assessment, priority, ctx, rules);

    OfiClassification {
        factor_name: assessment.name.clone(),
        page_url: assessment.page_url.clone(),
        status,
        business_impact: OfiRules::lookup(&rules.impact_table, &assessment.name, Tier::Low),
        technical_complexity: OfiRules::lookup(
            &rules.complexity_table,
            &assessment.name,
            Tier::Medium,
        ),
        effort: OfiRules::lookup(&rules.effort_table, &assessment.name, Effort::Moderate),
        quick_win: OfiRules::matches(&rules.quick_win_factors, &assessment.name)
            && matches!(status, FactorStatus::Ofi | FactorStatus::PriorityOfi),
    }
}

/// Ordered escalation. Only `OFI → Priority OFI` transitions happen here.
fn escalate(
    assessment: &FactorAssessment,
    priority: PagePriority,
    ctx: &BusinessContext,
    rules: &OfiRules,
) -> FactorStatus {
    let failing = matches!(
        assessment.status,
        FactorStatus::Ofi | FactorStatus::PriorityOfi
    );

    // Rule 1: critical factors are always top priority when failing.
    if failing && OfiRules::matches(&rules.critical_factors, &assessment.name) {
        return FactorStatus::PriorityOfi;
    }

    // Rule 2: high-importance misses on tier-1 pages.
    if priority.tier == 1
        && assessment.importance == Importance::High
        && assessment.status == FactorStatus::Ofi
    {
        return FactorStatus::PriorityOfi;
    }

    // Rule 3: conversion-relevant misses on conversion pages.
    if ctx.is_conversion_page
        && assessment.status == FactorStatus::Ofi
        && OfiRules::matches(&rules.conversion_factors, &assessment.name)
    {
        return FactorStatus::PriorityOfi;
    }

    assessment.status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FactorCategory;

    fn assessment(name: &str, status: FactorStatus, importance: Importance) -> FactorAssessment {
        FactorAssessment {
            name: name.to_string(),
            category: FactorCategory::TechnicalSeo,
            status,
            importance,
            rationale: "test".to_string(),
            page_url: "https://example.com/x".to_string(),
        }
    }

    fn no_ctx() -> BusinessContext {
        BusinessContext {
            is_conversion_page: false,
        }
    }

    #[test]
    fn test_critical_factor_always_escalates() {
        let rules = OfiRules::default();
        // Any page, any tier: a failing SSL factor is top priority.
        for tier in [PagePriority::TIER1, PagePriority::TIER2, PagePriority::TIER3] {
            let a = assessment(
                "SSL Certificate Implementation",
                FactorStatus::Ofi,
                Importance::High,
            );
            let classified = classify(&a, tier, &no_ctx(), &rules);
            assert_eq!(classified.status, FactorStatus::PriorityOfi);
        }
    }

    #[test]
    fn test_tier1_high_importance_escalates() {
        let rules = OfiRules::default();
        let a = assessment("Navigation Structure", FactorStatus::Ofi, Importance::High);

        let on_tier1 = classify(&a, PagePriority::TIER1, &no_ctx(), &rules);
        assert_eq!(on_tier1.status, FactorStatus::PriorityOfi);

        let on_tier3 = classify(&a, PagePriority::TIER3, &no_ctx(), &rules);
        assert_eq!(on_tier3.status, FactorStatus::Ofi);
    }

    #[test]
    fn test_conversion_page_rule() {
        let rules = OfiRules::default();
        let ctx = BusinessContext {
            is_conversion_page: true,
        };
        let a = assessment("Form Usability", FactorStatus::Ofi, Importance::Medium);

        let on_conversion = classify(&a, PagePriority::TIER2, &ctx, &rules);
        assert_eq!(on_conversion.status, FactorStatus::PriorityOfi);

        let elsewhere = classify(&a, PagePriority::TIER2, &no_ctx(), &rules);
        assert_eq!(elsewhere.status, FactorStatus::Ofi);
    }

    #[test]
    fn test_ok_and_na_never_escalate() {
        let rules = OfiRules::default();
        let ctx = BusinessContext {
            is_conversion_page: true,
        };
        for status in [FactorStatus::Ok, FactorStatus::NotApplicable] {
            let a = assessment("SSL Certificate Implementation", status, Importance::High);
            let classified = classify(&a, PagePriority::TIER1, &ctx, &rules);
            assert_eq!(classified.status, status);
        }
    }

    #[test]
    fn test_escalation_is_monotonic() {
        let rules = OfiRules::default();
        // A factor already at Priority OFI stays there under every rule path.
        let a = assessment("Heading Uniqueness", FactorStatus::PriorityOfi, Importance::Low);
        let classified = classify(&a, PagePriority::TIER3, &no_ctx(), &rules);
        assert_eq!(classified.status, FactorStatus::PriorityOfi);
    }

    #[test]
    fn test_quick_win_only_when_failing() {
        let rules = OfiRules::default();

        let failing = assessment("Meta Description Quality", FactorStatus::Ofi, Importance::High);
        let classified = classify(&failing, PagePriority::TIER3, &no_ctx(), &rules);
        assert!(classified.quick_win);
        assert_eq!(classified.effort, Effort::Minimal);

        let passing = assessment("Meta Description Quality", FactorStatus::Ok, Importance::High);
        let classified = classify(&passing, PagePriority::TIER3, &no_ctx(), &rules);
        assert!(!classified.quick_win);
    }

    #[test]
    fn test_lookup_tables_are_keyword_matched() {
        let rules = OfiRules::default();
        let a = assessment("Page Speed", FactorStatus::Ofi, Importance::High);
        let classified = classify(&a, PagePriority::TIER3, &no_ctx(), &rules);
        assert_eq!(classified.business_impact, Tier::High);
        assert_eq!(classified.technical_complexity, Tier::High);
        assert_eq!(classified.effort, Effort::Substantial);
    }

    #[test]
    fn test_unknown_factor_gets_defaults() {
        let rules = OfiRules::default();
        let a = assessment("Some Future Factor", FactorStatus::Ofi, Importance::Low);
        let classified = classify(&a, PagePriority::TIER3, &no_ctx(), &rules);
        assert_eq!(classified.business_impact, Tier::Low);
        assert_eq!(classified.technical_complexity, Tier::Medium);
        assert_eq!(classified.effort, Effort::Moderate);
        assert!(!classified.quick_win);
    }
}
