//! Page priority classification.
//!
//! A pure function from URL shape and page-type hint to a tier and score
//! weight. Tiers order the bounded fetch budget and weight score
//! aggregation; the weight is exactly 3.0, 2.0, or 1.0.

use crate::model::{PagePriority, PageType};
use regex::RegexSet;
use std::sync::OnceLock;

/// Conversion and primary-listing paths. Matched against the URL path.
fn tier1_patterns() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new([
            r"^/?$",
            r"^/(services|products|shop)/?$",
            r"^/(contact|contact-us|get-a-quote|quote|book|book-online|schedule)(/.*)?$",
            r"^/(locations|service-areas|areas-we-serve)/?$",
        ])
        .expect("valid regex set")
    })
}

/// Detail and supporting pages.
fn tier2_patterns() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new([
            r"^/(services|products)/.+",
            r"^/(locations|service-areas|areas-we-serve)/.+",
            r"^/(about|about-us|team|our-story|company)(/.*)?$",
            r"^/(portfolio|our-work|gallery|case-studies)(/.*)?$",
        ])
        .expect("valid regex set")
    })
}

/// Classify one URL. Deterministic; never recomputed within a run.
pub fn classify(url: &str, page_type_hint: Option<PageType>) -> PagePriority {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| "/".to_string());

    if tier1_patterns().is_match(&path) {
        return PagePriority::TIER1;
    }

    // The hint can promote pages whose URL shape is uninformative, e.g. a
    // contact form living at /reach-us.
    match page_type_hint {
        Some(PageType::Homepage | PageType::Contact) => return PagePriority::TIER1,
        _ => {}
    }

    if tier2_patterns().is_match(&path) {
        return PagePriority::TIER2;
    }

    match page_type_hint {
        Some(
            PageType::Service
            | PageType::ServiceArea
            | PageType::Location
            | PageType::About,
        ) => PagePriority::TIER2,
        _ => PagePriority::TIER3,
    }
}
