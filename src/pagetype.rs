//! Multi-signal page-type classification.
//!
//! A page is assigned the first type on which at least two independent
//! signals agree: URL path tokens, title/content keywords, and structural
//! patterns (phone numbers, street addresses, prices). Root paths are
//! homepages by definition. Everything else falls back to "other".

use crate::doc::ParsedDoc;
use crate::model::PageType;
use regex::Regex;
use std::sync::OnceLock;

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]?\d{4}").expect("valid regex")
    })
}

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b\d{1,5}\s+[A-Za-z][A-Za-z ]{2,40}\s+(street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct)\b",
        )
        .expect("valid regex")
    })
}

fn price_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$€£]\s?\d{1,6}(?:[.,]\d{2})?").expect("valid regex"))
}

/// Classify from the URL path alone. Used as a discovery-time hint and as
/// one of the post-fetch signals.
pub fn url_signal(url: &str) -> Option<PageType> {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());

    if path.is_empty() || path == "/" {
        return Some(PageType::Homepage);
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let first = segments.first().copied().unwrap_or("");

    let matches_token = |seg: &str, tokens: &[&str]| tokens.iter().any(|t| seg.contains(t));

    if matches_token(first, &["contact", "get-in-touch", "get-a-quote", "quote", "book"]) {
        return Some(PageType::Contact);
    }
    if matches_token(first, &["service-area", "service_area", "areas-we-serve", "areas-served"]) {
        return Some(PageType::ServiceArea);
    }
    if matches_token(first, &["service"]) {
        return Some(PageType::Service);
    }
    if matches_token(first, &["location", "branches", "offices"]) {
        return Some(PageType::Location);
    }
    if matches_token(first, &["about", "team", "our-story", "who-we-are", "company"]) {
        return Some(PageType::About);
    }
    if matches_token(first, &["blog", "news", "article", "insights", "resources", "post"]) {
        return Some(PageType::Blog);
    }
    if matches_token(first, &["product", "shop", "store", "catalog"]) {
        return Some(PageType::Product);
    }

    None
}

/// Classify from the title and leading body text.
fn keyword_signal(title: &str, body_text: &str) -> Option<PageType> {
    let title = title.to_lowercase();
    // Only the top of the page: footer boilerplate mentions "contact" on
    // every page and must not vote.
    let lead: String = body_text.to_lowercase().chars().take(600).collect();

    let hits = |hay: &str, needles: &[&str]| needles.iter().filter(|n| hay.contains(*n)).count();

    let contact_terms = &["contact us", "get in touch", "request a quote", "send us a message"];
    if hits(&title, &["contact", "get a quote"]) > 0 || hits(&lead, contact_terms) >= 2 {
        return Some(PageType::Contact);
    }
    if hits(&title, &["our services", "services"]) > 0 && hits(&lead, &["we offer", "our services"]) > 0 {
        return Some(PageType::Service);
    }
    if hits(&title, &["about", "our story", "our team"]) > 0 {
        return Some(PageType::About);
    }
    if hits(&title, &["blog", "news", "articles"]) > 0 {
        return Some(PageType::Blog);
    }
    if hits(&title, &["locations", "service area", "areas we serve"]) > 0 {
        return Some(PageType::Location);
    }
    None
}

/// Classify from structural patterns in content.
fn structural_signal(body_text: &str, doc: &ParsedDoc) -> Option<PageType> {
    let has_phone = phone_re().is_match(body_text)
        || doc.exists(r#"a[href^="tel:"]"#);
    let has_address = address_re().is_match(body_text);
    let has_form = doc.exists("form");
    let has_price = price_re().is_match(body_text);

    if has_phone && (has_address || has_form) {
        return Some(PageType::Contact);
    }
    if has_price && doc.exists(r#"[class*="product"], [id*="product"]"#) {
        return Some(PageType::Product);
    }
    None
}

/// Post-fetch classification: assign the first type at least two
/// independent signals agree on, otherwise "other".
pub fn classify(url: &str, title: Option<&str>, body_text: &str, doc: &ParsedDoc) -> PageType {
    // Root path is a homepage by definition, no agreement needed.
    if let Ok(parsed) = url::Url::parse(url) {
        if parsed.path() == "/" || parsed.path().is_empty() {
            return PageType::Homepage;
        }
    }

    let signals = [
        url_signal(url),
        keyword_signal(title.unwrap_or(""), body_text),
        structural_signal(body_text, doc),
    ];

    for candidate in signals.iter().flatten() {
        let agreeing = signals
            .iter()
            .flatten()
            .filter(|s| *s == candidate)
            .count();
        if agreeing >= 2 {
            return *candidate;
        }
    }

    PageType::Other
}
