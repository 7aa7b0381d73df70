//! Content quality factor catalog: depth, titles, headings, readability,
//! and conversion copy.

use super::{contains_any, FactorAnalyzer, FactorSheet};
use crate::doc::ParsedDoc;
use crate::model::{FactorAssessment, FactorCategory, FactorStatus, Importance, PageRecord};

const CTA_TERMS: &[&str] = &[
    "contact us",
    "call us",
    "call today",
    "get a quote",
    "request a quote",
    "free estimate",
    "schedule",
    "book now",
    "book online",
    "get started",
];

pub struct ContentQualityAnalyzer;

impl FactorAnalyzer for ContentQualityAnalyzer {
    fn name(&self) -> &'static str {
        "content-quality"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::ContentQuality
    }

    fn analyze(&self, page: &PageRecord, doc: &ParsedDoc) -> Vec<FactorAssessment> {
        let mut sheet = FactorSheet::new(page, self.category());

        word_count_adequacy(&mut sheet, page);
        title_optimization(&mut sheet, page);
        meta_description_quality(&mut sheet, page);
        single_h1(&mut sheet, page);
        heading_structure(&mut sheet, page);
        readability(&mut sheet, page);
        paragraph_structure(&mut sheet, page, doc);
        supporting_images(&mut sheet, page);
        repeated_headings(&mut sheet, page);
        call_to_action(&mut sheet, page);
        internal_linking(&mut sheet, page);
        outbound_link_text(&mut sheet, page);
        content_freshness(&mut sheet, page);
        keyword_consistency(&mut sheet, page);

        sheet.finish()
    }
}

fn word_count_adequacy(sheet: &mut FactorSheet, page: &PageRecord) {
    let wc = page.word_count;
    let (status, rationale) = if wc >= 300 {
        (FactorStatus::Ok, format!("{wc} words of body content"))
    } else if wc >= 100 {
        (
            FactorStatus::Ofi,
            format!("{wc} words is thin; 300+ recommended"),
        )
    } else {
        (
            FactorStatus::PriorityOfi,
            format!("only {wc} words of body content"),
        )
    };
    sheet.add("Content Depth", Importance::High, status, rationale);
}

fn title_optimization(sheet: &mut FactorSheet, page: &PageRecord) {
    match &page.title {
        Some(title) => {
            let len = title.chars().count();
            let passed = (30..=60).contains(&len);
            let rationale = if passed {
                format!("title length {len} chars is within 30-60")
            } else {
                format!("title length {len} chars; 30-60 recommended")
            };
            sheet.check("Title Tag Optimization", Importance::High, passed, rationale);
        }
        None => sheet.add(
            "Title Tag Optimization",
            Importance::High,
            FactorStatus::PriorityOfi,
            "missing <title>",
        ),
    }
}

fn meta_description_quality(sheet: &mut FactorSheet, page: &PageRecord) {
    match &page.meta_description {
        Some(desc) => {
            let len = desc.chars().count();
            let passed = (70..=160).contains(&len);
            let rationale = if passed {
                format!("meta description length {len} chars is within 70-160")
            } else {
                format!("meta description length {len} chars; 70-160 recommended")
            };
            sheet.check("Meta Description Quality", Importance::High, passed, rationale);
        }
        None => sheet.add(
            "Meta Description Quality",
            Importance::High,
            FactorStatus::Ofi,
            "missing meta description",
        ),
    }
}

fn single_h1(sheet: &mut FactorSheet, page: &PageRecord) {
    let h1_count = page.headings.get(&1).map(Vec::len).unwrap_or(0);
    let (passed, rationale) = match h1_count {
        1 => (true, "exactly one H1".to_string()),
        0 => (false, "no H1 heading".to_string()),
        n => (false, format!("{n} H1 headings; one expected")),
    };
    sheet.check("Single H1 Heading", Importance::Medium, passed, rationale);
}

fn heading_structure(sheet: &mut FactorSheet, page: &PageRecord) {
    if page.word_count < 150 {
        sheet.add(
            "Heading Structure",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "page too short to require subheadings",
        );
        return;
    }
    let has_subheadings = page.headings.get(&2).map(Vec::len).unwrap_or(0) > 0;
    sheet.check(
        "Heading Structure",
        Importance::Medium,
        has_subheadings,
        if has_subheadings {
            "H2 subheadings break up the content"
        } else {
            "no H2 subheadings on a substantial page"
        },
    );
}

fn readability(sheet: &mut FactorSheet, page: &PageRecord) {
    let sentences: Vec<&str> = page
        .body_text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.split_whitespace().count() >= 3)
        .collect();

    if sentences.is_empty() {
        sheet.add(
            "Readability",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "no sentence-like content found",
        );
        return;
    }

    let total_words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    let avg = total_words as f64 / sentences.len() as f64;
    sheet.check(
        "Readability",
        Importance::Medium,
        avg <= 25.0,
        format!("average sentence length {avg:.0} words"),
    );
}

fn paragraph_structure(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    if page.word_count < 100 {
        sheet.add(
            "Paragraph Structure",
            Importance::Low,
            FactorStatus::NotApplicable,
            "not enough content to evaluate paragraphs",
        );
        return;
    }
    let paragraphs = doc.count("p");
    sheet.check(
        "Paragraph Structure",
        Importance::Low,
        paragraphs >= 2,
        format!("{paragraphs} paragraph elements"),
    );
}

fn supporting_images(sheet: &mut FactorSheet, page: &PageRecord) {
    use crate::model::PageType;
    let visual_page = matches!(
        page.page_type,
        PageType::Homepage | PageType::Service | PageType::Product | PageType::Location
    );
    if !visual_page {
        sheet.add(
            "Supporting Images",
            Importance::Low,
            FactorStatus::NotApplicable,
            "image support not expected for this page type",
        );
        return;
    }
    sheet.check(
        "Supporting Images",
        Importance::Low,
        !page.images.is_empty(),
        format!("{} images on the page", page.images.len()),
    );
}

fn repeated_headings(sheet: &mut FactorSheet, page: &PageRecord) {
    let mut all: Vec<String> = page
        .headings
        .values()
        .flatten()
        .map(|h| h.to_lowercase())
        .collect();
    if all.is_empty() {
        sheet.add(
            "Heading Uniqueness",
            Importance::Low,
            FactorStatus::NotApplicable,
            "no headings to compare",
        );
        return;
    }
    let total = all.len();
    all.sort();
    all.dedup();
    let passed = all.len() == total;
    sheet.check(
        "Heading Uniqueness",
        Importance::Low,
        passed,
        if passed {
            "all headings are distinct".to_string()
        } else {
            format!("{} duplicated heading texts", total - all.len())
        },
    );
}

fn call_to_action(sheet: &mut FactorSheet, page: &PageRecord) {
    let found = contains_any(&page.body_text, CTA_TERMS);
    sheet.check(
        "Call-to-Action Presence",
        Importance::High,
        found,
        if found {
            "conversion prompt found in body copy"
        } else {
            "no call-to-action phrasing found"
        },
    );
}

fn internal_linking(sheet: &mut FactorSheet, page: &PageRecord) {
    let internal = page.links.iter().filter(|l| l.is_internal).count();
    sheet.check(
        "Internal Linking",
        Importance::Medium,
        internal >= 2,
        format!("{internal} internal links"),
    );
}

fn outbound_link_text(sheet: &mut FactorSheet, page: &PageRecord) {
    let external: Vec<_> = page.links.iter().filter(|l| !l.is_internal).collect();
    if external.is_empty() {
        sheet.add(
            "Outbound Link Text",
            Importance::Low,
            FactorStatus::NotApplicable,
            "no outbound links",
        );
        return;
    }
    let unlabeled = external.iter().filter(|l| l.text.trim().is_empty()).count();
    sheet.check(
        "Outbound Link Text",
        Importance::Low,
        unlabeled == 0,
        format!("{unlabeled} of {} outbound links lack text", external.len()),
    );
}

fn content_freshness(sheet: &mut FactorSheet, page: &PageRecord) {
    use regex::Regex;
    use std::sync::OnceLock;
    static RECENT_YEAR: OnceLock<Regex> = OnceLock::new();
    let re = RECENT_YEAR.get_or_init(|| Regex::new(r"\b202[4-9]\b").expect("valid regex"));

    let found = re.is_match(&page.body_text);
    sheet.check(
        "Content Freshness Signals",
        Importance::Low,
        found,
        if found {
            "recent year referenced in content"
        } else {
            "no recent dates found in content"
        },
    );
}

fn keyword_consistency(sheet: &mut FactorSheet, page: &PageRecord) {
    let (Some(title), Some(h1s)) = (&page.title, page.headings.get(&1)) else {
        sheet.add(
            "Title/H1 Consistency",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "needs both a title and an H1 to compare",
        );
        return;
    };

    let title_tokens: Vec<String> = significant_tokens(title);
    let h1_tokens: Vec<String> = h1s.iter().flat_map(|h| significant_tokens(h)).collect();
    let overlap = title_tokens.iter().any(|t| h1_tokens.contains(t));

    sheet.check(
        "Title/H1 Consistency",
        Importance::Medium,
        overlap,
        if overlap {
            "title and H1 share significant wording"
        } else {
            "title and H1 share no significant words"
        },
    );
}

fn significant_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.chars().count() >= 4)
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::testutil::page_from_html;
    use crate::model::FactorStatus;

    fn find<'a>(assessments: &'a [FactorAssessment], name: &str) -> &'a FactorAssessment {
        assessments
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("factor {name} missing"))
    }

    fn analyze(html: &str) -> Vec<FactorAssessment> {
        let page = page_from_html("https://example.com/services/repairs", html);
        let doc = ParsedDoc::parse(html);
        ContentQualityAnalyzer.analyze(&page, &doc)
    }

    fn rich_page() -> String {
        let body = "Our repair technicians handle every kind of breakdown. ".repeat(40);
        format!(
            r#"<html><head>
            <title>Appliance Repair Services in Springfield</title>
            <meta name="description" content="Fast, friendly appliance repair for every major brand, with same-day appointments across Springfield and nearby towns.">
            </head><body>
            <h1>Appliance Repair Services</h1>
            <h2>Refrigerators</h2><h2>Dishwashers</h2>
            <p>{body}</p><p>Call today for a free estimate in 2025.</p>
            <a href="/contact">Contact</a><a href="/services">Services</a>
            </body></html>"#
        )
    }

    #[test]
    fn test_rich_page_passes_core_factors() {
        let assessments = analyze(&rich_page());
        assert_eq!(find(&assessments, "Content Depth").status, FactorStatus::Ok);
        assert_eq!(
            find(&assessments, "Title Tag Optimization").status,
            FactorStatus::Ok
        );
        assert_eq!(
            find(&assessments, "Meta Description Quality").status,
            FactorStatus::Ok
        );
        assert_eq!(find(&assessments, "Single H1 Heading").status, FactorStatus::Ok);
        assert_eq!(
            find(&assessments, "Call-to-Action Presence").status,
            FactorStatus::Ok
        );
        assert_eq!(
            find(&assessments, "Title/H1 Consistency").status,
            FactorStatus::Ok
        );
    }

    #[test]
    fn test_empty_page_is_priority_thin() {
        let assessments = analyze("<html><body></body></html>");
        assert_eq!(
            find(&assessments, "Content Depth").status,
            FactorStatus::PriorityOfi
        );
        assert_eq!(
            find(&assessments, "Title Tag Optimization").status,
            FactorStatus::PriorityOfi
        );
    }

    #[test]
    fn test_missing_meta_description_is_ofi() {
        let html = "<html><head><title>A Reasonably Long Page Title Here</title></head><body><p>text</p></body></html>";
        let assessments = analyze(html);
        assert_eq!(
            find(&assessments, "Meta Description Quality").status,
            FactorStatus::Ofi
        );
    }

    #[test]
    fn test_multiple_h1_fails() {
        let html = "<html><body><h1>One</h1><h1>Two</h1></body></html>";
        let assessments = analyze(html);
        let factor = find(&assessments, "Single H1 Heading");
        assert_eq!(factor.status, FactorStatus::Ofi);
        assert!(factor.rationale.contains('2'));
    }

    #[test]
    fn test_long_sentences_flag_readability() {
        let run_on = format!(
            "<html><body><p>{} end.</p></body></html>",
            "very long clause with many words that keeps going and going ".repeat(8)
        );
        let assessments = analyze(&run_on);
        assert_eq!(find(&assessments, "Readability").status, FactorStatus::Ofi);
    }

    #[test]
    fn test_short_page_heading_structure_na() {
        let html = "<html><body><p>short page with a handful of words only</p></body></html>";
        let assessments = analyze(html);
        assert_eq!(
            find(&assessments, "Heading Structure").status,
            FactorStatus::NotApplicable
        );
    }

    #[test]
    fn test_na_factors_present_for_empty_link_sets() {
        let assessments = analyze("<html><body><p>plain text only here</p></body></html>");
        assert_eq!(
            find(&assessments, "Outbound Link Text").status,
            FactorStatus::NotApplicable
        );
    }
}
