//! UX and performance factor catalog: responsiveness signals, navigation,
//! accessibility basics, and perceived speed.

use super::{FactorAnalyzer, FactorSheet};
use crate::doc::ParsedDoc;
use crate::model::{FactorAssessment, FactorCategory, FactorStatus, Importance, PageRecord};
use regex::Regex;
use std::sync::OnceLock;

/// Generic anchor texts that tell the reader nothing.
const GENERIC_LINK_TEXTS: &[&str] = &["click here", "read more", "learn more", "here", "link", "more"];

pub struct UxPerformanceAnalyzer;

impl FactorAnalyzer for UxPerformanceAnalyzer {
    fn name(&self) -> &'static str {
        "ux-performance"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::UxPerformance
    }

    fn analyze(&self, page: &PageRecord, doc: &ParsedDoc) -> Vec<FactorAssessment> {
        let mut sheet = FactorSheet::new(page, self.category());

        mobile_responsiveness(&mut sheet, page, doc);
        navigation(&mut sheet, doc);
        footer(&mut sheet, doc);
        alt_text_coverage(&mut sheet, page);
        link_text_quality(&mut sheet, page);
        form_usability(&mut sheet, doc);
        font_legibility(&mut sheet, page);
        perceived_speed(&mut sheet, page);
        render_blocking(&mut sheet, page, doc);
        landmarks(&mut sheet, doc);
        aria_usage(&mut sheet, page, doc);
        text_density(&mut sheet, page);
        dead_anchors(&mut sheet, doc);

        sheet.finish()
    }
}

fn mobile_responsiveness(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    let viewport = doc
        .meta_content("viewport")
        .map(|v| v.contains("width=device-width"))
        .unwrap_or(false);
    let media_queries = page.raw_html.contains("@media");

    let (status, rationale) = if viewport && media_queries {
        (
            FactorStatus::Ok,
            "responsive viewport and media queries present",
        )
    } else if viewport {
        (
            FactorStatus::Ok,
            "responsive viewport configured (styles external)",
        )
    } else {
        (
            FactorStatus::Ofi,
            "no responsive viewport meta tag",
        )
    };
    sheet.add("Mobile Responsiveness", Importance::High, status, rationale);
}

fn navigation(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let has_nav = doc.exists("nav") || doc.exists(r#"[role="navigation"]"#);
    sheet.check(
        "Navigation Structure",
        Importance::High,
        has_nav,
        if has_nav {
            "navigation landmark present"
        } else {
            "no nav element or navigation role"
        },
    );
}

fn footer(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let has_footer = doc.exists("footer") || doc.exists(r#"[role="contentinfo"]"#);
    sheet.check(
        "Footer Information",
        Importance::Low,
        has_footer,
        if has_footer {
            "footer landmark present"
        } else {
            "no footer element"
        },
    );
}

fn alt_text_coverage(sheet: &mut FactorSheet, page: &PageRecord) {
    if page.images.is_empty() {
        sheet.add(
            "Image Alt Text",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "no images on the page",
        );
        return;
    }
    let missing = page
        .images
        .iter()
        .filter(|img| img.alt.as_deref().map(str::trim).unwrap_or("").is_empty())
        .count();
    sheet.check(
        "Image Alt Text",
        Importance::Medium,
        missing == 0,
        format!("{missing} of {} images lack alt text", page.images.len()),
    );
}

fn link_text_quality(sheet: &mut FactorSheet, page: &PageRecord) {
    if page.links.is_empty() {
        sheet.add(
            "Descriptive Link Text",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "no links on the page",
        );
        return;
    }
    let generic = page
        .links
        .iter()
        .filter(|l| {
            let text = l.text.trim().to_lowercase();
            text.is_empty() || GENERIC_LINK_TEXTS.contains(&text.as_str())
        })
        .count();
    sheet.check(
        "Descriptive Link Text",
        Importance::Medium,
        generic == 0,
        format!("{generic} of {} links have generic or empty text", page.links.len()),
    );
}

fn form_usability(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let forms = doc.count("form");
    if forms == 0 {
        sheet.add(
            "Form Usability",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "no forms on the page",
        );
        return;
    }
    let inputs = doc.count("form input") + doc.count("form textarea") + doc.count("form select");
    let labels = doc.count("form label")
        + doc.count(r#"form input[aria-label]"#)
        + doc.count(r#"form input[placeholder]"#);
    let passed = inputs == 0 || labels * 2 >= inputs;
    sheet.check(
        "Form Usability",
        Importance::Medium,
        passed,
        format!("{labels} labels for {inputs} form fields"),
    );
}

fn font_legibility(sheet: &mut FactorSheet, page: &PageRecord) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"font-size:\s*(\d+)px").expect("valid regex"));

    let tiny = re
        .captures_iter(&page.raw_html)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .filter(|px| *px < 12)
        .count();
    sheet.check(
        "Font Legibility",
        Importance::Low,
        tiny == 0,
        if tiny == 0 {
            "no sub-12px font declarations".to_string()
        } else {
            format!("{tiny} font-size declarations below 12px")
        },
    );
}

fn perceived_speed(sheet: &mut FactorSheet, page: &PageRecord) {
    let ms = page.load_time_ms;
    let (status, rationale) = if ms <= 2_500 {
        (FactorStatus::Ok, format!("content available in {ms}ms"))
    } else if ms <= 6_000 {
        (
            FactorStatus::Ofi,
            format!("content took {ms}ms; users notice beyond 2.5s"),
        )
    } else {
        (
            FactorStatus::PriorityOfi,
            format!("content took {ms}ms; likely abandonment territory"),
        )
    };
    sheet.add("Perceived Load Speed", Importance::High, status, rationale);
}

fn render_blocking(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    let sync_scripts = doc
        .count("head script[src]")
        .saturating_sub(doc.count("head script[src][async]"))
        .saturating_sub(doc.count("head script[src][defer]"));
    let stylesheets = page.stylesheets.len();
    let passed = sync_scripts <= 3 && stylesheets <= 6;
    sheet.check(
        "Render-Blocking Resources",
        Importance::Medium,
        passed,
        format!("{sync_scripts} synchronous head scripts, {stylesheets} stylesheets"),
    );
}

fn landmarks(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let has_main = doc.exists("main") || doc.exists(r#"[role="main"]"#);
    sheet.check(
        "Main Content Landmark",
        Importance::Low,
        has_main,
        if has_main {
            "main landmark present"
        } else {
            "no main element or role"
        },
    );
}

fn aria_usage(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    let interactive = doc.count("button") + doc.count("a[href]") + doc.count("input");
    if interactive == 0 {
        sheet.add(
            "ARIA Usage",
            Importance::Low,
            FactorStatus::NotApplicable,
            "no interactive elements",
        );
        return;
    }
    let found = page.raw_html.contains("aria-");
    sheet.check(
        "ARIA Usage",
        Importance::Low,
        found,
        if found {
            "ARIA attributes in use"
        } else {
            "no ARIA attributes on an interactive page"
        },
    );
}

fn text_density(sheet: &mut FactorSheet, page: &PageRecord) {
    if page.byte_size == 0 {
        sheet.add(
            "Content-to-Markup Ratio",
            Importance::Low,
            FactorStatus::NotApplicable,
            "empty response body",
        );
        return;
    }
    let ratio = page.body_text.len() as f64 / page.byte_size as f64;
    sheet.check(
        "Content-to-Markup Ratio",
        Importance::Low,
        ratio >= 0.05,
        format!("visible text is {:.0}% of page bytes", ratio * 100.0),
    );
}

fn dead_anchors(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let total = doc.count("a[href]");
    if total == 0 {
        sheet.add(
            "Dead Anchor Targets",
            Importance::Low,
            FactorStatus::NotApplicable,
            "no links on the page",
        );
        return;
    }
    let dead = doc.count(r##"a[href="#"]"##) + doc.count(r#"a[href^="javascript:"]"#);
    sheet.check(
        "Dead Anchor Targets",
        Importance::Low,
        dead == 0,
        format!("{dead} of {total} anchors have placeholder targets"),
    );
}
