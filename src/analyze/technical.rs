//! Technical SEO factor catalog: transport security, markup hygiene,
//! structured data, and page weight.

use super::{FactorAnalyzer, FactorSheet};
use crate::doc::ParsedDoc;
use crate::model::{FactorAssessment, FactorCategory, FactorStatus, Importance, PageRecord};

pub struct TechnicalSeoAnalyzer;

impl FactorAnalyzer for TechnicalSeoAnalyzer {
    fn name(&self) -> &'static str {
        "technical-seo"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::TechnicalSeo
    }

    fn analyze(&self, page: &PageRecord, doc: &ParsedDoc) -> Vec<FactorAssessment> {
        let mut sheet = FactorSheet::new(page, self.category());

        ssl(&mut sheet, page);
        canonical_tag(&mut sheet, page);
        indexability(&mut sheet, doc);
        structured_data(&mut sheet, page);
        viewport(&mut sheet, doc);
        charset(&mut sheet, doc);
        load_time(&mut sheet, page);
        page_weight(&mut sheet, page);
        script_overhead(&mut sheet, page);
        status_health(&mut sheet, page);
        favicon(&mut sheet, doc);
        open_graph(&mut sheet, doc);
        language_declaration(&mut sheet, doc);
        url_slug(&mut sheet, page);
        image_dimensions(&mut sheet, page);

        sheet.finish()
    }
}

fn ssl(sheet: &mut FactorSheet, page: &PageRecord) {
    let https = page.url.starts_with("https://");
    let status = if https {
        FactorStatus::Ok
    } else {
        FactorStatus::PriorityOfi
    };
    sheet.add(
        "SSL Certificate Implementation",
        Importance::High,
        status,
        if https {
            "page served over HTTPS"
        } else {
            "page served over plain HTTP"
        },
    );
}

fn canonical_tag(sheet: &mut FactorSheet, page: &PageRecord) {
    sheet.check(
        "Canonical Tag",
        Importance::High,
        page.canonical.is_some(),
        match &page.canonical {
            Some(href) => format!("canonical points to {href}"),
            None => "no canonical link element".to_string(),
        },
    );
}

fn indexability(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let robots = doc.meta_content("robots").unwrap_or_default().to_lowercase();
    if robots.contains("noindex") {
        sheet.add(
            "Meta Robots Indexability",
            Importance::High,
            FactorStatus::PriorityOfi,
            format!("meta robots is \"{robots}\""),
        );
    } else {
        sheet.add(
            "Meta Robots Indexability",
            Importance::High,
            FactorStatus::Ok,
            "page is indexable",
        );
    }
}

fn structured_data(sheet: &mut FactorSheet, page: &PageRecord) {
    sheet.check(
        "Structured Data Markup",
        Importance::Medium,
        !page.structured_data.is_empty(),
        format!("{} JSON-LD blocks", page.structured_data.len()),
    );
}

fn viewport(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    match doc.meta_content("viewport") {
        Some(v) if v.contains("width=device-width") => sheet.add(
            "Viewport Configuration",
            Importance::High,
            FactorStatus::Ok,
            "responsive viewport configured",
        ),
        Some(v) => sheet.add(
            "Viewport Configuration",
            Importance::High,
            FactorStatus::Ofi,
            format!("viewport present but unusual: \"{v}\""),
        ),
        None => sheet.add(
            "Viewport Configuration",
            Importance::High,
            FactorStatus::Ofi,
            "no viewport meta tag",
        ),
    }
}

fn charset(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let declared = doc.exists("meta[charset]")
        || doc
            .first_attr(r#"meta[http-equiv="Content-Type"]"#, "content")
            .map(|c| c.to_lowercase().contains("charset"))
            .unwrap_or(false);
    sheet.check(
        "Charset Declaration",
        Importance::Low,
        declared,
        if declared {
            "character encoding declared"
        } else {
            "no charset declaration"
        },
    );
}

fn load_time(sheet: &mut FactorSheet, page: &PageRecord) {
    let ms = page.load_time_ms;
    let (status, rationale) = if ms <= 1_500 {
        (FactorStatus::Ok, format!("loaded in {ms}ms"))
    } else if ms <= 4_000 {
        (FactorStatus::Ofi, format!("loaded in {ms}ms; 1.5s target"))
    } else {
        (
            FactorStatus::PriorityOfi,
            format!("loaded in {ms}ms; well past the 1.5s target"),
        )
    };
    sheet.add("Page Speed", Importance::High, status, rationale);
}

fn page_weight(sheet: &mut FactorSheet, page: &PageRecord) {
    const KB: usize = 1024;
    let size = page.byte_size;
    let (status, rationale) = if size <= 1_536 * KB {
        (FactorStatus::Ok, format!("{} KB transferred", size / KB))
    } else if size <= 3_072 * KB {
        (
            FactorStatus::Ofi,
            format!("{} KB transferred; 1.5 MB target", size / KB),
        )
    } else {
        (
            FactorStatus::PriorityOfi,
            format!("{} KB transferred; more than double the 1.5 MB target", size / KB),
        )
    };
    sheet.add("Page Weight", Importance::Medium, status, rationale);
}

fn script_overhead(sheet: &mut FactorSheet, page: &PageRecord) {
    let count = page.scripts.len();
    sheet.check(
        "Script Overhead",
        Importance::Low,
        count <= 15,
        format!("{count} external scripts"),
    );
}

fn status_health(sheet: &mut FactorSheet, page: &PageRecord) {
    let status = page.status;
    let factor_status = if status == 200 {
        FactorStatus::Ok
    } else if status < 400 {
        FactorStatus::Ofi
    } else {
        FactorStatus::PriorityOfi
    };
    sheet.add(
        "HTTP Status Health",
        Importance::High,
        factor_status,
        format!("final status {status}"),
    );
}

fn favicon(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let present = doc.exists(r#"link[rel="icon"]"#)
        || doc.exists(r#"link[rel="shortcut icon"]"#)
        || doc.exists(r#"link[rel="apple-touch-icon"]"#);
    sheet.check(
        "Favicon",
        Importance::Low,
        present,
        if present {
            "favicon link present"
        } else {
            "no favicon link element"
        },
    );
}

fn open_graph(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let title = doc.meta_property("og:title").is_some();
    let description = doc.meta_property("og:description").is_some();
    let (passed, rationale) = match (title, description) {
        (true, true) => (true, "og:title and og:description present".to_string()),
        (true, false) => (false, "og:description missing".to_string()),
        (false, true) => (false, "og:title missing".to_string()),
        (false, false) => (false, "no Open Graph tags".to_string()),
    };
    sheet.check("Open Graph Tags", Importance::Low, passed, rationale);
}

fn language_declaration(sheet: &mut FactorSheet, doc: &ParsedDoc) {
    let lang = doc.first_attr("html", "lang");
    sheet.check(
        "Language Declaration",
        Importance::Medium,
        lang.is_some(),
        match lang {
            Some(l) => format!("html lang=\"{l}\""),
            None => "html element has no lang attribute".to_string(),
        },
    );
}

fn url_slug(sheet: &mut FactorSheet, page: &PageRecord) {
    let Ok(parsed) = url::Url::parse(&page.url) else {
        sheet.add(
            "Descriptive URL",
            Importance::Low,
            FactorStatus::NotApplicable,
            "URL could not be parsed",
        );
        return;
    };
    let path = parsed.path();
    if path == "/" || path.is_empty() {
        sheet.add(
            "Descriptive URL",
            Importance::Low,
            FactorStatus::NotApplicable,
            "root URL has no slug",
        );
        return;
    }
    let clean = !path.contains('_')
        && !path.contains("%20")
        && path.chars().count() <= 115
        && !path.chars().any(|c| c.is_ascii_uppercase());
    sheet.check(
        "Descriptive URL",
        Importance::Low,
        clean,
        if clean {
            format!("path \"{path}\" is short, lower-case, hyphenated")
        } else {
            format!("path \"{path}\" has underscores, encodings, upper-case, or excess length")
        },
    );
}

fn image_dimensions(sheet: &mut FactorSheet, page: &PageRecord) {
    if page.images.is_empty() {
        sheet.add(
            "Image Dimension Attributes",
            Importance::Low,
            FactorStatus::NotApplicable,
            "no images on the page",
        );
        return;
    }
    let missing = page
        .images
        .iter()
        .filter(|img| img.width.is_none() || img.height.is_none())
        .count();
    sheet.check(
        "Image Dimension Attributes",
        Importance::Low,
        missing == 0,
        format!(
            "{missing} of {} images lack explicit dimensions",
            page.images.len()
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::testutil::page_from_html;
    use crate::model::CrawlMethod;

    fn find<'a>(assessments: &'a [FactorAssessment], name: &str) -> &'a FactorAssessment {
        assessments
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("factor {name} missing"))
    }

    fn analyze_url(url: &str, html: &str) -> Vec<FactorAssessment> {
        let page = page_from_html(url, html);
        let doc = ParsedDoc::parse(html);
        TechnicalSeoAnalyzer.analyze(&page, &doc)
    }

    #[test]
    fn test_http_page_gets_priority_ssl_finding() {
        let assessments = analyze_url("http://example.com/about", "<html></html>");
        assert_eq!(
            find(&assessments, "SSL Certificate Implementation").status,
            FactorStatus::PriorityOfi
        );
    }

    #[test]
    fn test_https_page_passes_ssl() {
        let assessments = analyze_url("https://example.com/about", "<html></html>");
        assert_eq!(
            find(&assessments, "SSL Certificate Implementation").status,
            FactorStatus::Ok
        );
    }

    #[test]
    fn test_noindex_is_priority() {
        let html = r#"<html><head><meta name="robots" content="noindex, nofollow"></head></html>"#;
        let assessments = analyze_url("https://example.com/x", html);
        assert_eq!(
            find(&assessments, "Meta Robots Indexability").status,
            FactorStatus::PriorityOfi
        );
    }

    #[test]
    fn test_viewport_variants() {
        let good = r#"<html><head><meta name="viewport" content="width=device-width, initial-scale=1"></head></html>"#;
        let assessments = analyze_url("https://example.com/x", good);
        assert_eq!(
            find(&assessments, "Viewport Configuration").status,
            FactorStatus::Ok
        );

        let assessments = analyze_url("https://example.com/x", "<html></html>");
        assert_eq!(
            find(&assessments, "Viewport Configuration").status,
            FactorStatus::Ofi
        );
    }

    #[test]
    fn test_slow_page_speed_tiers() {
        let html = "<html></html>";
        let mut page = page_from_html("https://example.com/x", html);
        let doc = ParsedDoc::parse(html);

        page.load_time_ms = 900;
        let a = TechnicalSeoAnalyzer.analyze(&page, &doc);
        assert_eq!(find(&a, "Page Speed").status, FactorStatus::Ok);

        page.load_time_ms = 2_500;
        let a = TechnicalSeoAnalyzer.analyze(&page, &doc);
        assert_eq!(find(&a, "Page Speed").status, FactorStatus::Ofi);

        page.load_time_ms = 9_000;
        let a = TechnicalSeoAnalyzer.analyze(&page, &doc);
        assert_eq!(find(&a, "Page Speed").status, FactorStatus::PriorityOfi);
        assert_eq!(page.crawl_method, CrawlMethod::Static);
    }

    #[test]
    fn test_root_url_slug_is_na() {
        let assessments = analyze_url("https://example.com/", "<html></html>");
        assert_eq!(
            find(&assessments, "Descriptive URL").status,
            FactorStatus::NotApplicable
        );
    }

    #[test]
    fn test_messy_slug_flagged() {
        let assessments =
            analyze_url("https://example.com/Service_Pages/Main%20One", "<html></html>");
        assert_eq!(find(&assessments, "Descriptive URL").status, FactorStatus::Ofi);
    }

    #[test]
    fn test_structured_data_detected() {
        let html = r#"<html><head><script type="application/ld+json">{"@type":"LocalBusiness"}</script></head></html>"#;
        let assessments = analyze_url("https://example.com/x", html);
        assert_eq!(
            find(&assessments, "Structured Data Markup").status,
            FactorStatus::Ok
        );
    }

    #[test]
    fn test_image_dimensions_partial() {
        let html = r#"<html><body>
            <img src="/a.jpg" width="10" height="10">
            <img src="/b.jpg">
            </body></html>"#;
        let assessments = analyze_url("https://example.com/x", html);
        let factor = find(&assessments, "Image Dimension Attributes");
        assert_eq!(factor.status, FactorStatus::Ofi);
        assert!(factor.rationale.starts_with("1 of 2"));
    }
}
