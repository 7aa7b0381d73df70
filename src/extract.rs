//! HTML content extraction into page-record fields.
//!
//! Both fetch strategies funnel their HTML through this module so static
//! and rendered pages produce identical record shapes. Body text excludes
//! script/style/nav/header/footer/aside subtrees — navigation chrome would
//! otherwise dominate word counts and similarity comparisons.

use crate::doc::{collapse_whitespace, ParsedDoc};
use crate::model::{ImageRef, LinkRef};
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;

/// Subtrees excluded from body-text extraction.
const EXCLUDED_TEXT_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript", "template",
];

/// Everything extracted from one page's HTML.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<String>,
    pub body_text: String,
    pub word_count: usize,
    pub headings: BTreeMap<u8, Vec<String>>,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub structured_data: Vec<serde_json::Value>,
}

/// Extract all page-record fields from parsed HTML.
pub fn extract_content(doc: &ParsedDoc, base_url: &str) -> ExtractedContent {
    let body_text = extract_body_text(doc);
    let word_count = body_text.split_whitespace().count();

    ExtractedContent {
        title: doc.first_text("title"),
        meta_description: doc.meta_content("description"),
        canonical: doc.first_attr(r#"link[rel="canonical"]"#, "href"),
        word_count,
        body_text,
        headings: extract_headings(doc),
        images: extract_images(doc),
        links: extract_links(doc, base_url),
        scripts: doc.attr_values("script", "src"),
        stylesheets: doc.attr_values(r#"link[rel="stylesheet"]"#, "href"),
        structured_data: extract_jsonld(doc),
    }
}

/// Visible body text with chrome subtrees stripped.
pub fn extract_body_text(doc: &ParsedDoc) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.document().select(&sel).next())
        .unwrap_or_else(|| doc.document().root_element());

    let mut out = String::new();
    collect_visible_text(body, &mut out);
    collapse_whitespace(&out)
}

fn collect_visible_text(el: ElementRef<'_>, out: &mut String) {
    if EXCLUDED_TEXT_TAGS.contains(&el.value().name()) {
        return;
    }
    for node in el.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child) = ElementRef::wrap(node) {
            collect_visible_text(child, out);
        }
    }
}

fn extract_headings(doc: &ParsedDoc) -> BTreeMap<u8, Vec<String>> {
    let mut headings = BTreeMap::new();
    for level in 1u8..=6 {
        let texts = doc.all_texts(&format!("h{level}"));
        if !texts.is_empty() {
            headings.insert(level, texts);
        }
    }
    headings
}

fn extract_images(doc: &ParsedDoc) -> Vec<ImageRef> {
    let Ok(sel) = Selector::parse("img") else {
        return Vec::new();
    };
    doc.document()
        .select(&sel)
        .filter_map(|el| {
            let src = el.value().attr("src")?.trim().to_string();
            if src.is_empty() {
                return None;
            }
            Some(ImageRef {
                src,
                alt: el.value().attr("alt").map(|a| a.trim().to_string()),
                width: el.value().attr("width").map(|w| w.to_string()),
                height: el.value().attr("height").map(|h| h.to_string()),
            })
        })
        .collect()
}

/// Extract and resolve `<a href>` links, skipping non-navigational schemes.
pub fn extract_links(doc: &ParsedDoc, base_url: &str) -> Vec<LinkRef> {
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = url::Url::parse(base_url).ok();

    doc.document()
        .select(&sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                return None;
            }

            let resolved = match &base {
                Some(b) => b.join(href).ok()?.to_string(),
                None => href.to_string(),
            };

            let is_internal = match (&base, url::Url::parse(&resolved).ok()) {
                (Some(b), Some(r)) => same_host(b.host_str(), r.host_str()),
                _ => false,
            };

            Some(LinkRef {
                href: resolved,
                text: collapse_whitespace(&el.text().collect::<String>()),
                is_internal,
            })
        })
        .collect()
}

fn same_host(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.trim_start_matches("www.") == b.trim_start_matches("www.")
        }
        _ => false,
    }
}

/// Inline script bodies (no `src` attribute), for API sniffing and
/// render-dependency heuristics.
pub fn inline_scripts(doc: &ParsedDoc) -> Vec<String> {
    let Ok(sel) = Selector::parse("script") else {
        return Vec::new();
    };
    doc.document()
        .select(&sel)
        .filter(|el| el.value().attr("src").is_none())
        .map(|el| el.text().collect::<String>())
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn extract_jsonld(doc: &ParsedDoc) -> Vec<serde_json::Value> {
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    doc.document()
        .select(&sel)
        .filter_map(|el| {
            let raw = el.text().collect::<String>();
            serde_json::from_str(&raw).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title>Acme Services</title>
        <meta name="description" content="What we do.">
        <link rel="canonical" href="https://example.com/services">
        <link rel="stylesheet" href="/main.css">
        <script src="/app.js"></script>
        <script type="application/ld+json">{"@type":"LocalBusiness","name":"Acme"}</script>
        </head><body>
        <header>Site chrome top</header>
        <nav><a href="/contact">Contact</a></nav>
        <h1>Our Services</h1>
        <h2>Repairs</h2><h2>Installs</h2>
        <p>We fix things quickly and well.</p>
        <img src="/van.jpg" alt="Service van" width="640" height="480">
        <img src="/logo.png">
        <a href="/services/repairs">Repair details</a>
        <a href="https://other.com/partner">Partner</a>
        <a href="mailto:hi@example.com">Email</a>
        <script>var inlineState = 1;</script>
        <footer>Footer boilerplate</footer>
        <aside>Sidebar ads</aside>
        </body></html>"#;

    #[test]
    fn test_body_text_strips_chrome() {
        let doc = ParsedDoc::parse(PAGE);
        let text = extract_body_text(&doc);
        assert!(text.contains("We fix things quickly"));
        assert!(text.contains("Our Services"));
        assert!(!text.contains("Site chrome top"));
        assert!(!text.contains("Footer boilerplate"));
        assert!(!text.contains("Sidebar ads"));
        assert!(!text.contains("inlineState"));
        assert!(!text.contains("Contact"));
    }

    #[test]
    fn test_extract_content_fields() {
        let doc = ParsedDoc::parse(PAGE);
        let content = extract_content(&doc, "https://example.com/services");

        assert_eq!(content.title.as_deref(), Some("Acme Services"));
        assert_eq!(content.meta_description.as_deref(), Some("What we do."));
        assert_eq!(
            content.canonical.as_deref(),
            Some("https://example.com/services")
        );
        assert_eq!(content.headings.get(&1).map(Vec::len), Some(1));
        assert_eq!(content.headings.get(&2).map(Vec::len), Some(2));
        assert_eq!(content.images.len(), 2);
        assert_eq!(content.scripts, vec!["/app.js"]);
        assert_eq!(content.stylesheets, vec!["/main.css"]);
        assert_eq!(content.structured_data.len(), 1);
        assert!(content.word_count > 0);
    }

    #[test]
    fn test_links_resolved_and_flagged() {
        let doc = ParsedDoc::parse(PAGE);
        let links = extract_links(&doc, "https://example.com/services");

        // mailto: skipped; nav link, internal detail link, external partner.
        assert_eq!(links.len(), 3);
        let internal: Vec<&LinkRef> = links.iter().filter(|l| l.is_internal).collect();
        assert_eq!(internal.len(), 2);
        assert!(internal
            .iter()
            .any(|l| l.href == "https://example.com/services/repairs"));
        let external = links.iter().find(|l| !l.is_internal).unwrap();
        assert_eq!(external.href, "https://other.com/partner");
    }

    #[test]
    fn test_www_host_treated_as_same() {
        assert!(same_host(Some("www.example.com"), Some("example.com")));
        assert!(same_host(Some("example.com"), Some("example.com")));
        assert!(!same_host(Some("example.com"), Some("sub.example.com")));
    }

    #[test]
    fn test_inline_scripts_excludes_external() {
        let doc = ParsedDoc::parse(PAGE);
        let scripts = inline_scripts(&doc);
        // The ld+json block and the inline state script are both src-less.
        assert_eq!(scripts.len(), 2);
        assert!(scripts.iter().any(|s| s.contains("inlineState")));
    }

    #[test]
    fn test_malformed_jsonld_skipped() {
        let html = r#"<script type="application/ld+json">{not json</script>
                      <script type="application/ld+json">{"@type":"WebSite"}</script>"#;
        let doc = ParsedDoc::parse(html);
        let blocks = extract_jsonld(&doc);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let doc = ParsedDoc::parse("");
        let content = extract_content(&doc, "https://example.com");
        assert!(content.title.is_none());
        assert_eq!(content.word_count, 0);
        assert!(content.links.is_empty());
    }
}
