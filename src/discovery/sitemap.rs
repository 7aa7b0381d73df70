//! Sitemap XML parsing.
//!
//! Handles both `<urlset>` files and `<sitemapindex>` files. Page URLs and
//! child sitemap references are returned separately; the discovery
//! orchestrator fetches one level of children and applies the per-sitemap
//! URL cap to bound cost.

use crate::error::AuditError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parsed contents of one sitemap file.
#[derive(Debug, Clone, Default)]
pub struct SitemapFile {
    /// Page URLs from `<url><loc>` entries.
    pub page_urls: Vec<String>,
    /// Child sitemap URLs from `<sitemap><loc>` entries (index files).
    pub child_sitemaps: Vec<String>,
}

/// Parse a sitemap XML string.
///
/// `url_cap` bounds the number of page URLs taken from this one file.
pub fn parse_sitemap(xml: &str, url_cap: usize) -> Result<SitemapFile, AuditError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut file = SitemapFile::default();
    let mut buf = Vec::new();

    let mut in_url = false;
    let mut in_sitemap = false;
    let mut in_loc = false;
    let mut current_loc = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                match e.local_name().as_ref() {
                    b"url" => {
                        in_url = true;
                        current_loc.clear();
                    }
                    b"sitemap" => {
                        in_sitemap = true;
                        current_loc.clear();
                    }
                    b"loc" => in_loc = true,
                    _ => {}
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"url" => {
                    if in_url && !current_loc.is_empty() && file.page_urls.len() < url_cap {
                        file.page_urls.push(current_loc.clone());
                    }
                    in_url = false;
                }
                b"sitemap" => {
                    if in_sitemap && !current_loc.is_empty() {
                        file.child_sitemaps.push(current_loc.clone());
                    }
                    in_sitemap = false;
                }
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_loc && (in_url || in_sitemap) {
                    let text = e.unescape().unwrap_or_default();
                    current_loc = text.trim().to_string();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AuditError::Parse(format!("sitemap XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(file)
}

/// Conventional sitemap locations probed when robots.txt lists none.
pub const CONVENTIONAL_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/wp-sitemap.xml",
    "/sitemap1.xml",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url><loc>https://example.com/</loc></url>
          <url><loc>https://example.com/services</loc><lastmod>2024-01-15</lastmod></url>
          <url><loc>https://example.com/contact</loc></url>
        </urlset>"#;

        let file = parse_sitemap(xml, 50).unwrap();
        assert_eq!(file.page_urls.len(), 3);
        assert_eq!(file.page_urls[1], "https://example.com/services");
        assert!(file.child_sitemaps.is_empty());
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<?xml version="1.0"?>
        <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
          <sitemap><loc>https://example.com/sitemap-posts.xml</loc></sitemap>
        </sitemapindex>"#;

        let file = parse_sitemap(xml, 50).unwrap();
        assert!(file.page_urls.is_empty());
        assert_eq!(file.child_sitemaps.len(), 2);
    }

    #[test]
    fn test_url_cap_enforced() {
        let mut xml = String::from(r#"<urlset>"#);
        for i in 0..80 {
            xml.push_str(&format!("<url><loc>https://example.com/p{i}</loc></url>"));
        }
        xml.push_str("</urlset>");

        let file = parse_sitemap(&xml, 50).unwrap();
        assert_eq!(file.page_urls.len(), 50);
    }

    /// The parser must never panic on arbitrary input.
    #[test]
    fn test_fuzz_never_panics() {
        let inputs = [
            "",
            "not xml",
            "<",
            "<url>",
            "<url><loc>",
            "<<<>>>",
            "<urlset><url></url></urlset>",
            "<urlset><url><loc></loc></url></urlset>",
            "\x00\x01\x02",
            "<sitemapindex></sitemapindex>",
        ];
        for input in &inputs {
            let _ = parse_sitemap(input, 50);
        }
        let deep = "<url>".repeat(5000);
        let _ = parse_sitemap(&deep, 50);
    }
}
