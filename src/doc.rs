//! Typed query interface over a parsed HTML document.
//!
//! Factor analyzers query pages exclusively through [`ParsedDoc`] so they
//! stay independent of the concrete parser (`scraper` today). Invalid
//! selectors and malformed markup degrade to empty results — analyzers
//! must never panic on hostile input.

use scraper::{Html, Selector};

/// A parsed HTML document with typed query helpers.
pub struct ParsedDoc {
    document: Html,
}

impl ParsedDoc {
    /// Parse an HTML string. Malformed markup yields a best-effort tree,
    /// never an error.
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub(crate) fn document(&self) -> &Html {
        &self.document
    }

    /// Number of elements matching a CSS selector. Invalid selectors
    /// match nothing.
    pub fn count(&self, selector: &str) -> usize {
        match Selector::parse(selector) {
            Ok(sel) => self.document.select(&sel).count(),
            Err(_) => 0,
        }
    }

    pub fn exists(&self, selector: &str) -> bool {
        self.count(selector) > 0
    }

    /// Collapsed, trimmed text of the first matching element.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.document
            .select(&sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    /// Collapsed, trimmed text of every matching element.
    pub fn all_texts(&self, selector: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.document
            .select(&sel)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Value of `attr` on the first matching element.
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Value of `attr` on every matching element that carries it.
    pub fn attr_values(&self, selector: &str, attr: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.document
            .select(&sel)
            .filter_map(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Content of `<meta name="...">`.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.first_attr(&format!(r#"meta[name="{name}"]"#), "content")
    }

    /// Content of `<meta property="...">` (OpenGraph-style tags).
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.first_attr(&format!(r#"meta[property="{property}"]"#), "content")
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
