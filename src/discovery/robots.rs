//! Minimal robots.txt parsing: `Sitemap:` directives plus `Disallow:`
//! prefixes for the wildcard user-agent. Probing respects disallow rules;
//! we never fetch a path the site asked crawlers to stay out of.

/// Parsed robots.txt rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Absolute sitemap URLs listed anywhere in the file.
    pub sitemaps: Vec<String>,
    /// Disallowed path prefixes for `User-agent: *`.
    pub disallow: Vec<String>,
}

impl RobotsRules {
    /// Parse robots.txt text. Unknown directives are ignored; a malformed
    /// file yields empty rules rather than an error.
    pub fn parse(text: &str) -> Self {
        let mut rules = Self::default();
        let mut in_wildcard_group = false;

        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => in_wildcard_group = value == "*",
                "sitemap" if !value.is_empty() => rules.sitemaps.push(value.to_string()),
                "disallow" if in_wildcard_group && !value.is_empty() && value != "/" => {
                    rules.disallow.push(value.to_string());
                }
                // "Disallow: /" blocks the whole site; we record it too so
                // probing skips everything.
                "disallow" if in_wildcard_group && value == "/" => {
                    rules.disallow.push("/".to_string());
                }
                _ => {}
            }
        }
        rules
    }

    /// Whether a path may be fetched under the wildcard group rules.
    pub fn is_allowed(&self, path: &str) -> bool {
        !self.disallow.iter().any(|prefix| path.starts_with(prefix))
    }
}
