//! Site profiler: one homepage fetch, then render-dependency heuristics.
//!
//! A site is flagged render-dependent when any strong signal is present:
//! a known SPA framework marker, a near-empty server-rendered body with a
//! heavy script payload, or dynamic-content APIs in inline scripts. On
//! network failure the profiler degrades to a conservative static-mode
//! profile rather than failing the run.

use crate::doc::ParsedDoc;
use crate::http::HttpClient;
use crate::model::SiteProfile;
use tracing::{debug, warn};

/// Framework tokens searched for in markup and script URLs.
/// Each entry is (marker substring, reported name).
const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("__next_data__", "next.js"),
    ("_next/static", "next.js"),
    ("__nuxt", "nuxt"),
    ("data-reactroot", "react"),
    ("react-dom", "react"),
    ("ng-version", "angular"),
    ("ng-app", "angularjs"),
    ("data-v-app", "vue"),
    ("vue.runtime", "vue"),
    ("__svelte", "svelte"),
    ("ember-application", "ember"),
    ("___gatsby", "gatsby"),
    ("data-remix-run", "remix"),
    ("astro-island", "astro"),
];

/// Script-tag count at or above which a site is considered script-heavy.
const HIGH_SCRIPT_COUNT: usize = 15;

/// Rendered-body word count below which markup is considered near-empty.
const THIN_BODY_WORDS: usize = 30;

/// Profile a site by fetching its homepage once.
///
/// Never returns an error: any failure degrades to
/// [`SiteProfile::fallback`] so the run proceeds with the static strategy.
pub async fn profile_site(base_url: &str, client: &HttpClient) -> SiteProfile {
    let resp = match client.get(base_url).await {
        Ok(r) if r.status < 400 => r,
        Ok(r) => {
            warn!("homepage returned HTTP {}, using static profile", r.status);
            return SiteProfile::fallback(base_url);
        }
        Err(e) => {
            warn!("homepage fetch failed ({e}), using static profile");
            return SiteProfile::fallback(base_url);
        }
    };

    let server_header = resp.header("server").map(|s| s.to_string());
    let powered_by = resp.header("x-powered-by").map(|s| s.to_string());
    let mut profile = analyze_homepage(base_url, &resp.body);
    profile.server_header = server_header;
    if profile.generator.is_none() {
        profile.generator = powered_by;
    }

    debug!(
        "profiled {base_url}: render_dependent={}, scripts={}, markers={:?}",
        profile.is_render_dependent, profile.script_count, profile.framework_markers
    );
    profile
}

/// Pure heuristic pass over homepage HTML.
pub fn analyze_homepage(base_url: &str, html: &str) -> SiteProfile {
    let doc = ParsedDoc::parse(html);
    let lower = html.to_lowercase();

    let script_count = doc.count("script");
    let async_count = doc.count("script[async]") + doc.count("script[defer]");
    let async_script_ratio = if script_count > 0 {
        async_count as f32 / script_count as f32
    } else {
        0.0
    };

    let mut framework_markers: Vec<String> = Vec::new();
    for (marker, name) in FRAMEWORK_MARKERS {
        if lower.contains(marker) && !framework_markers.iter().any(|m| m == name) {
            framework_markers.push((*name).to_string());
        }
    }

    let inline_scripts = doc.all_texts("script");
    let has_dynamic_dom = inline_scripts.iter().any(|s| {
        s.contains("document.createElement")
            || s.contains("innerHTML")
            || s.contains("appendChild")
            || s.contains("fetch(")
            || s.contains("XMLHttpRequest")
    });
    let has_service_worker = lower.contains("serviceworker.register")
        || lower.contains("navigator.serviceworker");

    let body_words = doc
        .first_text("body")
        .map(|t| t.split_whitespace().count())
        .unwrap_or(0);

    // Strong signals. A thin body only counts when scripts are present to
    // fill it in; dynamic DOM APIs only count alongside a script-heavy page.
    let is_render_dependent = !framework_markers.is_empty()
        || (body_words < THIN_BODY_WORDS && script_count >= 3)
        || script_count >= HIGH_SCRIPT_COUNT
        || (has_dynamic_dom && has_service_worker);

    let generator = doc.meta_content("generator");

    SiteProfile {
        base_url: base_url.to_string(),
        is_render_dependent,
        script_count,
        async_script_ratio,
        framework_markers,
        server_header: None,
        generator,
        homepage_html: Some(html.to_string()),
    }
}
