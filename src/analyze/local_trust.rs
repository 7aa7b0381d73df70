//! Local-business and trust-signal factor catalog: NAP data, reviews,
//! credentials, and policy links.

use super::{contains_any, FactorAnalyzer, FactorSheet};
use crate::doc::ParsedDoc;
use crate::model::{
    FactorAssessment, FactorCategory, FactorStatus, Importance, PageRecord, PageType,
};
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
            r"(?i)\b\d{1,5}\s+[A-Za-z][A-Za-z ]{2,40}\s+(street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct|suite|ste)\b",
        )
        .expect("valid regex")
    })
}

/// Pages where direct contact data is expected rather than optional.
fn expects_contact_data(page_type: PageType) -> bool {
    matches!(
        page_type,
        PageType::Homepage | PageType::Contact | PageType::Location
    )
}

pub struct LocalTrustAnalyzer;

impl FactorAnalyzer for LocalTrustAnalyzer {
    fn name(&self) -> &'static str {
        "local-trust"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::LocalTrust
    }

    fn analyze(&self, page: &PageRecord, doc: &ParsedDoc) -> Vec<FactorAssessment> {
        let mut sheet = FactorSheet::new(page, self.category());

        phone_visibility(&mut sheet, page, doc);
        address_presence(&mut sheet, page);
        nap_consistency(&mut sheet, page, doc);
        local_schema(&mut sheet, page);
        reviews(&mut sheet, page);
        credentials(&mut sheet, page);
        social_profiles(&mut sheet, page);
        policy_link(&mut sheet, page, "Privacy Policy Link", "privacy", Importance::Medium);
        policy_link(&mut sheet, page, "Terms of Service Link", "terms", Importance::Low);
        business_hours(&mut sheet, page);
        service_area(&mut sheet, page);
        maps_embed(&mut sheet, page, doc);
        about_transparency(&mut sheet, page);
        copyright_currency(&mut sheet, page);

        sheet.finish()
    }
}

fn phone_visibility(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    if !expects_contact_data(page.page_type) {
        sheet.add(
            "Phone Number Visibility",
            Importance::High,
            FactorStatus::NotApplicable,
            "phone number not expected on this page type",
        );
        return;
    }
    let found = phone_re().is_match(&page.body_text) || doc.exists(r#"a[href^="tel:"]"#);
    sheet.check(
        "Phone Number Visibility",
        Importance::High,
        found,
        if found {
            "phone number or tel: link present"
        } else {
            "no phone number found on a contact-critical page"
        },
    );
}

fn address_presence(sheet: &mut FactorSheet, page: &PageRecord) {
    if !expects_contact_data(page.page_type) {
        sheet.add(
            "Physical Address Presence",
            Importance::High,
            FactorStatus::NotApplicable,
            "street address not expected on this page type",
        );
        return;
    }
    let found = address_re().is_match(&page.body_text);
    sheet.check(
        "Physical Address Presence",
        Importance::High,
        found,
        if found {
            "street address found"
        } else {
            "no street address found on a contact-critical page"
        },
    );
}

fn nap_consistency(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    if page.page_type != PageType::Contact {
        sheet.add(
            "NAP Consistency",
            Importance::High,
            FactorStatus::NotApplicable,
            "NAP block evaluated on the contact page",
        );
        return;
    }
    let has_phone = phone_re().is_match(&page.body_text) || doc.exists(r#"a[href^="tel:"]"#);
    let has_address = address_re().is_match(&page.body_text);
    let has_name = page.title.as_deref().map(|t| !t.trim().is_empty()).unwrap_or(false);

    let complete = has_phone && has_address && has_name;
    sheet.check(
        "NAP Consistency",
        Importance::High,
        complete,
        format!(
            "name: {}, address: {}, phone: {}",
            present(has_name),
            present(has_address),
            present(has_phone)
        ),
    );
}

fn present(b: bool) -> &'static str {
    if b {
        "present"
    } else {
        "missing"
    }
}

fn local_schema(sheet: &mut FactorSheet, page: &PageRecord) {
    let found = page.structured_data.iter().any(|block| {
        block
            .get("@type")
            .and_then(|t| t.as_str())
            .map(|t| {
                let t = t.to_lowercase();
                t.contains("localbusiness") || t.contains("organization")
            })
            .unwrap_or(false)
    });
    sheet.check(
        "LocalBusiness Structured Data",
        Importance::Medium,
        found,
        if found {
            "LocalBusiness/Organization schema present"
        } else {
            "no LocalBusiness or Organization schema"
        },
    );
}

fn reviews(sheet: &mut FactorSheet, page: &PageRecord) {
    let found = contains_any(
        &page.body_text,
        &["review", "testimonial", "rated", "stars", "trustpilot"],
    );
    sheet.check(
        "Customer Reviews & Testimonials",
        Importance::Medium,
        found,
        if found {
            "review or testimonial content referenced"
        } else {
            "no review or testimonial signals"
        },
    );
}

fn credentials(sheet: &mut FactorSheet, page: &PageRecord) {
    let found = contains_any(
        &page.body_text,
        &[
            "licensed",
            "insured",
            "certified",
            "accredited",
            "bbb",
            "award",
            "guarantee",
        ],
    );
    sheet.check(
        "Credentials & Trust Badges",
        Importance::Low,
        found,
        if found {
            "licensing or certification language present"
        } else {
            "no licensing, insurance, or certification signals"
        },
    );
}

fn social_profiles(sheet: &mut FactorSheet, page: &PageRecord) {
    const SOCIAL_HOSTS: &[&str] = &[
        "facebook.com",
        "instagram.com",
        "linkedin.com",
        "youtube.com",
        "twitter.com",
        "x.com",
        "tiktok.com",
        "yelp.com",
    ];
    let found = page.links.iter().any(|l| {
        let href = l.href.to_lowercase();
        SOCIAL_HOSTS.iter().any(|h| href.contains(h))
    });
    sheet.check(
        "Social Profile Links",
        Importance::Low,
        found,
        if found {
            "links to social profiles found"
        } else {
            "no social profile links"
        },
    );
}

fn policy_link(
    sheet: &mut FactorSheet,
    page: &PageRecord,
    factor: &str,
    token: &str,
    importance: Importance,
) {
    let found = page.links.iter().any(|l| {
        l.href.to_lowercase().contains(token) || l.text.to_lowercase().contains(token)
    });
    sheet.check(
        factor,
        importance,
        found,
        if found {
            format!("{token} page linked")
        } else {
            format!("no {token} link found")
        },
    );
}

fn business_hours(sheet: &mut FactorSheet, page: &PageRecord) {
    if !expects_contact_data(page.page_type) {
        sheet.add(
            "Business Hours",
            Importance::Low,
            FactorStatus::NotApplicable,
            "hours not expected on this page type",
        );
        return;
    }
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\b(mon|tue|wed|thu|fri|sat|sun)[a-z]*\b.{0,40}\b\d{1,2}(:\d{2})?\s*(am|pm)\b")
            .expect("valid regex")
    });
    let found = re.is_match(&page.body_text) || contains_any(&page.body_text, &["open 24", "24/7"]);
    sheet.check(
        "Business Hours",
        Importance::Low,
        found,
        if found {
            "business hours listed"
        } else {
            "no business hours found"
        },
    );
}

fn service_area(sheet: &mut FactorSheet, page: &PageRecord) {
    let relevant = matches!(
        page.page_type,
        PageType::Homepage | PageType::Service | PageType::ServiceArea | PageType::Location
    );
    if !relevant {
        sheet.add(
            "Service Area Description",
            Importance::Medium,
            FactorStatus::NotApplicable,
            "service area not expected on this page type",
        );
        return;
    }
    let found = contains_any(
        &page.body_text,
        &["serving", "service area", "areas we serve", "proudly serve", "we serve"],
    );
    sheet.check(
        "Service Area Description",
        Importance::Medium,
        found,
        if found {
            "service area described"
        } else {
            "no service-area wording found"
        },
    );
}

fn maps_embed(sheet: &mut FactorSheet, page: &PageRecord, doc: &ParsedDoc) {
    if page.page_type != PageType::Contact {
        sheet.add(
            "Map Embed",
            Importance::Low,
            FactorStatus::NotApplicable,
            "map evaluated on the contact page",
        );
        return;
    }
    let found = doc
        .attr_values("iframe", "src")
        .iter()
        .any(|src| src.contains("google.com/maps") || src.contains("maps.google"));
    sheet.check(
        "Map Embed",
        Importance::Low,
        found,
        if found {
            "embedded map present"
        } else {
            "no embedded map on the contact page"
        },
    );
}

fn about_transparency(sheet: &mut FactorSheet, page: &PageRecord) {
    let found = page.links.iter().any(|l| {
        let href = l.href.to_lowercase();
        l.is_internal && (href.contains("about") || href.contains("team") || href.contains("our-story"))
    });
    sheet.check(
        "About Page Linkage",
        Importance::Low,
        found,
        if found {
            "about/team page linked"
        } else {
            "no about or team page linked"
        },
    );
}

fn copyright_currency(sheet: &mut FactorSheet, page: &PageRecord) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)(?:©|&copy;|copyright)\s*(\d{4})").expect("valid regex")
    });

    let Some(caps) = re.captures(&page.raw_html) else {
        sheet.add(
            "Copyright Currency",
            Importance::Low,
            FactorStatus::NotApplicable,
            "no copyright notice found",
        );
        return;
    };
    let year: i32 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let current = chrono::Utc::now().format("%Y").to_string().parse::<i32>().unwrap_or(year);
    let fresh = (current - year) <= 1;
    sheet.check(
        "Copyright Currency",
        Importance::Low,
        fresh,
        format!("copyright year {year}"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::testutil::page_from_html;

    fn find<'a>(assessments: &'a [FactorAssessment], name: &str) -> &'a FactorAssessment {
        assessments
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("factor {name} missing"))
    }

    fn contact_page() -> (PageRecord, String) {
        let html = r#"<html><head><title>Contact Acme Plumbing Springfield</title></head><body>
            <h1>Contact Us</h1>
            <p>Call (555) 123-4567 or stop by 12 Main Street, Springfield.</p>
            <p>Open Monday through Friday 8:00 am to 5 pm.</p>
            <form><input name="email"></form>
            <iframe src="https://www.google.com/maps/embed?pb=abc"></iframe>
            <a href="/privacy">Privacy</a>
            <a href="https://facebook.com/acme">Facebook</a>
            </body></html>"#;
        (
            page_from_html("https://example.com/contact", html),
            html.to_string(),
        )
    }

    #[test]
    fn test_contact_page_nap_complete() {
        let (page, html) = contact_page();
        assert_eq!(page.page_type, PageType::Contact);
        let doc = ParsedDoc::parse(&html);
        let assessments = LocalTrustAnalyzer.analyze(&page, &doc);

        assert_eq!(find(&assessments, "NAP Consistency").status, FactorStatus::Ok);
        assert_eq!(
            find(&assessments, "Phone Number Visibility").status,
            FactorStatus::Ok
        );
        assert_eq!(
            find(&assessments, "Physical Address Presence").status,
            FactorStatus::Ok
        );
        assert_eq!(find(&assessments, "Business Hours").status, FactorStatus::Ok);
        assert_eq!(find(&assessments, "Map Embed").status, FactorStatus::Ok);
        assert_eq!(
            find(&assessments, "Privacy Policy Link").status,
            FactorStatus::Ok
        );
        assert_eq!(
            find(&assessments, "Social Profile Links").status,
            FactorStatus::Ok
        );
    }

    #[test]
    fn test_blog_page_contact_factors_na() {
        let html = "<html><head><title>Ten Maintenance Tips For Winter</title></head>\
                    <body><h1>Tips</h1><p>Seasonal advice about your plumbing.</p></body></html>";
        let page = page_from_html("https://example.com/blog/tips", html);
        let doc = ParsedDoc::parse(html);
        let assessments = LocalTrustAnalyzer.analyze(&page, &doc);

        assert_eq!(
            find(&assessments, "Phone Number Visibility").status,
            FactorStatus::NotApplicable
        );
        assert_eq!(
            find(&assessments, "NAP Consistency").status,
            FactorStatus::NotApplicable
        );
        assert_eq!(
            find(&assessments, "Map Embed").status,
            FactorStatus::NotApplicable
        );
    }

    #[test]
    fn test_local_schema_detection() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"LocalBusiness","name":"Acme"}</script>
            </head><body></body></html>"#;
        let page = page_from_html("https://example.com/x", html);
        let doc = ParsedDoc::parse(html);
        let assessments = LocalTrustAnalyzer.analyze(&page, &doc);
        assert_eq!(
            find(&assessments, "LocalBusiness Structured Data").status,
            FactorStatus::Ok
        );
    }

    #[test]
    fn test_stale_copyright_flagged() {
        let html = "<html><body><footer>&copy; 2019 Acme Co.</footer></body></html>";
        let page = page_from_html("https://example.com/x", html);
        let doc = ParsedDoc::parse(html);
        let assessments = LocalTrustAnalyzer.analyze(&page, &doc);
        let factor = find(&assessments, "Copyright Currency");
        assert_eq!(factor.status, FactorStatus::Ofi);
        assert!(factor.rationale.contains("2019"));
    }

    #[test]
    fn test_no_copyright_is_na() {
        let html = "<html><body><p>nothing here</p></body></html>";
        let page = page_from_html("https://example.com/x", html);
        let doc = ParsedDoc::parse(html);
        let assessments = LocalTrustAnalyzer.analyze(&page, &doc);
        assert_eq!(
            find(&assessments, "Copyright Currency").status,
            FactorStatus::NotApplicable
        );
    }
}
