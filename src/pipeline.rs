// Copyright 2026 Sitescore Contributors
// SPDX-License-Identifier: Apache-2.0

//! Audit pipeline orchestration.
//!
//! Phases run in sequence: profile → discover → prioritize → fetch →
//! deduplicate → analyze → classify → aggregate. Per-URL and per-page
//! failures degrade the result; only render-pool initialization failure
//! (and cancellation) is terminal. The render pool is torn down on every
//! exit path.

use crate::analyze::{self, FactorAnalyzer};
use crate::config::AuditConfig;
use crate::dedup;
use crate::discovery;
use crate::doc::ParsedDoc;
use crate::error::AuditError;
use crate::fetch::{self, PrioritizedUrl};
use crate::http::HttpClient;
use crate::model::{
    AuditResult, DiscoveredUrl, DiscoveryMethod, FactorAssessment, OfiClassification,
    PagePriority, PageRecord, PageType, SiteProfile, StatusCounts,
};
use crate::ofi::{self, BusinessContext, OfiRules};
use crate::priority;
use crate::profile;
use crate::progress::{self, AuditPhase, ProgressKind, ProgressSender};
use crate::render::chromium::ChromiumRenderer;
use crate::render::pool::RenderPool;
use crate::render::Renderer;
use crate::score;
use chrono::Utc;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Cooperative cancellation handle for an audit run.
///
/// Cancellation is observed between tasks: no new work is submitted once
/// the flag is set, in-flight fetches finish or hit their timeout, and
/// the run returns [`AuditError::Cancelled`]. Partial results are
/// discarded by the caller.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run a complete audit of `base_url`.
///
/// Returns a complete (possibly partially-analyzed) [`AuditResult`], or a
/// single fatal error. Degraded-but-non-empty runs never error.
pub async fn run_audit(
    base_url: &str,
    config: &AuditConfig,
    progress: Option<ProgressSender>,
    cancel: CancelFlag,
) -> Result<AuditResult, AuditError> {
    let started_at = Utc::now();
    let started = Instant::now();
    let base_url = normalize_base(base_url)?;
    let mut seq = 0u64;

    let client = HttpClient::new(config.fetch_timeout_ms, config.fetch_retries);

    // ── Phase 1: profile ────────────────────────────────────────────────
    progress::emit(
        &progress,
        &mut seq,
        0.0,
        ProgressKind::PhaseStarted {
            phase: AuditPhase::Profiling,
            message: format!("profiling {base_url}"),
        },
    );
    let site_profile = profile::profile_site(&base_url, &client).await;
    progress::emit(
        &progress,
        &mut seq,
        0.05,
        ProgressKind::PhaseCompleted {
            phase: AuditPhase::Profiling,
            message: if site_profile.is_render_dependent {
                "site is JavaScript-rendering dependent".to_string()
            } else {
                "site serves static markup".to_string()
            },
            duration_ms: started.elapsed().as_millis() as u64,
        },
    );
    if cancel.is_cancelled() {
        return Err(AuditError::Cancelled);
    }

    // ── Render pool (render-dependent sites only) ───────────────────────
    // Launch failure is fatal: a render-dependent site cannot be audited
    // without a renderer.
    let pool = if site_profile.is_render_dependent && config.analyze_javascript {
        let renderer = ChromiumRenderer::new()
            .await
            .map_err(|e| AuditError::WorkerPoolInit(e.to_string()))?;
        let renderer: Arc<dyn Renderer> = Arc::new(renderer);
        Some(RenderPool::initialize(renderer, config.render_concurrency).await?)
    } else {
        None
    };

    // The pool must be released on every path out of the phases below.
    let result = run_phases(
        &base_url,
        &site_profile,
        config,
        &client,
        pool.as_ref(),
        &progress,
        &mut seq,
        &cancel,
        started_at,
        started,
    )
    .await;

    if let Some(pool) = &pool {
        pool.shutdown().await;
    }

    result
}

#[allow(clippy::too_many_arguments)]
async fn run_phases(
    base_url: &str,
    site_profile: &SiteProfile,
    config: &AuditConfig,
    client: &HttpClient,
    pool: Option<&RenderPool>,
    progress: &Option<ProgressSender>,
    seq: &mut u64,
    cancel: &CancelFlag,
    started_at: chrono::DateTime<Utc>,
    started: Instant,
) -> Result<AuditResult, AuditError> {
    // ── Phase 2: discovery ──────────────────────────────────────────────
    progress::emit(
        progress,
        seq,
        0.05,
        ProgressKind::PhaseStarted {
            phase: AuditPhase::Discovery,
            message: "discovering pages".to_string(),
        },
    );

    // For render-dependent sites, prefer a rendered homepage DOM so link
    // extraction sees client-side navigation.
    let homepage_html = match pool {
        Some(pool) => {
            match pool
                .render(base_url, config.render_timeout_ms, config.settle_ms)
                .await
            {
                Ok(page) => Some(page.html),
                Err(e) => {
                    warn!("homepage render failed ({e}), falling back to static markup");
                    site_profile.homepage_html.clone()
                }
            }
        }
        None => site_profile.homepage_html.clone(),
    };

    let outcome = discovery::discover(site_profile, homepage_html.as_deref(), config, client).await;
    progress::emit(
        progress,
        seq,
        0.20,
        ProgressKind::PhaseCompleted {
            phase: AuditPhase::Discovery,
            message: format!(
                "{} pages, {} api endpoints",
                outcome.pages.len(),
                outcome.api_endpoints.len()
            ),
            duration_ms: started.elapsed().as_millis() as u64,
        },
    );
    if cancel.is_cancelled() {
        return Err(AuditError::Cancelled);
    }

    // ── Phase 3: prioritize and select the fetch budget ─────────────────
    let prioritized: Vec<PrioritizedUrl> = outcome
        .pages
        .iter()
        .map(|d| PrioritizedUrl {
            priority: priority::classify(&d.url, d.page_type_hint),
            discovered: d.clone(),
        })
        .collect();

    let mut fetch_list = vec![homepage_entry(base_url)];
    fetch_list.extend(fetch::select_fetch_budget(&prioritized, config.max_pages));

    // Priorities are assigned once here and looked up later, not
    // recomputed.
    let priorities: HashMap<String, PagePriority> = fetch_list
        .iter()
        .map(|p| (p.discovered.url.clone(), p.priority))
        .collect();

    // ── Phase 4: fetch ──────────────────────────────────────────────────
    progress::emit(
        progress,
        seq,
        0.30,
        ProgressKind::PhaseStarted {
            phase: AuditPhase::Fetching,
            message: format!("fetching {} pages", fetch_list.len()),
        },
    );
    let records = fetch::fetch_pages(
        &fetch_list,
        config,
        client,
        pool,
        progress,
        seq,
        cancel,
    )
    .await;
    if cancel.is_cancelled() {
        return Err(AuditError::Cancelled);
    }
    if records.is_empty() {
        return Err(AuditError::EmptyCrawl(base_url.to_string()));
    }

    // ── Phase 5: deduplicate ────────────────────────────────────────────
    progress::emit(
        progress,
        seq,
        0.85,
        ProgressKind::PhaseStarted {
            phase: AuditPhase::Deduplication,
            message: format!("collapsing near-duplicates across {} pages", records.len()),
        },
    );
    let pages = dedup::deduplicate(records, config.similarity_threshold);
    info!("{} pages retained after dedup", pages.len());

    // ── Phase 6: analyze + classify ─────────────────────────────────────
    progress::emit(
        progress,
        seq,
        0.90,
        ProgressKind::PhaseStarted {
            phase: AuditPhase::Analysis,
            message: format!("evaluating quality factors on {} pages", pages.len()),
        },
    );

    let pages_analyzed = pages.len() as u32;
    let rules = OfiRules::default();
    let priorities_for_analysis = priorities.clone();
    let (assessments, classifications) = tokio::task::spawn_blocking(move || {
        analyze_pages(&pages, &priorities_for_analysis, &rules)
    })
    .await
    .map_err(|e| AuditError::Analysis {
        analyzer: "all".to_string(),
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    // ── Phase 7: aggregate ──────────────────────────────────────────────
    progress::emit(
        progress,
        seq,
        0.95,
        ProgressKind::PhaseStarted {
            phase: AuditPhase::Aggregation,
            message: "aggregating scores".to_string(),
        },
    );
    let breakdown = score::aggregate(&assessments, &classifications, &config.category_weights);

    let finished_at = Utc::now();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    progress::emit(
        progress,
        seq,
        1.0,
        ProgressKind::AuditComplete {
            overall_score: breakdown.overall,
            pages_analyzed,
            elapsed_ms,
        },
    );

    Ok(AuditResult {
        base_url: base_url.to_string(),
        started_at,
        finished_at,
        elapsed_ms,
        pages_analyzed,
        render_dependent: site_profile.is_render_dependent,
        total_factors: assessments.len() as u32,
        status_counts: StatusCounts::tally(&assessments),
        overall_score: breakdown.overall,
        category_scores: breakdown.per_category,
        assessments,
        classifications,
    })
}

/// Evaluate every analyzer over every page, then derive classifications.
///
/// A single analyzer failing on a page contributes zero factors for that
/// page; the page and the other analyzers are unaffected.
fn analyze_pages(
    pages: &[PageRecord],
    priorities: &HashMap<String, PagePriority>,
    rules: &OfiRules,
) -> (Vec<FactorAssessment>, Vec<OfiClassification>) {
    let analyzers = analyze::analyzers();
    let mut assessments: Vec<FactorAssessment> = Vec::new();
    let mut classifications: Vec<OfiClassification> = Vec::new();

    for page in pages {
        let doc = ParsedDoc::parse(&page.raw_html);
        let page_priority = priorities
            .get(&page.url)
            .copied()
            .unwrap_or_else(|| priority::classify(&page.url, Some(page.page_type)));
        let ctx = BusinessContext {
            is_conversion_page: is_conversion_page(page),
        };

        for analyzer in &analyzers {
            let page_assessments = run_analyzer(analyzer.as_ref(), page, &doc);
            for assessment in page_assessments {
                let classification = ofi::classify(&assessment, page_priority, &ctx, rules);
                assessments.push(assessment);
                classifications.push(classification);
            }
        }
    }

    (assessments, classifications)
}

fn run_analyzer(
    analyzer: &dyn FactorAnalyzer,
    page: &PageRecord,
    doc: &ParsedDoc,
) -> Vec<FactorAssessment> {
    match catch_unwind(AssertUnwindSafe(|| analyzer.analyze(page, doc))) {
        Ok(assessments) => assessments,
        Err(_) => {
            warn!(
                "analyzer {} failed on {}; contributing zero factors",
                analyzer.name(),
                page.url
            );
            Vec::new()
        }
    }
}

fn is_conversion_page(page: &PageRecord) -> bool {
    page.page_type == PageType::Contact
        || crate::pagetype::url_signal(&page.url) == Some(PageType::Contact)
}

fn homepage_entry(base_url: &str) -> PrioritizedUrl {
    PrioritizedUrl {
        discovered: DiscoveredUrl {
            url: base_url.to_string(),
            method: DiscoveryMethod::Link,
            page_type_hint: Some(PageType::Homepage),
        },
        priority: PagePriority::TIER1,
    }
}

/// Validate and normalize the audit target to `scheme://host/`.
fn normalize_base(raw: &str) -> Result<String, AuditError> {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let parsed = url::Url::parse(&with_scheme).map_err(|e| AuditError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed.host_str().ok_or_else(|| AuditError::InvalidUrl {
        url: raw.to_string(),
        reason: "no host".to_string(),
    })?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}
