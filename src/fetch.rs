//! Page fetching: static HTTP path and rendered browser path.
//!
//! Static sites are fetched sequentially — latency is low and the origin
//! is spared a request burst. Render-dependent sites submit tasks to the
//! bounded browser pool and await them in parallel. Per-URL failures are
//! retried a fixed number of times, then logged and skipped; they never
//! abort the batch.

use crate::config::AuditConfig;
use crate::doc::ParsedDoc;
use crate::extract;
use crate::http::HttpClient;
use crate::model::{CrawlMethod, DiscoveredUrl, PagePriority, PageRecord};
use crate::pagetype;
use crate::pipeline::CancelFlag;
use crate::progress::{self, ProgressKind, ProgressSender};
use crate::render::pool::RenderPool;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

/// A discovered URL paired with its fetch priority.
#[derive(Debug, Clone)]
pub struct PrioritizedUrl {
    pub discovered: DiscoveredUrl,
    pub priority: PagePriority,
}

/// Fraction of overall progress where fetching starts and ends.
const FETCH_PROGRESS_START: f32 = 0.30;
const FETCH_PROGRESS_SPAN: f32 = 0.55;

/// Select which candidates consume the fetch budget.
///
/// The homepage is excluded here — it is always fetched and does not
/// count against `max_pages`. Tier-1 and tier-2 URLs fill the budget
/// first; remaining slots go to tier-3 in discovery order.
pub fn select_fetch_budget(candidates: &[PrioritizedUrl], max_pages: usize) -> Vec<PrioritizedUrl> {
    let mut selected: Vec<PrioritizedUrl> = candidates
        .iter()
        .filter(|c| !is_root_url(&c.discovered.url))
        .cloned()
        .collect();
    // Stable sort: discovery order is preserved within a tier.
    selected.sort_by_key(|c| c.priority.tier);
    selected.truncate(max_pages);
    selected
}

fn is_root_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| u.path() == "/" || u.path().is_empty())
        .unwrap_or(false)
}

/// Fetch every selected URL, best effort.
///
/// `pool` is `Some` only when the run uses the rendered strategy.
/// Completion order is not guaranteed for rendered fetches; downstream
/// phases must group or sort explicitly where order matters.
#[allow(clippy::too_many_arguments)]
pub async fn fetch_pages(
    urls: &[PrioritizedUrl],
    config: &AuditConfig,
    client: &HttpClient,
    pool: Option<&RenderPool>,
    progress: &Option<ProgressSender>,
    seq: &mut u64,
    cancel: &CancelFlag,
) -> Vec<PageRecord> {
    match pool {
        Some(pool) => fetch_rendered(urls, config, pool, progress, seq, cancel).await,
        None => fetch_static(urls, client, progress, seq, cancel).await,
    }
}

async fn fetch_static(
    urls: &[PrioritizedUrl],
    client: &HttpClient,
    progress: &Option<ProgressSender>,
    seq: &mut u64,
    cancel: &CancelFlag,
) -> Vec<PageRecord> {
    let total = urls.len() as u32;
    let mut records = Vec::new();

    for (done, item) in urls.iter().enumerate() {
        if cancel.is_cancelled() {
            debug!("fetch cancelled after {} pages", records.len());
            break;
        }
        let url = &item.discovered.url;

        match fetch_one_static(url, client).await {
            Some(record) => {
                emit_page_progress(progress, seq, &record, done as u32 + 1, total);
                records.push(record);
            }
            None => {
                progress::emit(
                    progress,
                    seq,
                    page_fraction(done as u32 + 1, total),
                    ProgressKind::Warning {
                        message: format!("skipped {url} after retries"),
                    },
                );
            }
        }
    }
    records
}

async fn fetch_one_static(url: &str, client: &HttpClient) -> Option<PageRecord> {
    // Retries for transport errors live in the HTTP client; an error here
    // is already final.
    let resp = match client.get(url).await {
        Ok(r) => r,
        Err(e) => {
            warn!("static fetch failed for {url}: {e}");
            return None;
        }
    };
    if resp.status >= 400 {
        warn!("static fetch for {url} returned HTTP {}", resp.status);
        return None;
    }

    let url = url.to_string();
    tokio::task::spawn_blocking(move || {
        build_record(
            &url,
            resp.status,
            &resp.body,
            CrawlMethod::Static,
            resp.load_time_ms,
            resp.byte_size,
        )
    })
    .await
    .ok()
}

async fn fetch_rendered(
    urls: &[PrioritizedUrl],
    config: &AuditConfig,
    pool: &RenderPool,
    progress: &Option<ProgressSender>,
    seq: &mut u64,
    cancel: &CancelFlag,
) -> Vec<PageRecord> {
    let total = urls.len() as u32;
    let mut tasks = FuturesUnordered::new();

    for item in urls {
        if cancel.is_cancelled() {
            break;
        }
        let url = item.discovered.url.clone();
        let retries = config.fetch_retries;
        let timeout_ms = config.render_timeout_ms;
        let settle_ms = config.settle_ms;
        let cancel = cancel.clone();

        tasks.push(async move {
            let record = render_with_retry(&url, pool, retries, timeout_ms, settle_ms, &cancel).await;
            (url, record)
        });
    }

    let mut records = Vec::new();
    let mut done = 0u32;

    while let Some((url, record)) = tasks.next().await {
        done += 1;
        match record {
            Some(record) => {
                emit_page_progress(progress, seq, &record, done, total);
                records.push(record);
            }
            None => {
                progress::emit(
                    progress,
                    seq,
                    page_fraction(done, total),
                    ProgressKind::Warning {
                        message: format!("skipped {url} after retries"),
                    },
                );
            }
        }
    }
    records
}

async fn render_with_retry(
    url: &str,
    pool: &RenderPool,
    retries: u32,
    timeout_ms: u64,
    settle_ms: u64,
    cancel: &CancelFlag,
) -> Option<PageRecord> {
    for attempt in 0..=retries {
        if cancel.is_cancelled() {
            return None;
        }
        match pool.render(url, timeout_ms, settle_ms).await {
            Ok(page) => {
                let url = url.to_string();
                return tokio::task::spawn_blocking(move || {
                    let byte_size = page.html.len();
                    build_record(
                        &url,
                        // The CDP session does not surface the HTTP status;
                        // a page that rendered is treated as 200.
                        200,
                        &page.html,
                        CrawlMethod::Rendered,
                        page.load_time_ms,
                        byte_size,
                    )
                })
                .await
                .ok();
            }
            Err(e) => {
                warn!("render attempt {} failed for {url}: {e}", attempt + 1);
                if attempt < retries {
                    tokio::time::sleep(Duration::from_millis(500 * 2u64.pow(attempt))).await;
                }
            }
        }
    }
    None
}

/// Build a page record from fetched HTML. Shared by both strategies so
/// records are shape-identical regardless of provenance.
pub fn build_record(
    url: &str,
    status: u16,
    html: &str,
    crawl_method: CrawlMethod,
    load_time_ms: u64,
    byte_size: usize,
) -> PageRecord {
    let doc = ParsedDoc::parse(html);
    let content = extract::extract_content(&doc, url);
    let page_type = pagetype::classify(url, content.title.as_deref(), &content.body_text, &doc);

    PageRecord {
        url: url.to_string(),
        status,
        title: content.title,
        meta_description: content.meta_description,
        canonical: content.canonical,
        body_text: content.body_text,
        word_count: content.word_count,
        headings: content.headings,
        images: content.images,
        links: content.links,
        scripts: content.scripts,
        stylesheets: content.stylesheets,
        structured_data: content.structured_data,
        crawl_method,
        load_time_ms,
        byte_size,
        page_type,
        raw_html: html.to_string(),
    }
}

fn page_fraction(done: u32, total: u32) -> f32 {
    if total == 0 {
        return FETCH_PROGRESS_START + FETCH_PROGRESS_SPAN;
    }
    FETCH_PROGRESS_START + FETCH_PROGRESS_SPAN * (done as f32 / total as f32)
}

fn emit_page_progress(
    progress: &Option<ProgressSender>,
    seq: &mut u64,
    record: &PageRecord,
    done: u32,
    total: u32,
) {
    progress::emit(
        progress,
        seq,
        page_fraction(done, total),
        ProgressKind::PageFetched {
            url: record.url.clone(),
            status: record.status,
            page_type: Some(record.page_type.to_string()),
            fetched: done,
            total,
        },
    );
}
