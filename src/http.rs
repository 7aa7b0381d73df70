//! Async HTTP client wrapping reqwest.
//!
//! Not a browser — plain HTTP requests with redirects, timeouts, retry on
//! 5xx, and backoff on 429. Captures timing and byte size so fetch
//! provenance flows into page records.

use crate::error::AuditError;
use std::time::{Duration, Instant};

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// Selected response headers, lower-cased names.
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Wall-clock time for the request including retries.
    pub load_time_ms: u64,
    /// Body size in bytes.
    pub byte_size: usize,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Result of an HTTP HEAD existence probe.
#[derive(Debug, Clone)]
pub struct HeadResult {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
}

impl HeadResult {
    /// Probe success: the path exists and is not an error page.
    pub fn is_live(&self) -> bool {
        self.status < 400
    }
}

const CAPTURED_HEADERS: &[&str] = &[
    "content-type",
    "server",
    "x-powered-by",
    "x-generator",
    "strict-transport-security",
    "cache-control",
];

/// HTTP client for the audit pipeline.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a client with a desktop Chrome user-agent and bounded redirects.
    pub fn new(timeout_ms: u64, max_retries: u32) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_retries,
        }
    }

    /// GET with retry on 5xx, backoff on 429, and retry on transport errors.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, AuditError> {
        let start = Instant::now();
        let mut retries = 0u32;

        loop {
            match self.client.get(url).send().await {
                Ok(r) => {
                    let status = r.status().as_u16();

                    if status >= 500 && retries < self.max_retries {
                        retries += 1;
                        tokio::time::sleep(backoff_delay(retries)).await;
                        continue;
                    }

                    if status == 429 && retries < self.max_retries {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        tokio::time::sleep(Duration::from_secs(retry_after.min(10))).await;
                        continue;
                    }

                    let final_url = r.url().to_string();
                    let headers: Vec<(String, String)> = r
                        .headers()
                        .iter()
                        .filter(|(k, _)| CAPTURED_HEADERS.contains(&k.as_str()))
                        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                        .collect();

                    let body = r.text().await.unwrap_or_default();
                    let byte_size = body.len();

                    return Ok(HttpResponse {
                        url: url.to_string(),
                        final_url,
                        status,
                        headers,
                        body,
                        load_time_ms: start.elapsed().as_millis() as u64,
                        byte_size,
                    });
                }
                Err(e) => {
                    if retries < self.max_retries {
                        retries += 1;
                        tokio::time::sleep(backoff_delay(retries)).await;
                        continue;
                    }
                    return Err(AuditError::Network {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Single HEAD existence probe with a short timeout.
    pub async fn head(&self, url: &str, timeout_ms: u64) -> Result<HeadResult, AuditError> {
        let resp = self
            .client
            .head(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| AuditError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(HeadResult {
            url: url.to_string(),
            status: resp.status().as_u16(),
            content_type: resp
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
        })
    }

    /// Parallel HEAD probes with bounded concurrency. Failed probes are
    /// dropped — a path that cannot be probed is treated as absent.
    pub async fn head_many(
        &self,
        urls: &[String],
        concurrency: usize,
        timeout_ms: u64,
    ) -> Vec<HeadResult> {
        use futures::stream::{self, StreamExt};

        stream::iter(urls.iter())
            .map(|url| {
                let client = self.clone();
                let u = url.clone();
                async move { client.head(&u, timeout_ms).await.ok() }
            })
            .buffer_unordered(concurrency.max(1))
            .filter_map(|r| async move { r })
            .collect()
            .await
    }

    /// Parallel GETs with bounded concurrency.
    pub async fn get_many(
        &self,
        urls: &[String],
        concurrency: usize,
    ) -> Vec<Result<HttpResponse, AuditError>> {
        use futures::stream::{self, StreamExt};

        stream::iter(urls.iter())
            .map(|url| {
                let client = self.clone();
                let u = url.clone();
                async move { client.get(&u).await }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(attempt.saturating_sub(1)))
}
