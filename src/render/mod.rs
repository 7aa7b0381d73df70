//! Renderer abstraction for headless page rendering.
//!
//! `Renderer` and `RenderContext` abstract over the browser engine
//! (Chromium via chromiumoxide today) so the fetch pipeline and the
//! worker pool never name a concrete engine. Tests substitute stub
//! implementations.

pub mod chromium;
pub mod pool;

use anyhow::Result;
use async_trait::async_trait;

/// Result of navigating a context to a URL.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL after any redirects.
    pub final_url: String,
    /// Fully rendered document HTML.
    pub html: String,
    /// Time from navigation start to extraction, in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the engine, closing the browser process.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser context (tab).
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate, wait for DOM readiness and a settle interval, and return
    /// the rendered document.
    async fn render(&mut self, url: &str, timeout_ms: u64, settle_ms: u64)
        -> Result<RenderedPage>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
