//! Chromium-based renderer using chromiumoxide.

use super::{RenderContext, RenderedPage, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SITESCORE_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SITESCORE_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.sitescore/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".sitescore/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sitescore/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sitescore/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".sitescore/chromium/chrome-linux64/chrome"),
                home.join(".sitescore/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer. One browser process, many contexts.
pub struct ChromiumRenderer {
    browser: tokio::sync::Mutex<Browser>,
    handler_task: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found; set SITESCORE_CHROMIUM_PATH or install google-chrome")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            handler_task,
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let _ = browser.close().await;
        let _ = browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn render(
        &mut self,
        url: &str,
        timeout_ms: u64,
        settle_ms: u64,
    ) -> Result<RenderedPage> {
        let start = Instant::now();
        let deadline = Duration::from_millis(timeout_ms);

        match tokio::time::timeout(deadline, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }

        // DOM readiness, then network-idle style settle for deferred
        // rendering. wait_for_navigation resolves on load; the settle
        // interval covers post-load hydration.
        let remaining = deadline.saturating_sub(start.elapsed());
        let _ = tokio::time::timeout(remaining, self.page.wait_for_navigation()).await;
        tokio::time::sleep(Duration::from_millis(settle_ms)).await;

        let html: String = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to read rendered DOM")?
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert DOM result: {e:?}"))?;

        let final_url = self
            .page
            .url()
            .await
            .unwrap_or_default()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());

        Ok(RenderedPage {
            final_url,
            html,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_render_data_url() {
        let renderer = ChromiumRenderer::new().await.expect("launch failed");
        let mut ctx = renderer.new_context().await.expect("context failed");

        let page = ctx
            .render("data:text/html,<h1>Hello</h1><p>World</p>", 10_000, 100)
            .await
            .expect("render failed");

        assert!(page.html.contains("<h1>Hello</h1>"));
        assert!(page.load_time_ms < 10_000);

        ctx.close().await.expect("close failed");
        renderer.shutdown().await.expect("shutdown failed");
    }
}
