//! Bounded worker pool of browser contexts.
//!
//! The pool is the only shared mutable resource in a run: each task
//! checks out exactly one context, contexts are never shared across
//! concurrent tasks, and idle contexts are reused. The pool is owned by
//! one pipeline run, constructed explicitly at run start, and torn down
//! on every exit path — leaking a browser process is a correctness bug.

use super::{RenderContext, RenderedPage, Renderer};
use crate::error::AuditError;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, warn};

pub struct RenderPool {
    renderer: Arc<dyn Renderer>,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn RenderContext>>>,
}

impl RenderPool {
    /// Construct a pool over an already-launched engine and verify it can
    /// produce a context. Verification failure is fatal to the run: a
    /// render-dependent site cannot be audited without a working pool.
    pub async fn initialize(
        renderer: Arc<dyn Renderer>,
        concurrency: usize,
    ) -> Result<Self, AuditError> {
        let first = renderer
            .new_context()
            .await
            .map_err(|e| AuditError::WorkerPoolInit(e.to_string()))?;

        debug!("render pool ready, concurrency {concurrency}");
        Ok(Self {
            renderer,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            idle: Mutex::new(vec![first]),
        })
    }

    /// Render one URL in a checked-out context, bounded by pool
    /// concurrency. A context that errors is closed rather than returned
    /// to the idle set.
    pub async fn render(
        &self,
        url: &str,
        timeout_ms: u64,
        settle_ms: u64,
    ) -> Result<RenderedPage> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| anyhow::anyhow!("render pool is shut down"))?;

        let mut ctx = match self.idle.lock().await.pop() {
            Some(ctx) => ctx,
            None => self.renderer.new_context().await?,
        };

        match ctx.render(url, timeout_ms, settle_ms).await {
            Ok(page) => {
                self.idle.lock().await.push(ctx);
                Ok(page)
            }
            Err(e) => {
                if let Err(close_err) = ctx.close().await {
                    warn!("failed to close errored context: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// Close every idle context and shut the engine down. No new renders
    /// are admitted afterward.
    pub async fn shutdown(&self) {
        self.permits.close();

        let contexts = std::mem::take(&mut *self.idle.lock().await);
        for ctx in contexts {
            if let Err(e) = ctx.close().await {
                warn!("context close during shutdown failed: {e}");
            }
        }
        if let Err(e) = self.renderer.shutdown().await {
            warn!("renderer shutdown failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRenderer {
        created: AtomicUsize,
        closed: Arc<AtomicUsize>,
        fail_contexts: bool,
    }

    impl StubRenderer {
        fn new(fail_contexts: bool) -> Self {
            Self {
                created: AtomicUsize::new(0),
                closed: Arc::new(AtomicUsize::new(0)),
                fail_contexts,
            }
        }
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
            if self.fail_contexts {
                anyhow::bail!("no browser");
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubContext {
                closed: Arc::clone(&self.closed),
            }))
        }
        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    struct StubContext {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RenderContext for StubContext {
        async fn render(
            &mut self,
            url: &str,
            _timeout_ms: u64,
            _settle_ms: u64,
        ) -> Result<RenderedPage> {
            if url.contains("broken") {
                anyhow::bail!("navigation failed");
            }
            Ok(RenderedPage {
                final_url: url.to_string(),
                html: format!("<html><body>{url}</body></html>"),
                load_time_ms: 1,
            })
        }
        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_init_failure_is_worker_pool_error() {
        let renderer = Arc::new(StubRenderer::new(true));
        let err = RenderPool::initialize(renderer, 4).await.err().unwrap();
        assert!(matches!(err, AuditError::WorkerPoolInit(_)));
    }

    #[tokio::test]
    async fn test_idle_context_reused_across_tasks() {
        let renderer = Arc::new(StubRenderer::new(false));
        let pool = RenderPool::initialize(Arc::clone(&renderer) as Arc<dyn Renderer>, 4)
            .await
            .unwrap();

        for i in 0..5 {
            let page = pool
                .render(&format!("https://example.com/p{i}"), 1000, 0)
                .await
                .unwrap();
            assert!(page.html.contains(&format!("p{i}")));
        }

        // Sequential renders reuse the single verified context.
        assert_eq!(renderer.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errored_context_closed_not_reused() {
        let renderer = Arc::new(StubRenderer::new(false));
        let pool = RenderPool::initialize(Arc::clone(&renderer) as Arc<dyn Renderer>, 4)
            .await
            .unwrap();

        assert!(pool.render("https://example.com/broken", 1000, 0).await.is_err());
        assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);

        // Next render gets a fresh context.
        pool.render("https://example.com/fine", 1000, 0).await.unwrap();
        assert_eq!(renderer.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_and_rejects_new_work() {
        let renderer = Arc::new(StubRenderer::new(false));
        let pool = RenderPool::initialize(Arc::clone(&renderer) as Arc<dyn Renderer>, 2)
            .await
            .unwrap();

        pool.render("https://example.com/", 1000, 0).await.unwrap();
        pool.shutdown().await;

        assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
        assert!(pool.render("https://example.com/late", 1000, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_permits() {
        let renderer = Arc::new(StubRenderer::new(false));
        let pool = Arc::new(
            RenderPool::initialize(Arc::clone(&renderer) as Arc<dyn Renderer>, 2)
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for i in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                pool.render(&format!("https://example.com/{i}"), 1000, 0)
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // At most one context per permit can exist at a time.
        assert!(renderer.created.load(Ordering::SeqCst) <= 2);
    }
}
