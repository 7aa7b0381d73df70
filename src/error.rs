//! Error taxonomy for the audit pipeline.
//!
//! Per-URL and per-page failures are caught at the narrowest scope and
//! converted into partial results plus a log entry. Only pool
//! initialization failure (and cancellation) propagates to the top-level
//! caller as a terminal error.

use thiserror::Error;

/// Errors surfaced by the audit pipeline.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A fetch or timeout failure. Recoverable: retried, then skipped.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// Malformed HTML/XML/JSON. Recoverable: degrades the affected record.
    #[error("parse error: {0}")]
    Parse(String),

    /// Site detection failed. Recoverable: the run defaults to static mode.
    #[error("site profiling failed for {url}: {reason}")]
    Profiling { url: String, reason: String },

    /// The headless render pool could not be initialized. Fatal: a
    /// render-dependent site cannot be audited without a renderer.
    #[error("render pool initialization failed: {0}")]
    WorkerPoolInit(String),

    /// A single analyzer failed on a page. Recoverable: that analyzer
    /// contributes zero factors for the page.
    #[error("analyzer {analyzer} failed on {url}: {reason}")]
    Analysis {
        analyzer: String,
        url: String,
        reason: String,
    },

    /// The run was cancelled cooperatively. Partial results are discarded.
    #[error("audit cancelled")]
    Cancelled,

    /// Discovery and fetching produced no usable pages at all.
    #[error("no pages could be fetched for {0}")]
    EmptyCrawl(String),

    /// The target URL could not be parsed.
    #[error("invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl AuditError {
    /// Whether this error aborts the whole run (as opposed to degrading it).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::WorkerPoolInit(_) | Self::Cancelled | Self::EmptyCrawl(_) | Self::InvalidUrl { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AuditError::WorkerPoolInit("no chromium".into()).is_fatal());
        assert!(AuditError::Cancelled.is_fatal());
        assert!(!AuditError::Network {
            url: "https://example.com".into(),
            reason: "timeout".into()
        }
        .is_fatal());
        assert!(!AuditError::Parse("bad xml".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_url() {
        let err = AuditError::Network {
            url: "https://example.com/contact".into(),
            reason: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("example.com/contact"));
        assert!(msg.contains("connection refused"));
    }
}
