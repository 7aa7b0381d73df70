// Copyright 2026 Sitescore Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for audit telemetry.
//!
//! The pipeline emits `ProgressEvent`s at phase boundaries and per fetched
//! page; they flow through a `tokio::sync::broadcast` channel to all
//! subscribers (CLI progress bar, log sinks). When no subscriber exists,
//! events are silently dropped.

use serde::{Deserialize, Serialize};

/// A progress event emitted during an audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Monotonically increasing sequence number within a run.
    pub seq: u64,
    /// Fraction of the run completed, 0.0 to 1.0.
    pub fraction: f32,
    /// The kind of progress event.
    pub event: ProgressKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressKind {
    /// An audit phase has started.
    PhaseStarted { phase: AuditPhase, message: String },
    /// An audit phase finished.
    PhaseCompleted {
        phase: AuditPhase,
        message: String,
        duration_ms: u64,
    },
    /// A single page was fetched (or skipped after retries).
    PageFetched {
        url: String,
        status: u16,
        page_type: Option<String>,
        fetched: u32,
        total: u32,
    },
    /// A non-fatal warning occurred.
    Warning { message: String },
    /// The audit completed.
    AuditComplete {
        overall_score: u8,
        pages_analyzed: u32,
        elapsed_ms: u64,
    },
}

/// Identifies which pipeline phase is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditPhase {
    /// Homepage fetch + render-dependency heuristics.
    Profiling,
    /// Link, sitemap, pattern, and API-endpoint discovery.
    Discovery,
    /// Static or rendered page fetching.
    Fetching,
    /// Near-duplicate collapse.
    Deduplication,
    /// Factor analyzers + OFI classification.
    Analysis,
    /// Score aggregation.
    Aggregation,
}

impl std::fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profiling => write!(f, "Profiling"),
            Self::Discovery => write!(f, "Discovery"),
            Self::Fetching => write!(f, "Fetching"),
            Self::Deduplication => write!(f, "Deduplication"),
            Self::Analysis => write!(f, "Analysis"),
            Self::Aggregation => write!(f, "Aggregation"),
        }
    }
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// 256 events covers a typical run: a dozen phase events plus one event
/// per fetched page.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emit a progress event, silently ignoring send errors (which occur when
/// no receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, seq: &mut u64, fraction: f32, event: ProgressKind) {
    if let Some(ref sender) = tx {
        *seq += 1;
        let _ = sender.send(ProgressEvent {
            seq: *seq,
            fraction: fraction.clamp(0.0, 1.0),
            event,
        });
    }
}
