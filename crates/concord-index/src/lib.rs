//! Read-side engine over collaboration documents.
//!
//! Everything in this crate is derived: it walks a [`concord_doc::Document`]
//! snapshot and computes views that the write side never stores.
//!
//! - [`entry`]: collect blocks with their tree positions and excerpts.
//! - [`stats`]: momentum score, alignment debt, per-kind counts, with a
//!   memoizing [`CollabIndex`] keyed on document version.
//! - [`pending`]: which participants still owe acknowledgments.
//! - [`gate`]: the intent-sensitive rule blocking thread resolution while
//!   unacknowledged risks remain.
//! - [`convergence`]: long unresolved threads offered for conversion into
//!   decision or task blocks.
//! - [`digest`] and [`report`]: per-participant activity payloads (with an
//!   optional text-generation summarizer) and the flat alignment report.
//!
//! Aggregation is a pure function of the snapshot: same tree, same
//! answer. No I/O, no background tasks; consumers re-query on document
//! change and the index memoizes on `(document, version)` identity.

pub mod convergence;
pub mod digest;
pub mod entry;
pub mod gate;
pub mod pending;
pub mod report;
pub mod stats;

pub use convergence::{
    CONVERGENCE_OUTCOME, CONVERGENCE_REPLY_THRESHOLD, ConvertError, ConvertKind, convert_thread,
    is_convergence_candidate,
};
pub use digest::{
    ActivityDigest, DigestConfig, DigestHighlight, FALLBACK_SUMMARY, SummarizeError, Summarizer,
    VisitLog, digest_summary,
};
pub use entry::{BlockEntry, collect_blocks};
pub use gate::{GateError, InMemoryThreads, ThreadAccess, resolve_thread};
pub use pending::{BlockPending, PendingReport, WAITING_DISPLAY_LIMIT, pending_acknowledgments};
pub use report::alignment_report;
pub use stats::{CollabIndex, DocStats, compute_stats};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ============================================================================
// Tests
// ============================================================================
