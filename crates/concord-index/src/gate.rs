//! Intent-sensitive workflow gate on thread resolution.
//!
//! Threads live in the hosting system; this crate only mediates the
//! resolve step. When the document's intent mode enforces the risk gate,
//! resolving any thread is blocked while the document carries risk blocks
//! nobody has acknowledged — the whole resolution aborts, partial state is
//! never left behind. All other intent modes resolve freely.

use concord_doc::Document;
use concord_types::{BlockId, BlockKind, ThreadId, ThreadState};

use crate::entry::collect_blocks;

/// Thread storage owned by the hosting system.
///
/// The gate needs two things: the reply count for convergence hints and a
/// resolve primitive. Resolve is idempotent — resolving an
/// already-resolved thread returns its state unchanged, keeping the first
/// outcome.
pub trait ThreadAccess {
    fn reply_count(&self, id: ThreadId) -> usize;

    fn is_resolved(&self, id: ThreadId) -> bool;

    fn resolve(&mut self, id: ThreadId, outcome: &str) -> ThreadState;
}

/// Why a resolution was refused.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The risk gate is active and these risk blocks have no
    /// acknowledgments.
    #[error("cannot resolve: {count} unacknowledged risk(s) in this document")]
    UnacknowledgedRisks { count: usize, blocks: Vec<BlockId> },
}

/// Resolve a thread, subject to the document's intent mode.
///
/// In gate-enforcing modes this checks the document for unacknowledged
/// risk blocks *before* touching the thread, so a refused resolution
/// leaves the thread untouched.
pub fn resolve_thread<T: ThreadAccess>(
    threads: &mut T,
    thread_id: ThreadId,
    outcome: &str,
    doc: &Document,
) -> Result<ThreadState, GateError> {
    if doc.intent().enforces_risk_gate() {
        let blocks: Vec<BlockId> = collect_blocks(doc)
            .iter()
            .filter(|e| e.attrs.kind == BlockKind::Risk && !e.attrs.is_acknowledged())
            .map(|e| e.attrs.id)
            .collect();
        if !blocks.is_empty() {
            tracing::debug!(
                thread = %thread_id,
                doc = %doc.id(),
                risks = blocks.len(),
                "thread resolution blocked by risk gate"
            );
            return Err(GateError::UnacknowledgedRisks {
                count: blocks.len(),
                blocks,
            });
        }
    }
    Ok(threads.resolve(thread_id, outcome))
}

/// In-memory [`ThreadAccess`] store.
///
/// Serves as the reference implementation for hosting systems and as the
/// fixture for this crate's own tests. Unknown thread IDs read as zero
/// replies and materialize on resolve.
#[derive(Debug, Default)]
pub struct InMemoryThreads {
    threads: std::collections::HashMap<ThreadId, ThreadState>,
}

impl InMemoryThreads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a thread with a reply count.
    pub fn insert(&mut self, state: ThreadState) {
        self.threads.insert(state.id, state);
    }

    pub fn get(&self, id: ThreadId) -> Option<&ThreadState> {
        self.threads.get(&id)
    }
}

impl ThreadAccess for InMemoryThreads {
    fn reply_count(&self, id: ThreadId) -> usize {
        self.threads.get(&id).map_or(0, |t| t.reply_count)
    }

    fn is_resolved(&self, id: ThreadId) -> bool {
        self.threads.get(&id).is_some_and(|t| t.resolved)
    }

    fn resolve(&mut self, id: ThreadId, outcome: &str) -> ThreadState {
        let thread = self
            .threads
            .entry(id)
            .or_insert_with(|| ThreadState::new(id));
        if !thread.resolved {
            thread.resolved = true;
            thread.outcome = Some(outcome.to_string());
        }
        thread.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
