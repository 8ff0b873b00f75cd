//! Convergence heuristic: long discussions want to become blocks.
//!
//! Once an unresolved thread accumulates enough replies it is probably
//! circling a conclusion; the UI offers to lift it into a decision or task
//! block. Conversion resolves the thread with the convergence tag, then
//! inserts the new block at the caller's cursor. The resolve step goes
//! through the workflow gate first, so a gated conversion aborts with the
//! document untouched.

use concord_doc::{Document, NodePath};
use concord_types::{BlockId, BlockKind, Participant, ThreadId, ThreadState};

use crate::gate::{GateError, ThreadAccess, resolve_thread};

/// Replies at which an unresolved thread is suggested for conversion.
pub const CONVERGENCE_REPLY_THRESHOLD: usize = 4;

/// Outcome tag stamped on threads resolved through conversion.
pub const CONVERGENCE_OUTCOME: &str = "converged";

/// What a converged thread turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertKind {
    Decision,
    Task,
}

impl From<ConvertKind> for BlockKind {
    fn from(kind: ConvertKind) -> Self {
        match kind {
            ConvertKind::Decision => BlockKind::Decision,
            ConvertKind::Task => BlockKind::Task,
        }
    }
}

/// Whether the UI should surface the "convert this thread" affordance.
pub fn is_convergence_candidate<T: ThreadAccess>(threads: &T, id: ThreadId) -> bool {
    !threads.is_resolved(id) && threads.reply_count(id) >= CONVERGENCE_REPLY_THRESHOLD
}

/// Convert a discussion thread into a block.
///
/// Resolves the thread with the [`CONVERGENCE_OUTCOME`] tag (subject to
/// the workflow gate), then inserts a fresh block of the chosen kind at
/// `cursor` (document tail when `None`), owned by `actor`. A gate refusal
/// aborts the whole conversion: no block is inserted and the thread stays
/// open. An invalid cursor fails the insert after the thread has already
/// resolved; resolve is idempotent, so the caller can retry the insert
/// with a corrected cursor.
pub fn convert_thread<T: ThreadAccess>(
    threads: &mut T,
    thread_id: ThreadId,
    kind: ConvertKind,
    actor: &Participant,
    cursor: Option<NodePath>,
    doc: &mut Document,
) -> Result<(BlockId, ThreadState), ConvertError> {
    let state = resolve_thread(threads, thread_id, CONVERGENCE_OUTCOME, doc)?;
    let block_id = doc.insert_block(kind.into(), actor, cursor)?;
    tracing::debug!(thread = %thread_id, block = %block_id, "converted thread to block");
    Ok((block_id, state))
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("failed to insert converted block: {0}")]
    Insert(#[from] concord_doc::DocError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::InMemoryThreads;
    use concord_types::{DocumentId, IntentMode};

    fn setup(replies: usize) -> (InMemoryThreads, ThreadId) {
        let mut threads = InMemoryThreads::new();
        let tid = ThreadId::new();
        threads.insert(ThreadState::new(tid).with_replies(replies));
        (threads, tid)
    }

    #[test]
    fn test_candidate_at_threshold() {
        let (threads, tid) = setup(CONVERGENCE_REPLY_THRESHOLD);
        assert!(is_convergence_candidate(&threads, tid));
    }

    #[test]
    fn test_not_a_candidate_below_threshold() {
        let (threads, tid) = setup(CONVERGENCE_REPLY_THRESHOLD - 1);
        assert!(!is_convergence_candidate(&threads, tid));
    }

    #[test]
    fn test_resolved_thread_is_never_a_candidate() {
        let (mut threads, tid) = setup(10);
        threads.resolve(tid, "answered");
        assert!(!is_convergence_candidate(&threads, tid));
    }

    #[test]
    fn test_unknown_thread_reads_zero_replies() {
        let threads = InMemoryThreads::new();
        assert!(!is_convergence_candidate(&threads, ThreadId::new()));
    }

    #[test]
    fn test_convert_resolves_and_inserts_block() {
        let (mut threads, tid) = setup(6);
        let mut doc = Document::new(DocumentId::new(), "t", IntentMode::Brainstorming);
        let actor = Participant::new("Amy");

        let (block_id, state) =
            convert_thread(&mut threads, tid, ConvertKind::Decision, &actor, None, &mut doc)
                .unwrap();

        assert!(state.resolved);
        assert_eq!(state.outcome.as_deref(), Some(CONVERGENCE_OUTCOME));
        let entries = crate::entry::collect_blocks(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attrs.id, block_id);
        assert_eq!(entries[0].attrs.kind, BlockKind::Decision);
        assert_eq!(entries[0].attrs.owner, actor.id);
    }

    #[test]
    fn test_convert_to_task() {
        let (mut threads, tid) = setup(5);
        let mut doc = Document::new(DocumentId::new(), "t", IntentMode::Execution);
        let actor = Participant::new("Priya");

        let (block_id, _) =
            convert_thread(&mut threads, tid, ConvertKind::Task, &actor, None, &mut doc).unwrap();
        let entries = crate::entry::collect_blocks(&doc);
        assert_eq!(entries[0].attrs.id, block_id);
        assert_eq!(entries[0].attrs.kind, BlockKind::Task);
    }

    #[test]
    fn test_convert_at_cursor() {
        let (mut threads, tid) = setup(4);
        let mut doc = Document::new(DocumentId::new(), "t", IntentMode::Brainstorming);
        let actor = Participant::new("Amy");
        doc.push_node(concord_doc::Node::paragraph("intro"));
        doc.push_node(concord_doc::Node::paragraph("outro"));

        let (block_id, _) = convert_thread(
            &mut threads,
            tid,
            ConvertKind::Decision,
            &actor,
            Some(NodePath::top(1)),
            &mut doc,
        )
        .unwrap();
        let entries = crate::entry::collect_blocks(&doc);
        assert_eq!(entries[0].attrs.id, block_id);
        assert_eq!(entries[0].path, NodePath::top(1));
    }

    #[test]
    fn test_gated_conversion_aborts_whole() {
        let (mut threads, tid) = setup(6);
        let mut doc = Document::new(DocumentId::new(), "t", IntentMode::Decision);
        let actor = Participant::new("Amy");
        let risk = doc.insert_block(BlockKind::Risk, &actor, None).unwrap();
        let before = doc.version();

        let err = convert_thread(&mut threads, tid, ConvertKind::Decision, &actor, None, &mut doc)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Gate(_)));

        // Nothing happened: thread open, document unchanged.
        assert!(!threads.get(tid).unwrap().resolved);
        assert_eq!(doc.version(), before);
        let entries = crate::entry::collect_blocks(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attrs.id, risk);
    }
}
