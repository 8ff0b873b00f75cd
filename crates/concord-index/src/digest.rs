//! Activity digest: "what changed since you last looked".
//!
//! Each participant carries a per-document last-visit marker, tracked
//! server-side so it survives device switches. A block counts as recently
//! updated when any of its history entries is newer than that marker.
//! Combined with the pending-acknowledgment view this yields a compact
//! payload; a text-generation collaborator may turn it into prose, and
//! when that call fails the digest falls back to a canned line instead of
//! surfacing the error.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use concord_types::{DocumentId, ParticipantId, Roster};

use crate::entry::{BlockEntry, excerpt};
use crate::now_millis;
use crate::pending::{PendingReport, pending_acknowledgments};

/// Summary line used when the text-generation collaborator is down.
pub const FALLBACK_SUMMARY: &str =
    "Activity summary unavailable right now; counts below are current.";

/// Per-(participant, document) last-visit markers.
///
/// Millisecond timestamps, tracked by the hosting server rather than the
/// client so the marker is consistent across devices. A participant who
/// has never visited a document has no marker and sees everything as new.
#[derive(Clone, Debug, Default)]
pub struct VisitLog {
    visits: HashMap<(ParticipantId, DocumentId), u64>,
}

impl VisitLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit right now.
    pub fn mark_visit(&mut self, participant: ParticipantId, document: DocumentId) {
        self.mark_visit_at(participant, document, now_millis());
    }

    /// Record a visit at an explicit timestamp.
    pub fn mark_visit_at(&mut self, participant: ParticipantId, document: DocumentId, at: u64) {
        self.visits.insert((participant, document), at);
    }

    /// Last visit marker, if the participant has ever opened the document.
    pub fn last_visit(&self, participant: ParticipantId, document: DocumentId) -> Option<u64> {
        self.visits.get(&(participant, document)).copied()
    }
}

/// Tunables for digest construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Pending items highlighted in the payload.
    pub highlight_limit: usize,
    /// Characters per highlight excerpt.
    pub excerpt_len: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            highlight_limit: 3,
            excerpt_len: 80,
        }
    }
}

impl DigestConfig {
    pub fn with_highlight_limit(mut self, limit: usize) -> Self {
        self.highlight_limit = limit;
        self
    }
}

/// One highlighted pending item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DigestHighlight {
    pub kind: String,
    pub excerpt: String,
    pub waiting_count: usize,
}

/// Compact per-participant activity payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityDigest {
    /// Blocks with history newer than the participant's last visit.
    pub recently_updated: usize,
    /// Blocks still waiting on acknowledgments (document-wide).
    pub pending_blocks: usize,
    /// Distinct participants waiting on at least one block.
    pub distinct_waiting: usize,
    /// Up to `highlight_limit` pending items, document order.
    pub highlights: Vec<DigestHighlight>,
}

impl ActivityDigest {
    /// Build the digest for one participant.
    ///
    /// `last_visit` of `None` (never visited) treats every block with any
    /// history as recently updated.
    pub fn build(
        entries: &[BlockEntry],
        roster: &Roster,
        last_visit: Option<u64>,
        config: &DigestConfig,
    ) -> Self {
        let recently_updated = entries
            .iter()
            .filter(|e| {
                e.attrs
                    .last_updated_at()
                    .is_some_and(|at| last_visit.is_none_or(|marker| at > marker))
            })
            .count();

        let pending = pending_acknowledgments(entries, roster);
        Self::from_parts(recently_updated, &pending, config)
    }

    fn from_parts(recently_updated: usize, pending: &PendingReport, config: &DigestConfig) -> Self {
        let highlights = pending
            .blocks
            .iter()
            .take(config.highlight_limit)
            .map(|b| DigestHighlight {
                kind: b.kind.to_string(),
                excerpt: excerpt(&b.excerpt, config.excerpt_len),
                waiting_count: b.waiting.len() + b.overflow,
            })
            .collect();
        Self {
            recently_updated,
            pending_blocks: pending.blocks.len(),
            distinct_waiting: pending.distinct_waiting,
            highlights,
        }
    }

    /// Plain-text rendering, used as summarizer input and as the
    /// no-summarizer display.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} recently updated, {} awaiting acknowledgment from {} participant(s)",
            self.recently_updated, self.pending_blocks, self.distinct_waiting
        );
        for h in &self.highlights {
            out.push_str(&format!(
                "\n- [{}] {} (waiting: {})",
                h.kind, h.excerpt, h.waiting_count
            ));
        }
        out
    }
}

/// Text-generation collaborator failure.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),
    #[error("summarizer timed out after {0}ms")]
    Timeout(u64),
}

/// Opaque text in, natural-language text out. No other contract.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, input: &str) -> Result<String, SummarizeError>;
}

/// Produce the natural-language digest line.
///
/// Any summarizer failure degrades to [`FALLBACK_SUMMARY`]; the caller
/// never sees the error.
pub async fn digest_summary(summarizer: &dyn Summarizer, digest: &ActivityDigest) -> String {
    match summarizer.summarize(&digest.render()).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "digest summarizer failed, using fallback");
            FALLBACK_SUMMARY.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::collect_blocks;
    use concord_doc::Document;
    use concord_types::{BlockKind, BlockStatus, IntentMode, Participant};

    struct CannedSummarizer(Result<String, SummarizeError>);

    #[async_trait]
    impl Summarizer for CannedSummarizer {
        async fn summarize(&self, _input: &str) -> Result<String, SummarizeError> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(SummarizeError::Unavailable(m)) => {
                    Err(SummarizeError::Unavailable(m.clone()))
                }
                Err(SummarizeError::Timeout(ms)) => Err(SummarizeError::Timeout(*ms)),
            }
        }
    }

    fn fixture() -> (Document, Roster, Participant, Participant) {
        let amy = Participant::new("Amy");
        let priya = Participant::new("Priya");
        let roster = Roster::new(vec![amy.clone(), priya.clone()]);
        let doc = Document::new(DocumentId::new(), "t", IntentMode::Decision);
        (doc, roster, amy, priya)
    }

    // ── Visit log ───────────────────────────────────────────────────────

    #[test]
    fn test_visit_log_roundtrip() {
        let mut log = VisitLog::new();
        let p = ParticipantId::new();
        let d = DocumentId::new();
        assert!(log.last_visit(p, d).is_none());
        log.mark_visit_at(p, d, 1_000);
        assert_eq!(log.last_visit(p, d), Some(1_000));
        log.mark_visit(p, d);
        assert!(log.last_visit(p, d).unwrap() > 1_000);
    }

    #[test]
    fn test_visit_log_is_per_document() {
        let mut log = VisitLog::new();
        let p = ParticipantId::new();
        log.mark_visit_at(p, DocumentId::new(), 5);
        assert!(log.last_visit(p, DocumentId::new()).is_none());
    }

    // ── Recently updated ────────────────────────────────────────────────

    #[test]
    fn test_recent_updates_respect_marker() {
        let (mut doc, roster, amy, _) = fixture();
        let id = doc.insert_block(BlockKind::Decision, &amy, None).unwrap();
        doc.change_status(id, BlockStatus::Approved, &amy).unwrap();
        let entries = collect_blocks(&doc);
        let transitioned_at = entries[0].attrs.last_updated_at().unwrap();

        let cfg = DigestConfig::default();
        // Visited after the transition: nothing new.
        let after = ActivityDigest::build(&entries, &roster, Some(transitioned_at), &cfg);
        assert_eq!(after.recently_updated, 0);
        // Visited before: the transition is news.
        let before = ActivityDigest::build(&entries, &roster, Some(transitioned_at - 1), &cfg);
        assert_eq!(before.recently_updated, 1);
        // Never visited: everything with history is news.
        let never = ActivityDigest::build(&entries, &roster, None, &cfg);
        assert_eq!(never.recently_updated, 1);
    }

    #[test]
    fn test_blocks_without_history_are_not_recent() {
        // Freshly inserted blocks have no transitions yet.
        let (mut doc, roster, amy, _) = fixture();
        doc.insert_block(BlockKind::Note, &amy, None).unwrap();
        let digest =
            ActivityDigest::build(&collect_blocks(&doc), &roster, None, &DigestConfig::default());
        assert_eq!(digest.recently_updated, 0);
    }

    // ── Highlights ──────────────────────────────────────────────────────

    #[test]
    fn test_highlights_cap_at_limit() {
        let (mut doc, roster, amy, _) = fixture();
        for _ in 0..5 {
            doc.insert_block(BlockKind::Task, &amy, None).unwrap();
        }
        let digest =
            ActivityDigest::build(&collect_blocks(&doc), &roster, None, &DigestConfig::default());
        assert_eq!(digest.pending_blocks, 5);
        assert_eq!(digest.highlights.len(), 3);
        assert_eq!(digest.highlights[0].kind, "task");
        assert_eq!(digest.highlights[0].waiting_count, 2);
    }

    #[test]
    fn test_render_mentions_counts_and_highlights() {
        let (mut doc, roster, amy, _) = fixture();
        doc.insert_block(BlockKind::Decision, &amy, None).unwrap();
        let digest =
            ActivityDigest::build(&collect_blocks(&doc), &roster, None, &DigestConfig::default());
        let text = digest.render();
        assert!(text.contains("1 awaiting acknowledgment"));
        assert!(text.contains("[decision]"));
    }

    // ── Summarizer ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_summary_uses_provider_output() {
        let digest = ActivityDigest {
            recently_updated: 1,
            pending_blocks: 2,
            distinct_waiting: 2,
            highlights: vec![],
        };
        let provider = CannedSummarizer(Ok("Two blocks need your eyes.".into()));
        let text = digest_summary(&provider, &digest).await;
        assert_eq!(text, "Two blocks need your eyes.");
    }

    #[tokio::test]
    async fn test_summary_falls_back_on_error() {
        let digest = ActivityDigest {
            recently_updated: 0,
            pending_blocks: 0,
            distinct_waiting: 0,
            highlights: vec![],
        };
        let provider =
            CannedSummarizer(Err(SummarizeError::Unavailable("connection refused".into())));
        let text = digest_summary(&provider, &digest).await;
        assert_eq!(text, FALLBACK_SUMMARY);
    }
}
