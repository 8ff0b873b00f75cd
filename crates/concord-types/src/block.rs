//! Collaboration block attributes and their append-only records.
//!
//! A block is a semantically-typed alignment unit embedded in a document
//! tree — it carries its own acknowledgment set and status history but has
//! no identity or persistence outside the tree node that holds it.
//!
//! ## Design: attrs are data, commands live in concord-doc
//!
//! `BlockAttrs` exposes append helpers that uphold the block's invariants
//! (acknowledgment uniqueness, one history entry per transition, the
//! lock/approved coupling). Cursor placement, op emission, and transport
//! propagation are the document's job.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::{BlockId, ParticipantId};
use crate::participant::Participant;

/// What a block *is* (alignment semantics). Immutable after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// A decision the team has to converge on.
    #[default]
    Decision,
    /// A unit of work someone will own.
    Task,
    /// An open question awaiting an answer.
    Question,
    /// Context worth keeping next to the discussion.
    Note,
    /// A known risk — feeds alignment debt until someone acknowledges it.
    Risk,
    /// An assumption the work rests on.
    Assumption,
}

impl BlockKind {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Decision => "decision",
            BlockKind::Task => "task",
            BlockKind::Question => "question",
            BlockKind::Note => "note",
            BlockKind::Risk => "risk",
            BlockKind::Assumption => "assumption",
        }
    }

    /// One-line content stub inserted with a fresh block of this kind.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Decision => "Decision: ",
            BlockKind::Task => "Task: ",
            BlockKind::Question => "Question: ",
            BlockKind::Note => "Note: ",
            BlockKind::Risk => "Risk: ",
            BlockKind::Assumption => "Assumption: ",
        }
    }

    /// Decisions and tasks are the consequential population — the blocks
    /// the momentum score and pending-acknowledgment sets are computed over.
    pub fn is_consequential(&self) -> bool {
        matches!(self, BlockKind::Decision | BlockKind::Task)
    }

    /// All kinds, in display order.
    pub const ALL: [BlockKind; 6] = [
        BlockKind::Decision,
        BlockKind::Task,
        BlockKind::Question,
        BlockKind::Note,
        BlockKind::Risk,
        BlockKind::Assumption,
    ];
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Block workflow status.
///
/// Any status may follow any other — the workflow is advisory, not a strict
/// state machine. `Superseded` is a soft terminal: still editable, only
/// de-emphasized by consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockStatus {
    /// Fresh block, not yet settled.
    #[default]
    Proposed,
    /// Settled — the block locks for editing while approved.
    Approved,
    /// Replaced by a later block. Soft terminal.
    Superseded,
}

impl BlockStatus {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockStatus::Proposed => "proposed",
            BlockStatus::Approved => "approved",
            BlockStatus::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A timestamped record that a participant has seen/accepted a block.
///
/// The acknowledgment list is append-only and unique per participant id;
/// concurrent acknowledgments from different participants merge as a set
/// union, so the transport needs no conflict resolution for them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    /// Who acknowledged.
    pub participant_id: ParticipantId,
    /// Display name at acknowledgment time.
    pub display_name: String,
    /// Unix millis.
    pub acked_at: u64,
}

impl Acknowledgment {
    /// Stamp an acknowledgment for a participant at the current time.
    pub fn stamp(actor: &Participant) -> Self {
        Self {
            participant_id: actor.id,
            display_name: actor.display_name.clone(),
            acked_at: crate::now_millis(),
        }
    }
}

/// One entry in a block's append-only status history.
///
/// Every status change appends exactly one entry. Reasoned unlocks append
/// an entry with the *current* status and a non-empty `reason`. The log is
/// never mutated or truncated — under concurrent transitions several
/// entries may land even though only one status wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Status after this entry.
    pub status: BlockStatus,
    /// Status before this entry (None for unlock entries, which don't
    /// change status).
    #[serde(default)]
    pub old_status: Option<BlockStatus>,
    /// Human-supplied reason, present on reasoned unlocks.
    #[serde(default)]
    pub reason: Option<String>,
    /// Who made the change.
    pub updated_by: ParticipantId,
    /// Unix millis.
    pub updated_at: u64,
}

impl HistoryEntry {
    /// Entry recording a status transition.
    pub fn transition(old: BlockStatus, new: BlockStatus, updated_by: ParticipantId) -> Self {
        Self {
            status: new,
            old_status: Some(old),
            reason: None,
            updated_by,
            updated_at: crate::now_millis(),
        }
    }

    /// Entry recording a reasoned unlock at the current status.
    pub fn unlock(status: BlockStatus, reason: String, updated_by: ParticipantId) -> Self {
        Self {
            status,
            old_status: None,
            reason: Some(reason),
            updated_by,
            updated_at: crate::now_millis(),
        }
    }
}

/// Attribute state of a collaboration block.
///
/// Lives inside a document node — deleting the node destroys all of this.
/// Collection and flag fields carry `#[serde(default)]` so a block with
/// missing attributes degrades to empty defaults instead of poisoning the
/// whole document on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAttrs {
    /// Immutable, assigned at creation.
    pub id: BlockId,
    /// Immutable after creation.
    pub kind: BlockKind,
    /// Mutable via status transitions.
    #[serde(default)]
    pub status: BlockStatus,
    /// Creator, set at creation, immutable.
    pub owner: ParticipantId,
    /// Creator display name, set at creation, immutable.
    #[serde(default)]
    pub owner_name: String,
    /// Append-only, unique per participant.
    #[serde(default)]
    pub acknowledgments: Vec<Acknowledgment>,
    /// Append-only status/unlock log.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// True while `status == Approved`, unless temporarily released by a
    /// reasoned unlock. Advisory — the transport does not enforce it.
    #[serde(default)]
    pub locked: bool,
}

impl BlockAttrs {
    /// Fresh attributes for a newly inserted block: proposed, unlocked,
    /// empty acknowledgment and history logs.
    pub fn new(kind: BlockKind, owner: &Participant) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            status: BlockStatus::Proposed,
            owner: owner.id,
            owner_name: owner.display_name.clone(),
            acknowledgments: Vec::new(),
            history: Vec::new(),
            locked: false,
        }
    }

    /// Check whether a participant has already acknowledged this block.
    pub fn has_acknowledged(&self, id: ParticipantId) -> bool {
        self.acknowledgments.iter().any(|a| a.participant_id == id)
    }

    /// Check whether anyone has acknowledged this block.
    pub fn is_acknowledged(&self) -> bool {
        !self.acknowledgments.is_empty()
    }

    /// Append an acknowledgment if the participant hasn't already.
    ///
    /// Returns `true` if state changed, `false` on the duplicate no-op.
    /// Idempotent and order-independent: any sequence of calls yields the
    /// same distinct acknowledging set.
    pub fn push_acknowledgment(&mut self, ack: Acknowledgment) -> bool {
        if self.has_acknowledged(ack.participant_id) {
            return false;
        }
        self.acknowledgments.push(ack);
        true
    }

    /// Apply a status transition, appending exactly one history entry and
    /// recoupling the lock flag to the new status.
    pub fn apply_status(&mut self, new_status: BlockStatus, updated_by: ParticipantId) {
        let entry = HistoryEntry::transition(self.status, new_status, updated_by);
        self.apply_transition_entry(entry);
    }

    /// Apply a pre-stamped transition entry (local command or remote op).
    ///
    /// The entry's `status` becomes current and the lock flag recouples to
    /// it. Last-writer-wins under concurrency: every entry lands in the
    /// log, the latest applied one holds the current status.
    pub fn apply_transition_entry(&mut self, entry: HistoryEntry) {
        self.status = entry.status;
        self.locked = entry.status == BlockStatus::Approved;
        self.history.push(entry);
    }

    /// Release the lock with a reason, appending one history entry at the
    /// current status. The caller validates the reason is non-empty.
    pub fn apply_unlock(&mut self, reason: String, updated_by: ParticipantId) {
        let entry = HistoryEntry::unlock(self.status, reason, updated_by);
        self.apply_unlock_entry(entry);
    }

    /// Apply a pre-stamped unlock entry (local command or remote op).
    pub fn apply_unlock_entry(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        self.locked = false;
    }

    /// Timestamp of the newest history entry, if any.
    pub fn last_updated_at(&self) -> Option<u64> {
        self.history.iter().map(|h| h.updated_at).max()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(name: &str) -> Participant {
        Participant::new(name)
    }

    // ── BlockKind ───────────────────────────────────────────────────────

    #[test]
    fn test_kind_parsing() {
        assert_eq!(BlockKind::from_str("decision"), Some(BlockKind::Decision));
        assert_eq!(BlockKind::from_str("RISK"), Some(BlockKind::Risk));
        assert_eq!(BlockKind::from_str("Assumption"), Some(BlockKind::Assumption));
        assert_eq!(BlockKind::from_str("invalid"), None);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(BlockKind::Decision.label(), "Decision: ");
        assert_eq!(BlockKind::Risk.label(), "Risk: ");
    }

    #[test]
    fn test_kind_consequential() {
        assert!(BlockKind::Decision.is_consequential());
        assert!(BlockKind::Task.is_consequential());
        assert!(!BlockKind::Question.is_consequential());
        assert!(!BlockKind::Risk.is_consequential());
    }

    #[test]
    fn test_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&BlockKind::Risk).unwrap();
        assert_eq!(json, "\"risk\"");
    }

    // ── BlockStatus ─────────────────────────────────────────────────────

    #[test]
    fn test_status_parsing() {
        assert_eq!(BlockStatus::from_str("proposed"), Some(BlockStatus::Proposed));
        assert_eq!(BlockStatus::from_str("APPROVED"), Some(BlockStatus::Approved));
        assert_eq!(BlockStatus::from_str("Superseded"), Some(BlockStatus::Superseded));
        assert_eq!(BlockStatus::from_str("done"), None);
    }

    #[test]
    fn test_status_default_is_proposed() {
        assert_eq!(BlockStatus::default(), BlockStatus::Proposed);
    }

    // ── Acknowledgments ─────────────────────────────────────────────────

    #[test]
    fn test_acknowledgment_idempotent() {
        let amy = actor("Amy");
        let mut attrs = BlockAttrs::new(BlockKind::Decision, &actor("Owner"));

        assert!(attrs.push_acknowledgment(Acknowledgment::stamp(&amy)));
        assert!(!attrs.push_acknowledgment(Acknowledgment::stamp(&amy)));
        assert_eq!(attrs.acknowledgments.len(), 1);
        assert!(attrs.has_acknowledged(amy.id));
    }

    #[test]
    fn test_acknowledgment_order_independent() {
        let people: Vec<Participant> = (0..3).map(|i| actor(&format!("p{i}"))).collect();

        let mut forward = BlockAttrs::new(BlockKind::Task, &people[0]);
        for p in &people {
            forward.push_acknowledgment(Acknowledgment::stamp(p));
        }
        let mut shuffled = BlockAttrs::new(BlockKind::Task, &people[0]);
        for p in people.iter().rev().chain(people.iter()) {
            shuffled.push_acknowledgment(Acknowledgment::stamp(p));
        }

        let ids = |a: &BlockAttrs| {
            let mut v: Vec<ParticipantId> =
                a.acknowledgments.iter().map(|x| x.participant_id).collect();
            v.sort();
            v
        };
        assert_eq!(ids(&forward), ids(&shuffled));
    }

    // ── Status transitions ──────────────────────────────────────────────

    #[test]
    fn test_status_transition_appends_one_entry() {
        let owner = actor("Owner");
        let mut attrs = BlockAttrs::new(BlockKind::Decision, &owner);

        attrs.apply_status(BlockStatus::Approved, owner.id);
        assert_eq!(attrs.history.len(), 1);
        assert_eq!(attrs.status, BlockStatus::Approved);
        assert!(attrs.locked);
        assert_eq!(attrs.history[0].old_status, Some(BlockStatus::Proposed));

        attrs.apply_status(BlockStatus::Superseded, owner.id);
        assert_eq!(attrs.history.len(), 2);
        assert!(!attrs.locked);
        assert_eq!(attrs.history[1].old_status, Some(BlockStatus::Approved));
    }

    #[test]
    fn test_any_transition_permitted() {
        let owner = actor("Owner");
        let mut attrs = BlockAttrs::new(BlockKind::Question, &owner);

        // Advisory workflow: superseded can go straight back to proposed
        attrs.apply_status(BlockStatus::Superseded, owner.id);
        attrs.apply_status(BlockStatus::Proposed, owner.id);
        attrs.apply_status(BlockStatus::Approved, owner.id);
        assert_eq!(attrs.history.len(), 3);
        assert_eq!(attrs.status, BlockStatus::Approved);
    }

    #[test]
    fn test_lock_tracks_approved() {
        let owner = actor("Owner");
        let mut attrs = BlockAttrs::new(BlockKind::Task, &owner);
        for s in [
            BlockStatus::Approved,
            BlockStatus::Proposed,
            BlockStatus::Approved,
            BlockStatus::Superseded,
        ] {
            attrs.apply_status(s, owner.id);
            assert_eq!(attrs.locked, s == BlockStatus::Approved);
        }
    }

    // ── Unlock ──────────────────────────────────────────────────────────

    #[test]
    fn test_unlock_appends_reasoned_entry() {
        let owner = actor("Owner");
        let mut attrs = BlockAttrs::new(BlockKind::Decision, &owner);
        attrs.apply_status(BlockStatus::Approved, owner.id);

        attrs.apply_unlock("Manual edit: fixing a typo".into(), owner.id);
        assert!(!attrs.locked);
        assert_eq!(attrs.status, BlockStatus::Approved); // status unchanged
        assert_eq!(attrs.history.len(), 2);
        let entry = &attrs.history[1];
        assert_eq!(entry.status, BlockStatus::Approved);
        assert_eq!(entry.old_status, None);
        assert_eq!(entry.reason.as_deref(), Some("Manual edit: fixing a typo"));
    }

    // ── Serde tolerance ─────────────────────────────────────────────────

    #[test]
    fn test_attrs_missing_fields_default() {
        // A block written by an older (or buggy) peer: only id/kind/owner.
        let json = format!(
            r#"{{"id":"{}","kind":"risk","owner":"{}"}}"#,
            BlockId::new(),
            ParticipantId::new()
        );
        let attrs: BlockAttrs = serde_json::from_str(&json).unwrap();
        assert_eq!(attrs.kind, BlockKind::Risk);
        assert_eq!(attrs.status, BlockStatus::Proposed);
        assert!(attrs.acknowledgments.is_empty());
        assert!(attrs.history.is_empty());
        assert!(!attrs.locked);
    }

    #[test]
    fn test_attrs_postcard_roundtrip() {
        let owner = actor("Owner");
        let mut attrs = BlockAttrs::new(BlockKind::Decision, &owner);
        attrs.push_acknowledgment(Acknowledgment::stamp(&owner));
        attrs.apply_status(BlockStatus::Approved, owner.id);

        let bytes = postcard::to_stdvec(&attrs).unwrap();
        let parsed: BlockAttrs = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(attrs, parsed);
    }

    #[test]
    fn test_fresh_attrs_postcard_roundtrip() {
        // Empty collections must survive the wire too.
        let attrs = BlockAttrs::new(BlockKind::Note, &actor("Owner"));
        let bytes = postcard::to_stdvec(&attrs).unwrap();
        let parsed: BlockAttrs = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(attrs, parsed);
    }

    #[test]
    fn test_last_updated_at() {
        let owner = actor("Owner");
        let mut attrs = BlockAttrs::new(BlockKind::Task, &owner);
        assert_eq!(attrs.last_updated_at(), None);
        attrs.apply_status(BlockStatus::Approved, owner.id);
        assert!(attrs.last_updated_at().is_some());
    }
}
