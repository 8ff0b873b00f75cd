//! Shared identity, block, and intent types for Concord.
//!
//! This crate is the relational foundation: typed IDs, participants,
//! collaboration-block attributes, intent modes, and discussion-thread
//! snapshots. It has **no internal concord dependencies** — a pure leaf
//! crate that other crates build on.
//!
//! # Entity-Relationship Overview
//!
//! ```text
//! Document (DocumentId) ← shared rich-text tree, intent mode
//!     └── embeds Block (BlockId) as a tagged node variant
//!     └── discussed in Thread (ThreadId, external collaborator)
//!
//! Participant (ParticipantId) ← resolved by the identity layer
//!     └── owns Block (creator, immutable)
//!     └── acknowledges Block (append-only set union)
//!     └── appears in Roster (document access list)
//!
//! Block (BlockId)
//!     └── kind: decision/task/question/note/risk/assumption
//!     └── status: proposed/approved/superseded (advisory)
//!     └── history: append-only transition + unlock log
//! ```

pub mod block;
pub mod ids;
pub mod intent;
pub mod participant;
pub mod thread;

// Re-export primary types at crate root for convenience.
pub use block::{Acknowledgment, BlockAttrs, BlockKind, BlockStatus, HistoryEntry};
pub use ids::{BlockId, DocumentId, ParticipantId, ThreadId};
pub use intent::IntentMode;
pub use participant::{Participant, Roster};
pub use thread::ThreadState;

/// Current time as Unix milliseconds. Used by constructors throughout the crate.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
