//! "Who still needs to look at this" — the pending-acknowledgment view.
//!
//! For every consequential block that is not superseded, diff the roster
//! against the acknowledgment log and surface the participants still
//! outstanding. Superseded blocks are history; nobody owes them a read.

use serde::{Deserialize, Serialize};

use concord_doc::NodePath;
use concord_types::{BlockId, BlockKind, BlockStatus, Roster};

use crate::entry::BlockEntry;

/// Names shown per block before collapsing into an overflow count.
pub const WAITING_DISPLAY_LIMIT: usize = 5;

/// One block still waiting on acknowledgments.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockPending {
    pub block_id: BlockId,
    pub kind: BlockKind,
    pub path: NodePath,
    pub excerpt: String,
    /// Display names of outstanding participants, roster order, capped at
    /// [`WAITING_DISPLAY_LIMIT`].
    pub waiting: Vec<String>,
    /// How many outstanding names the cap hid.
    pub overflow: usize,
}

/// Pending acknowledgments across a whole document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PendingReport {
    pub blocks: Vec<BlockPending>,
    /// Distinct participants waiting on at least one block.
    pub distinct_waiting: usize,
}

impl PendingReport {
    pub fn is_clear(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Compute the pending view for `roster` over collected entries.
///
/// Blocks appear in document order. A block with everyone accounted for
/// (or an empty roster) does not appear at all.
pub fn pending_acknowledgments(entries: &[BlockEntry], roster: &Roster) -> PendingReport {
    let mut blocks = Vec::new();
    let mut distinct: std::collections::HashSet<_> = std::collections::HashSet::new();

    for entry in entries {
        let attrs = &entry.attrs;
        if !attrs.kind.is_consequential() || attrs.status == BlockStatus::Superseded {
            continue;
        }

        let outstanding: Vec<_> = roster
            .iter()
            .filter(|p| !attrs.has_acknowledged(p.id))
            .collect();
        if outstanding.is_empty() {
            continue;
        }

        for p in &outstanding {
            distinct.insert(p.id);
        }
        let overflow = outstanding.len().saturating_sub(WAITING_DISPLAY_LIMIT);
        blocks.push(BlockPending {
            block_id: attrs.id,
            kind: attrs.kind,
            path: entry.path.clone(),
            excerpt: entry.excerpt.clone(),
            waiting: outstanding
                .iter()
                .take(WAITING_DISPLAY_LIMIT)
                .map(|p| p.display_name.clone())
                .collect(),
            overflow,
        });
    }

    PendingReport {
        blocks,
        distinct_waiting: distinct.len(),
    }
}

// ============================================================================
// Tests
// ============================================================================
