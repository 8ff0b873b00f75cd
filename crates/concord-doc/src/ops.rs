//! Document operations for the shared-edit transport.
//!
//! Every mutation to a [`Document`](crate::Document) is expressed as an
//! operation. Operations are:
//! - Serializable for network transmission (postcard on the wire)
//! - Commutative where the data model allows it (acknowledgments are a
//!   set union; status patches are last-writer-wins)
//! - Carried with their stamped records so every replica appends identical
//!   history entries

use serde::{Deserialize, Serialize};

use concord_types::{Acknowledgment, BlockId, DocumentId, HistoryEntry, ParticipantId};

use crate::node::{Node, NodePath};

/// Operations on documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DocOp {
    /// Insert a node (subtree) at a path.
    InsertNode {
        /// Where the node lands (its own path after insertion).
        path: NodePath,
        /// The inserted subtree.
        node: Node,
    },

    /// Remove the node (and subtree) at a path.
    ///
    /// Removing a collaboration block destroys all of its state — there is
    /// no separate block store to resurrect it from.
    RemoveNode {
        path: NodePath,
    },

    /// Append an acknowledgment to a block.
    ///
    /// Set-union semantics: applying the same acknowledgment twice, or two
    /// acknowledgments in either order, converges.
    Acknowledge {
        block_id: BlockId,
        ack: Acknowledgment,
    },

    /// Apply a status transition to a block.
    ///
    /// Last-writer-wins for the current status; the history entry is
    /// appended regardless, so concurrent transitions all remain visible
    /// in the log.
    SetStatus {
        block_id: BlockId,
        entry: HistoryEntry,
    },

    /// Release a block's approval lock with a reasoned history entry.
    Unlock {
        block_id: BlockId,
        entry: HistoryEntry,
    },
}

impl DocOp {
    /// The block this op targets, if any.
    pub fn target_block(&self) -> Option<BlockId> {
        match self {
            DocOp::InsertNode { node, .. } => node.attrs().map(|a| a.id),
            DocOp::RemoveNode { .. } => None,
            DocOp::Acknowledge { block_id, .. }
            | DocOp::SetStatus { block_id, .. }
            | DocOp::Unlock { block_id, .. } => Some(*block_id),
        }
    }

    /// Check if this is a structural operation (affects the tree shape).
    pub fn is_structural(&self) -> bool {
        matches!(self, DocOp::InsertNode { .. } | DocOp::RemoveNode { .. })
    }

    /// Check if this is an attribute patch (targets block state only).
    pub fn is_attr_patch(&self) -> bool {
        matches!(
            self,
            DocOp::Acknowledge { .. } | DocOp::SetStatus { .. } | DocOp::Unlock { .. }
        )
    }
}

/// Batch of operations from one actor, applied atomically by the transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpBatch {
    /// Document these ops belong to.
    pub document_id: DocumentId,
    /// Actor that created these ops.
    pub actor: ParticipantId,
    /// The operations, in application order.
    pub ops: Vec<DocOp>,
    /// Document version after applying these ops.
    pub version: u64,
}

impl OpBatch {
    /// Create a new batch.
    pub fn new(document_id: DocumentId, actor: ParticipantId) -> Self {
        Self {
            document_id,
            actor,
            ops: Vec::new(),
            version: 0,
        }
    }

    /// Add an operation to the batch.
    pub fn push(&mut self, op: DocOp) {
        self.ops.push(op);
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Compact wire encoding for the transport.
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_stdvec(self)
    }

    /// Decode from the wire.
    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================
