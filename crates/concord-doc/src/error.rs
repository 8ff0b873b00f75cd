//! Error types for document operations.

use thiserror::Error;

use concord_types::BlockId;

use crate::node::NodePath;

/// Errors that can occur during document mutations.
#[derive(Error, Debug)]
pub enum DocError {
    /// Block not found in the document tree.
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    /// Path does not address an existing node.
    #[error("no node at path {0}")]
    InvalidPath(NodePath),

    /// Unlock requested/confirmed on a block that is not locked.
    #[error("block {0:?} is not locked")]
    NotLocked(BlockId),

    /// Confirm-unlock requires a non-empty reason.
    #[error("unlock of block {0:?} requires a non-empty reason")]
    EmptyUnlockReason(BlockId),
}
