//! Shared document tree and collaboration-block mutation commands.
//!
//! # Design Philosophy
//!
//! Documents are trees, not flat text. One node variant carries a typed
//! [`BlockAttrs`](concord_types::BlockAttrs) struct — everything the
//! aggregation engine needs lives in attributes on that variant, and
//! everything else in the tree is an opaque payload owned by the hosting
//! editor.
//!
//! This crate implements the mutation contracts:
//!
//! - **insert**: fresh block, proposed, unlocked, stub content from kind
//! - **acknowledge**: idempotent set-union append per participant
//! - **change_status**: any transition, always logged, lock recoupled
//! - **request/confirm unlock**: two-phase reasoned release of the
//!   approval lock
//!
//! # Convergence
//!
//! The real-time convergence layer is an external collaborator. Mutations
//! apply locally and emit [`DocOp`] attribute patches the hosting
//! transport replicates; [`Document::apply_remote`] applies the patches a
//! replica receives. Acknowledgments commute; status patches are
//! last-writer-wins with an append-only log.

mod document;
mod error;
mod node;
mod ops;

pub use document::{Document, UnlockPrompt};
pub use error::DocError;
pub use node::{DepthFirst, Node, NodePath};
pub use ops::{DocOp, OpBatch};

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocError>;
