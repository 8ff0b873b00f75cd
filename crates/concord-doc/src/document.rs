//! Shared document with collaboration-block mutation commands.
//!
//! # Document Structure
//!
//! ```text
//! Document
//! ├── id, title, intent            # intent gates workflow rules
//! ├── version                      # bumped on every mutation — memo key
//! ├── nodes: Vec<Node>             # tagged-variant tree
//! │   ├── Paragraph / Heading      # opaque prose
//! │   ├── Section { children }
//! │   └── Collab { attrs, children }   # the tracked blocks
//! └── pending ops                  # drained by the hosting transport
//! ```
//!
//! # Convergence
//!
//! This core does not implement a CRDT. Every mutation applies locally and
//! enqueues a [`DocOp`] for the hosting document's shared-edit transport;
//! remote ops arrive through [`Document::apply_remote`]. Acknowledgments
//! merge as a set union keyed by participant id (commutative, idempotent);
//! status and lock patches are last-writer-wins, with every transition
//! still landing in the append-only history.

use tracing::{debug, warn};

use concord_types::{
    Acknowledgment, BlockAttrs, BlockId, BlockKind, BlockStatus, DocumentId, HistoryEntry,
    IntentMode, Participant,
};

use crate::Result;
use crate::error::DocError;
use crate::node::{DepthFirst, Node, NodePath};
use crate::ops::{DocOp, OpBatch};

/// Prefix stamped onto reasoned-unlock history entries.
const UNLOCK_REASON_PREFIX: &str = "Manual edit: ";

/// A pending reason-capture prompt from [`Document::request_unlock`].
///
/// The block stays locked (read-only overlay for editors) until the prompt
/// is answered through [`Document::confirm_unlock`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlockPrompt {
    /// Block awaiting an unlock reason.
    pub block_id: BlockId,
    /// Status at request time (stays current through the unlock).
    pub status: BlockStatus,
}

/// A shared document carrying collaboration blocks.
pub struct Document {
    id: DocumentId,
    title: String,
    intent: IntentMode,
    nodes: Vec<Node>,
    /// Incremented on every mutation, local or remote. Aggregation
    /// consumers memoize on `(id, version)`.
    version: u64,
    pending_ops: Vec<DocOp>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(id: DocumentId, title: impl Into<String>, intent: IntentMode) -> Self {
        Self {
            id,
            title: title.into(),
            intent,
            nodes: Vec::new(),
            version: 0,
            pending_ops: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn intent(&self) -> IntentMode {
        self.intent
    }

    /// Switch the intent mode (changes which workflow rules apply).
    pub fn set_intent(&mut self, intent: IntentMode) {
        if self.intent != intent {
            self.intent = intent;
            self.version += 1;
        }
    }

    /// Current version. Bumped on every mutation, local or remote.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first, document-order walk over every node.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst::new(&self.nodes)
    }

    /// Number of collaboration blocks in the tree.
    pub fn block_count(&self) -> usize {
        self.depth_first().filter(|(_, n)| n.is_block()).count()
    }

    /// Find a block by id: its position handle plus attributes.
    pub fn find_block(&self, id: BlockId) -> Option<(NodePath, &BlockAttrs)> {
        self.depth_first()
            .find_map(|(path, node)| node.attrs().filter(|a| a.id == id).map(|a| (path, a)))
    }

    /// The node at a path, if any.
    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.nodes.get(*first)?;
        for &i in rest {
            node = node.children()?.get(i)?;
        }
        Some(node)
    }

    // =========================================================================
    // Content editing (structural)
    // =========================================================================

    /// Append a node at the end of the document. Returns its path.
    pub fn push_node(&mut self, node: Node) -> NodePath {
        let path = NodePath::top(self.nodes.len());
        self.nodes.push(node.clone());
        self.record(DocOp::InsertNode { path: path.clone(), node });
        path
    }

    /// Insert a node so it ends up at `path`.
    pub fn insert_node(&mut self, path: NodePath, node: Node) -> Result<()> {
        self.splice_in(&path, node.clone())?;
        self.record(DocOp::InsertNode { path, node });
        Ok(())
    }

    /// Remove the node at `path`, destroying any block state it carried.
    pub fn remove_node(&mut self, path: NodePath) -> Result<Node> {
        let node = self.splice_out(&path)?;
        if let Some(attrs) = node.attrs() {
            debug!(block = %attrs.id, kind = %attrs.kind, "block removed with its node");
        }
        self.record(DocOp::RemoveNode { path });
        Ok(node)
    }

    // =========================================================================
    // Block Mutation Commands
    // =========================================================================

    /// Insert a fresh collaboration block at the cursor.
    ///
    /// The block starts proposed, unlocked, with empty acknowledgment and
    /// history logs and a one-line content stub derived from its kind.
    /// With no cursor, the block lands at the end of the document.
    pub fn insert_block(
        &mut self,
        kind: BlockKind,
        actor: &Participant,
        cursor: Option<NodePath>,
    ) -> Result<BlockId> {
        let attrs = BlockAttrs::new(kind, actor);
        let id = attrs.id;
        let node = Node::Collab {
            attrs,
            children: vec![Node::paragraph(kind.label())],
        };

        match cursor {
            Some(path) => self.insert_node(path, node)?,
            None => {
                self.push_node(node);
            }
        }
        debug!(block = %id, kind = %kind, by = %actor.id, "inserted block");
        Ok(id)
    }

    /// Record that `actor` has seen/accepted the block.
    ///
    /// Idempotent: a duplicate acknowledgment is an `Ok(false)` no-op and
    /// emits no op. Returns `Ok(true)` when the acknowledgment landed.
    pub fn acknowledge(&mut self, id: BlockId, actor: &Participant) -> Result<bool> {
        let ack = Acknowledgment::stamp(actor);
        let attrs = self.attrs_mut(id)?;
        if !attrs.push_acknowledgment(ack.clone()) {
            return Ok(false);
        }
        self.record(DocOp::Acknowledge { block_id: id, ack });
        Ok(true)
    }

    /// Transition the block to a new status.
    ///
    /// Any transition is permitted (advisory workflow). Appends exactly one
    /// history entry and recouples the lock flag: approved locks, anything
    /// else unlocks.
    pub fn change_status(
        &mut self,
        id: BlockId,
        new_status: BlockStatus,
        actor: &Participant,
    ) -> Result<()> {
        let attrs = self.attrs_mut(id)?;
        let entry = HistoryEntry::transition(attrs.status, new_status, actor.id);
        attrs.apply_transition_entry(entry.clone());
        self.record(DocOp::SetStatus { block_id: id, entry });
        debug!(block = %id, status = %new_status, by = %actor.id, "status changed");
        Ok(())
    }

    /// First phase of a reasoned unlock: surface the reason-capture prompt.
    ///
    /// The block stays locked until [`Document::confirm_unlock`] succeeds.
    pub fn request_unlock(&self, id: BlockId) -> Result<UnlockPrompt> {
        let (_, attrs) = self.find_block(id).ok_or(DocError::BlockNotFound(id))?;
        if !attrs.locked {
            return Err(DocError::NotLocked(id));
        }
        Ok(UnlockPrompt {
            block_id: id,
            status: attrs.status,
        })
    }

    /// Second phase of a reasoned unlock.
    ///
    /// An empty (or whitespace-only) reason fails and leaves the lock
    /// untouched. A real reason releases the lock and appends one history
    /// entry with the reason stamped behind a "Manual edit: " prefix.
    pub fn confirm_unlock(&mut self, id: BlockId, actor: &Participant, reason: &str) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DocError::EmptyUnlockReason(id));
        }
        let attrs = self.attrs_mut(id)?;
        if !attrs.locked {
            return Err(DocError::NotLocked(id));
        }
        let entry = HistoryEntry::unlock(
            attrs.status,
            format!("{UNLOCK_REASON_PREFIX}{reason}"),
            actor.id,
        );
        attrs.apply_unlock_entry(entry.clone());
        self.record(DocOp::Unlock { block_id: id, entry });
        debug!(block = %id, by = %actor.id, "reasoned unlock");
        Ok(())
    }

    // =========================================================================
    // Transport seam
    // =========================================================================

    /// Drain locally-produced ops for the transport.
    pub fn take_pending_ops(&mut self) -> Vec<DocOp> {
        std::mem::take(&mut self.pending_ops)
    }

    /// Drain pending ops into a batch stamped with the acting participant.
    pub fn drain_batch(&mut self, actor: &Participant) -> OpBatch {
        let mut batch = OpBatch::new(self.id, actor.id);
        batch.ops = self.take_pending_ops();
        batch.version = self.version;
        batch
    }

    pub fn has_pending_ops(&self) -> bool {
        !self.pending_ops.is_empty()
    }

    /// Apply an op received from the transport.
    ///
    /// Attribute patches targeting a block that no longer exists are
    /// dropped with a warning — a patch racing a concurrent removal is an
    /// expected interleaving, not corruption, and one stale op must not
    /// wedge the whole stream.
    pub fn apply_remote(&mut self, op: DocOp) -> Result<()> {
        match op {
            DocOp::InsertNode { path, node } => {
                self.splice_in(&path, node)?;
                self.version += 1;
            }
            DocOp::RemoveNode { path } => {
                self.splice_out(&path)?;
                self.version += 1;
            }
            DocOp::Acknowledge { block_id, ack } => match self.attrs_mut_quiet(block_id) {
                Some(attrs) => {
                    if attrs.push_acknowledgment(ack) {
                        self.version += 1;
                    }
                }
                None => warn!(block = %block_id, "dropping ack for missing block"),
            },
            DocOp::SetStatus { block_id, entry } => match self.attrs_mut_quiet(block_id) {
                Some(attrs) => {
                    attrs.apply_transition_entry(entry);
                    self.version += 1;
                }
                None => warn!(block = %block_id, "dropping status patch for missing block"),
            },
            DocOp::Unlock { block_id, entry } => match self.attrs_mut_quiet(block_id) {
                Some(attrs) => {
                    attrs.apply_unlock_entry(entry);
                    self.version += 1;
                }
                None => warn!(block = %block_id, "dropping unlock for missing block"),
            },
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Record a locally-produced op and bump the version.
    fn record(&mut self, op: DocOp) {
        self.pending_ops.push(op);
        self.version += 1;
    }

    fn attrs_mut(&mut self, id: BlockId) -> Result<&mut BlockAttrs> {
        self.attrs_mut_quiet(id).ok_or(DocError::BlockNotFound(id))
    }

    fn attrs_mut_quiet(&mut self, id: BlockId) -> Option<&mut BlockAttrs> {
        fn walk(nodes: &mut [Node], id: BlockId) -> Option<&mut BlockAttrs> {
            for node in nodes {
                if node.attrs().is_some_and(|a| a.id == id) {
                    return node.attrs_mut();
                }
                if let Some(children) = node.children_mut() {
                    if let Some(found) = walk(children, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&mut self.nodes, id)
    }

    /// Insert `node` so it ends up addressed by `path`.
    fn splice_in(&mut self, path: &NodePath, node: Node) -> Result<()> {
        let Some(index) = path.leaf_index() else {
            return Err(DocError::InvalidPath(path.clone()));
        };
        let siblings = match path.parent() {
            Some(parent) if !parent.is_root() => {
                let parent_node = self
                    .node_at_mut(&parent)
                    .ok_or_else(|| DocError::InvalidPath(path.clone()))?;
                parent_node
                    .children_mut()
                    .ok_or_else(|| DocError::InvalidPath(path.clone()))?
            }
            _ => &mut self.nodes,
        };
        if index > siblings.len() {
            return Err(DocError::InvalidPath(path.clone()));
        }
        siblings.insert(index, node);
        Ok(())
    }

    /// Remove and return the node at `path`.
    fn splice_out(&mut self, path: &NodePath) -> Result<Node> {
        let Some(index) = path.leaf_index() else {
            return Err(DocError::InvalidPath(path.clone()));
        };
        let siblings = match path.parent() {
            Some(parent) if !parent.is_root() => {
                let parent_node = self
                    .node_at_mut(&parent)
                    .ok_or_else(|| DocError::InvalidPath(path.clone()))?;
                parent_node
                    .children_mut()
                    .ok_or_else(|| DocError::InvalidPath(path.clone()))?
            }
            _ => &mut self.nodes,
        };
        if index >= siblings.len() {
            return Err(DocError::InvalidPath(path.clone()));
        }
        Ok(siblings.remove(index))
    }

    fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.nodes.get_mut(*first)?;
        for &i in rest {
            node = node.children_mut()?.get_mut(i)?;
        }
        Some(node)
    }
}

// ============================================================================
// Tests
// ============================================================================
