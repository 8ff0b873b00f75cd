//! Block collection: the traversal half of the collaboration index.
//!
//! A depth-first, document-order walk extracts every collaboration block
//! together with its tree position (for jump-to-block navigation) and a
//! truncated excerpt of its body text. Everything downstream — stats,
//! pending sets, the gate, digests, reports — consumes these entries.

use serde::{Deserialize, Serialize};
use tracing::warn;

use concord_doc::{Document, NodePath};
use concord_types::BlockAttrs;

/// Default excerpt length in characters.
pub const EXCERPT_MAX_CHARS: usize = 80;

/// One collaboration block as seen by the index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Snapshot of the block's attributes at collection time.
    pub attrs: BlockAttrs,
    /// Position handle for navigation.
    pub path: NodePath,
    /// Truncated body text.
    pub excerpt: String,
}

/// Collect every block in document order.
///
/// Pure: same tree in, same entries out. A block with an empty or missing
/// body yields an empty excerpt with a warning rather than aborting the
/// walk — one odd block must not blank the whole index.
pub fn collect_blocks(doc: &Document) -> Vec<BlockEntry> {
    doc.depth_first()
        .filter_map(|(path, node)| {
            let attrs = node.attrs()?;
            let body = node.plain_text();
            if body.is_empty() {
                warn!(block = %attrs.id, "block has no body text, indexing with empty excerpt");
            }
            Some(BlockEntry {
                attrs: attrs.clone(),
                path,
                excerpt: excerpt(&body, EXCERPT_MAX_CHARS),
            })
        })
        .collect()
}

/// Char-safe truncation with an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    match chars.nth(max_chars) {
        None => trimmed.to_string(),
        Some((byte_idx, _)) => {
            let mut out = trimmed[..byte_idx].trim_end().to_string();
            out.push('…');
            out
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
