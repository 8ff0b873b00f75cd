//! Population-level metrics over a document's blocks.
//!
//! Everything here is a pure function of the collected entries — no I/O,
//! no persisted state. [`CollabIndex`] adds memoization keyed on the
//! document's `(id, version)` identity so dashboards can re-query on every
//! change without re-walking an unchanged tree.
//!
//! ## Momentum
//!
//! One canonical formula (earlier consumers disagreed; this crate does
//! not): over the consequential population — decision and task blocks — a
//! block has *reached* alignment when it carries at least one
//! acknowledgment or is approved. The score is the reached share scaled
//! to 0–100, and vacuously 100 when there is nothing consequential to
//! align on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use concord_doc::Document;
use concord_types::{BlockKind, BlockStatus, DocumentId};

use crate::entry::{BlockEntry, collect_blocks};

/// Derived metrics for one document snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocStats {
    /// Total number of blocks.
    pub total: usize,
    /// Count per kind, in display order, zero-filled.
    pub by_kind: IndexMap<BlockKind, usize>,
    /// Blocks with at least one acknowledgment.
    pub acknowledged_count: usize,
    /// Blocks with status approved.
    pub approved_count: usize,
    /// 0–100 share of the consequential population that reached
    /// acknowledged/approved state. 100 when there is none (vacuous
    /// alignment).
    pub momentum_score: u8,
    /// Risk blocks nobody has acknowledged.
    pub alignment_debt: usize,
}

/// Compute stats from collected entries.
pub fn compute_stats(entries: &[BlockEntry]) -> DocStats {
    let mut by_kind: IndexMap<BlockKind, usize> =
        BlockKind::ALL.iter().map(|k| (*k, 0)).collect();

    let mut acknowledged_count = 0;
    let mut approved_count = 0;
    let mut alignment_debt = 0;
    let mut consequential = 0;
    let mut reached = 0;

    for entry in entries {
        let attrs = &entry.attrs;
        *by_kind.entry(attrs.kind).or_insert(0) += 1;

        if attrs.is_acknowledged() {
            acknowledged_count += 1;
        }
        if attrs.status == BlockStatus::Approved {
            approved_count += 1;
        }
        if attrs.kind == BlockKind::Risk && !attrs.is_acknowledged() {
            alignment_debt += 1;
        }
        if attrs.kind.is_consequential() {
            consequential += 1;
            if attrs.is_acknowledged() || attrs.status == BlockStatus::Approved {
                reached += 1;
            }
        }
    }

    let momentum_score = if consequential == 0 {
        100
    } else {
        ((reached as f64 / consequential as f64) * 100.0).round() as u8
    };

    DocStats {
        total: entries.len(),
        by_kind,
        acknowledged_count,
        approved_count,
        momentum_score,
        alignment_debt,
    }
}

/// Memoizing collaboration index.
///
/// Holds the entries and stats for the last `(document, version)` pair it
/// saw; any query against the same snapshot is free. Mutating the document
/// bumps its version, invalidating the cache on the next query.
#[derive(Default)]
pub struct CollabIndex {
    cache: Option<Cache>,
}

struct Cache {
    document_id: DocumentId,
    version: u64,
    entries: Vec<BlockEntry>,
    stats: DocStats,
}

impl CollabIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected entries for the document's current snapshot.
    pub fn entries(&mut self, doc: &Document) -> &[BlockEntry] {
        &self.refresh(doc).entries
    }

    /// Derived stats for the document's current snapshot.
    pub fn stats(&mut self, doc: &Document) -> &DocStats {
        &self.refresh(doc).stats
    }

    /// Check whether the cache already matches the document snapshot.
    pub fn is_fresh(&self, doc: &Document) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|c| c.document_id == doc.id() && c.version == doc.version())
    }

    fn refresh(&mut self, doc: &Document) -> &Cache {
        if !self.is_fresh(doc) {
            let entries = collect_blocks(doc);
            let stats = compute_stats(&entries);
            return self.cache.insert(Cache {
                document_id: doc.id(),
                version: doc.version(),
                entries,
                stats,
            });
        }
        match self.cache.as_ref() {
            Some(cache) => cache,
            None => unreachable!("fresh cache is always populated"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
