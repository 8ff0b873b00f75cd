//! Alignment report: a flat, human-readable dump of every block.
//!
//! Pure formatting over collected entries. One line per block in document
//! order, showing kind, status, excerpt, and acknowledgment count. No
//! invariants of its own; anything that needs structure should consume
//! [`crate::stats::DocStats`] instead.

use std::fmt::Write as _;

use crate::entry::BlockEntry;

/// Render the alignment report for collected entries.
pub fn alignment_report(entries: &[BlockEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let attrs = &entry.attrs;
        let acks = attrs.acknowledgments.len();
        // String formatting never fails.
        let _ = writeln!(
            out,
            "[{kind}] ({status}) {excerpt} | acks: {acks}",
            kind = attrs.kind,
            status = attrs.status,
            excerpt = entry.excerpt,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::collect_blocks;
    use concord_doc::Document;
    use concord_types::{BlockKind, BlockStatus, DocumentId, IntentMode, Participant};

    #[test]
    fn test_report_lines_in_document_order() {
        let owner = Participant::new("Amy");
        let mut doc = Document::new(DocumentId::new(), "t", IntentMode::Documentation);
        let d = doc.insert_block(BlockKind::Decision, &owner, None).unwrap();
        doc.insert_block(BlockKind::Risk, &owner, None).unwrap();
        doc.acknowledge(d, &owner).unwrap();
        doc.change_status(d, BlockStatus::Approved, &owner).unwrap();

        let report = alignment_report(&collect_blocks(&doc));
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[decision] (approved)"));
        assert!(lines[0].ends_with("acks: 1"));
        assert!(lines[1].starts_with("[risk] (proposed)"));
        assert!(lines[1].ends_with("acks: 0"));
    }

    #[test]
    fn test_empty_document_renders_empty_report() {
        let doc = Document::new(DocumentId::new(), "t", IntentMode::Documentation);
        assert!(alignment_report(&collect_blocks(&doc)).is_empty());
    }
}
