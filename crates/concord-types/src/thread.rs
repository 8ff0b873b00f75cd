//! Discussion-thread snapshot.
//!
//! Threads live in an external collaborator; this crate only carries the
//! snapshot shape the gate and convergence heuristic consume: a reply count
//! and a resolved flag with an optional outcome tag.

use serde::{Deserialize, Serialize};

use crate::ids::ThreadId;

/// Observable state of a discussion thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    /// Thread identifier in the hosting system.
    pub id: ThreadId,
    /// Number of replies accumulated so far.
    #[serde(default)]
    pub reply_count: usize,
    /// Whether the thread has been resolved.
    #[serde(default)]
    pub resolved: bool,
    /// Outcome tag set at resolution ("converged", "answered", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl ThreadState {
    /// A fresh, unresolved thread with no replies.
    pub fn new(id: ThreadId) -> Self {
        Self {
            id,
            reply_count: 0,
            resolved: false,
            outcome: None,
        }
    }

    /// Set the reply count (builder style, mostly for tests).
    pub fn with_replies(mut self, count: usize) -> Self {
        self.reply_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thread_is_unresolved() {
        let t = ThreadState::new(ThreadId::new());
        assert!(!t.resolved);
        assert_eq!(t.reply_count, 0);
        assert!(t.outcome.is_none());
    }

    #[test]
    fn test_serde_defaults() {
        let json = format!(r#"{{"id":"{}"}}"#, ThreadId::new());
        let t: ThreadState = serde_json::from_str(&json).unwrap();
        assert!(!t.resolved);
        assert_eq!(t.reply_count, 0);
    }
}
