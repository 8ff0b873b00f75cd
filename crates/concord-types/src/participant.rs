//! Participant and roster types.
//!
//! A `Participant` is any resolved identity acting on a document — supplied
//! by the hosting system's identity layer. Mutation commands require a
//! resolved participant up front: there is no anonymous acknowledgment or
//! status change, identity resolution failures are rejected by the caller
//! before reaching this crate.

use serde::{Deserialize, Serialize};

use crate::ids::ParticipantId;

/// A resolved identity acting on a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Globally unique, permanent identifier (UUIDv7).
    pub id: ParticipantId,
    /// Full display name: "Amy Tobey", "Priya Natarajan".
    pub display_name: String,
    /// Avatar URL, if the identity layer supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Participant {
    /// Create a new participant with a fresh ID.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            display_name: display_name.into(),
            avatar: None,
        }
    }

    /// Attach an avatar URL.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar = Some(url.into());
        self
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id.short())
    }
}

/// All participants with access to a document.
///
/// Supplied by the identity layer; consumed when computing "waiting for"
/// sets. Order is whatever the identity layer hands over.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Participant>,
}

impl Roster {
    /// Build a roster from a list of participants.
    pub fn new(members: Vec<Participant>) -> Self {
        Self { members }
    }

    /// Number of participants with access.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over all members.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.members.iter()
    }

    /// Look up a member by ID.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.members.iter().find(|p| p.id == id)
    }

    /// Check if a participant has access.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }
}

impl FromIterator<Participant> for Roster {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
