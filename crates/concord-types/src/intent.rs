//! Per-document intent mode.
//!
//! Intent changes which workflow rules are enforced — today only the risk
//! gate: in `Decision` intent a discussion thread cannot be resolved while
//! unacknowledged risk blocks remain.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// What the document is being used for right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum IntentMode {
    /// Free-form ideation. No gates.
    #[default]
    Brainstorming,
    /// Converging on a decision — the risk gate applies.
    Decision,
    /// Recording settled knowledge. No gates.
    Documentation,
    /// Executing agreed work. No gates.
    Execution,
}

impl IntentMode {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentMode::Brainstorming => "brainstorming",
            IntentMode::Decision => "decision",
            IntentMode::Documentation => "documentation",
            IntentMode::Execution => "execution",
        }
    }

    /// Whether thread resolution is blocked by unacknowledged risk blocks.
    pub fn enforces_risk_gate(&self) -> bool {
        matches!(self, IntentMode::Decision)
    }
}

impl std::fmt::Display for IntentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
