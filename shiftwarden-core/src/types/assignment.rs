use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AssignmentId, IdentityId};

/// Lifecycle state of a shift assignment.
///
/// Only `Pending` and `Approved` assignments are eligible for expiry notices;
/// everything else the store may hold (cancelled, rejected, completed...) is
/// carried as `Other` with the raw label preserved for logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    Pending,
    Approved,
    Other(String),
}

impl AssignmentState {
    /// Storage labels of the states the expiry scan selects.
    pub const ELIGIBLE_LABELS: [&'static str; 2] = ["pending", "approved"];

    pub fn is_eligible(&self) -> bool {
        matches!(self, AssignmentState::Pending | AssignmentState::Approved)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssignmentState::Pending => "pending",
            AssignmentState::Approved => "approved",
            AssignmentState::Other(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for AssignmentState {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => AssignmentState::Pending,
            "approved" => AssignmentState::Approved,
            _ => AssignmentState::Other(raw.to_string()),
        }
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-bounded shift assignment as read from the assignment store.
///
/// `subject_id` and `ends_at` are optional because upstream data is not
/// guaranteed to be complete; records missing either are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub subject_id: Option<IdentityId>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub state: AssignmentState,
}
