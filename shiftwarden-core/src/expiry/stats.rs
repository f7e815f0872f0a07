use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Why a notification (or a whole assignment) was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    MissingFields,
    AlreadyExpired,
    SubjectNotFound,
    RecipientNotFound,
    Locked,
    DuplicateToday,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingFields => "missing-fields",
            SkipReason::AlreadyExpired => "already-expired",
            SkipReason::SubjectNotFound => "subject-not-found",
            SkipReason::RecipientNotFound => "recipient-not-found",
            SkipReason::Locked => "locked",
            SkipReason::DuplicateToday => "duplicate-today",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one run (or one assignment within it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Assignments returned by the scan.
    pub scanned: usize,
    /// Oversight recipients resolved from the directory.
    pub recipients: usize,
    pub created: usize,
    pub skipped: usize,
    pub errored: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
}

impl RunSummary {
    pub fn record_created(&mut self) {
        self.created += 1;
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        self.skipped += 1;
        *self.skip_reasons.entry(reason).or_default() += 1;
    }

    pub fn record_error(&mut self) {
        self.errored += 1;
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skip_reasons.get(&reason).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run held the guard; nothing was read or written.
    AlreadyRunning,
    Completed(RunSummary),
}

impl RunOutcome {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::AlreadyRunning => None,
            RunOutcome::Completed(summary) => Some(summary),
        }
    }
}
