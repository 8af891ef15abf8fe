//! Bulk import progress and the reconciled report.

use serde::{Deserialize, Serialize};

/// Reason recorded for candidates without a usable location.
pub const MISSING_CONTENT_PATH: &str = "Missing content path";

/// Reason recorded when a persistence failure carries no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Position of a running bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    /// Items processed so far, successful or not.
    pub current: usize,
    pub total: usize,
}

impl ImportProgress {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Completion as a whole percentage (100 for an empty run).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.current.min(self.total) * 100) / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Final report of a bulk import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    /// One message per failed item, in input order.
    pub errors: Vec<String>,
}

impl ImportOutcome {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Record a failed item as `Item "<label>": <reason>`.
    pub fn record_failure(&mut self, label: &str, reason: &str) {
        self.failed_count += 1;
        self.errors.push(item_error(label, reason));
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn is_clean(&self) -> bool {
        self.failed_count == 0
    }
}

/// Format a per-item failure line.
pub fn item_error(label: &str, reason: &str) -> String {
    let reason = if reason.trim().is_empty() {
        UNKNOWN_ERROR
    } else {
        reason
    };
    format!("Item \"{label}\": {reason}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
