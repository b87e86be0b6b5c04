//! Counting helpers for the review and result screens.

use serde::Serialize;

use crate::decisions::{Decision, FieldChoice, RowAction};
use crate::resolver::DecisionManager;
use crate::validation::{FieldDiff, ValidationSummary};

/// Row counts per validation bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub total_rows: u64,
    pub new: usize,
    pub duplicate: usize,
    pub conflict: usize,
    pub invalid: usize,
}

impl BucketCounts {
    pub fn from_summary(summary: &ValidationSummary) -> Self {
        Self {
            total_rows: summary.total_rows,
            new: summary.new_rows.len(),
            duplicate: summary.duplicate_rows.len(),
            conflict: summary.conflict_rows.len(),
            invalid: summary.invalid_rows.len(),
        }
    }

    /// Rows that need a decision.
    pub fn requiring_decision(&self) -> usize {
        self.duplicate + self.conflict
    }
}

/// Breakdown of a flattened decision list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionTally {
    pub skip: usize,
    pub update: usize,
    pub keep_first: usize,
    /// Rows whose action came from the default rather than a user or bulk
    /// choice.
    pub defaulted: usize,
    /// Field overrides choosing the incoming value, across all rows.
    pub incoming_overrides: usize,
}

impl DecisionTally {
    /// Tally the manager's current submission, tracking defaulted rows.
    pub fn from_manager(manager: &DecisionManager) -> Self {
        let mut tally = Self::from_decisions(&manager.flatten());
        tally.defaulted = manager
            .required_rows()
            .into_iter()
            .filter(|row_id| manager.decision(*row_id).and_then(|d| d.action).is_none())
            .count();
        tally
    }

    /// Tally an already flattened list. `defaulted` stays zero because the
    /// flattened form no longer records where an action came from.
    pub fn from_decisions(decisions: &[Decision]) -> Self {
        let mut tally = Self::default();
        for decision in decisions {
            match decision.action {
                RowAction::Skip => tally.skip += 1,
                RowAction::Update => tally.update += 1,
                RowAction::KeepFirst => tally.keep_first += 1,
            }
            tally.incoming_overrides += decision
                .field_overrides
                .values()
                .filter(|c| **c == FieldChoice::Incoming)
                .count();
        }
        tally
    }
}

/// How far the review step has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionProgress {
    pub required: usize,
    pub resolved: usize,
}

impl ResolutionProgress {
    pub fn from_manager(manager: &DecisionManager) -> Self {
        let required = manager.required_rows().len();
        Self {
            required,
            resolved: required - manager.unresolved_rows().len(),
        }
    }

    /// Whole-number percentage; 100 when nothing is required.
    pub fn percent(&self) -> u8 {
        if self.required == 0 {
            return 100;
        }
        ((self.resolved * 100) / self.required) as u8
    }
}

/// Names of fields whose values differ.
pub fn changed_fields(diffs: &[FieldDiff]) -> Vec<&str> {
    diffs
        .iter()
        .filter(|d| !d.is_equal)
        .map(|d| d.field.as_str())
        .collect()
}
