//! Validation summary returned by the duplicate-validation service.
//!
//! The backend classifies every incoming CSV row into exactly one of four
//! buckets. Only duplicate and conflict rows need a user decision; new and
//! invalid rows are display-only. A summary is immutable once received;
//! re-validating replaces it wholesale.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ContactId, FieldValues, RowId};

// ---------------------------------------------------------------------------
// Row payloads
// ---------------------------------------------------------------------------

/// One field-level comparison between an existing record and an incoming row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    #[serde(default)]
    pub existing_value: serde_json::Value,
    #[serde(default)]
    pub incoming_value: serde_json::Value,
    #[serde(default)]
    pub is_equal: bool,
}

/// An existing contact record, either the single match of a duplicate row
/// or one candidate of a conflict row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingContact {
    pub id: ContactId,
    #[serde(flatten)]
    pub fields: FieldValues,
}

/// An incoming row whose key fields match exactly one existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRow {
    pub row_id: RowId,
    #[serde(default)]
    pub existing_contact_id: Option<ContactId>,
    #[serde(default)]
    pub existing_contact: Option<ExistingContact>,
    #[serde(default)]
    pub incoming_data: FieldValues,
    #[serde(default)]
    pub field_diffs: Vec<FieldDiff>,
}

impl DuplicateRow {
    /// The matched record's id: the explicit `existing_contact_id` when
    /// present and non-blank, otherwise the nested record's id.
    pub fn matched_contact_id(&self) -> Option<ContactId> {
        self.existing_contact_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| self.existing_contact.as_ref().map(|c| c.id.clone()))
    }
}

/// An incoming row matching more than one existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRow {
    pub row_id: RowId,
    #[serde(default)]
    pub incoming_data: FieldValues,
    #[serde(default)]
    pub candidates: Vec<ExistingContact>,
}

impl ConflictRow {
    /// First candidate in backend order. No ranking is applied client-side.
    pub fn first_candidate_id(&self) -> Option<ContactId> {
        self.candidates.first().map(|c| c.id.clone())
    }

    pub fn candidate(&self, id: &ContactId) -> Option<&ExistingContact> {
        self.candidates.iter().find(|c| &c.id == id)
    }

    /// Field diffs of the incoming data against the given candidate.
    ///
    /// Returns an empty list when the candidate is unknown. Used to
    /// re-render the comparison after the user picks another candidate.
    pub fn diff_against(&self, candidate_id: &ContactId) -> Vec<FieldDiff> {
        let Some(candidate) = self.candidate(candidate_id) else {
            return Vec::new();
        };

        self.incoming_data
            .iter()
            .map(|(field, incoming)| {
                let existing = candidate
                    .fields
                    .get(field)
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                FieldDiff {
                    field: field.clone(),
                    is_equal: values_equal(&existing, incoming),
                    existing_value: existing,
                    incoming_value: incoming.clone(),
                }
            })
            .collect()
    }
}

/// Strings compare trimmed; everything else compares structurally.
fn values_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a, b) {
        (serde_json::Value::String(x), serde_json::Value::String(y)) => x.trim() == y.trim(),
        _ => a == b,
    }
}

/// A row that will be inserted as a brand-new contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRow {
    pub row_id: RowId,
    #[serde(default)]
    pub data: FieldValues,
}

/// A row the backend rejected; it is neither imported nor resolvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidRow {
    pub row_id: RowId,
    #[serde(default)]
    pub data: FieldValues,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Result of one validate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    #[serde(default)]
    pub validation_id: String,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub new_rows: Vec<NewRow>,
    #[serde(default)]
    pub duplicate_rows: Vec<DuplicateRow>,
    #[serde(default)]
    pub conflict_rows: Vec<ConflictRow>,
    #[serde(default)]
    pub invalid_rows: Vec<InvalidRow>,
}

impl ValidationSummary {
    /// Ids of every row that needs a decision: duplicates first, then
    /// conflicts, each in backend order.
    pub fn required_row_ids(&self) -> Vec<RowId> {
        self.duplicate_rows
            .iter()
            .map(|r| r.row_id)
            .chain(self.conflict_rows.iter().map(|r| r.row_id))
            .collect()
    }

    pub fn duplicate_row(&self, row_id: RowId) -> Option<&DuplicateRow> {
        self.duplicate_rows.iter().find(|r| r.row_id == row_id)
    }

    pub fn conflict_row(&self, row_id: RowId) -> Option<&ConflictRow> {
        self.conflict_rows.iter().find(|r| r.row_id == row_id)
    }

    /// Reject summaries whose row ids collide across or within buckets.
    ///
    /// Row ids are the only correlation key between rows and decisions.
    pub fn check_unique_row_ids(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        let all = self
            .new_rows
            .iter()
            .map(|r| r.row_id)
            .chain(self.duplicate_rows.iter().map(|r| r.row_id))
            .chain(self.conflict_rows.iter().map(|r| r.row_id))
            .chain(self.invalid_rows.iter().map(|r| r.row_id));

        for row_id in all {
            if !seen.insert(row_id) {
                return Err(CoreError::Validation(format!(
                    "Row id {row_id} appears more than once in the validation summary"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
