//! Decision Manager: the reducer behind the duplicate-review step.
//!
//! All decision state lives in one [`DecisionManager`] and changes only
//! through [`DecisionManager::dispatch`]. The three mutation channels
//! (field-choice clicks, row-action clicks and bulk actions) map to
//! [`DecisionCommand`] variants, so every transition is testable without a
//! network or a UI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decisions::{BulkAction, BulkDecision, Decision, DecisionState, FieldChoice, RowAction};
use crate::error::CoreError;
use crate::types::{ContactId, RowId};
use crate::validation::{FieldDiff, ValidationSummary};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Every state transition the manager accepts.
#[derive(Debug, Clone)]
pub enum DecisionCommand {
    /// Seed state from a fresh validation summary, discarding prior state.
    Init(ValidationSummary),
    /// Set one field's winning side for one row.
    SetFieldOverride {
        row_id: RowId,
        field: String,
        choice: FieldChoice,
    },
    /// Pick which existing record a conflict row resolves against.
    SetCandidate { row_id: RowId, contact_id: ContactId },
    /// Set a row's action.
    SetRowAction { row_id: RowId, action: RowAction },
    /// Mark a bulk request as in flight against the current validation.
    /// Rejected while another is pending.
    BeginBulk(BulkAction),
    /// Spread a bulk response over the current decisions. Rejected unless it
    /// answers the pending request of the same validation run.
    MergeBulkResult {
        validation_id: String,
        decisions: Vec<BulkDecision>,
    },
    /// Abandon the pending bulk request, leaving decisions unchanged. A
    /// failure for another validation run is ignored.
    FailBulk {
        validation_id: String,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Bulk request payload
// ---------------------------------------------------------------------------

/// One row as sent to the bulk-action endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRow {
    pub row_id: RowId,
    pub existing_contact_id: Option<ContactId>,
    pub field_diffs: Vec<FieldDiff>,
}

/// Body of `POST /v1/contacts/import/bulk-duplicate-action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub duplicate_rows: Vec<BulkRow>,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// A bulk request in flight and the validation run it was built against.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingBulk {
    action: BulkAction,
    validation_id: String,
}

impl PendingBulk {
    fn answers(&self, validation_id: &str) -> bool {
        self.validation_id == validation_id
    }
}

/// Owns the validation summary and the per-row decision map.
#[derive(Debug, Clone, Default)]
pub struct DecisionManager {
    summary: ValidationSummary,
    decisions: BTreeMap<RowId, DecisionState>,
    pending_bulk: Option<PendingBulk>,
    last_error: Option<String>,
}

impl DecisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager already initialised from `summary`.
    pub fn from_summary(summary: ValidationSummary) -> Result<Self, CoreError> {
        let mut manager = Self::new();
        manager.dispatch(DecisionCommand::Init(summary))?;
        Ok(manager)
    }

    /// Apply one command.
    ///
    /// Only `Init` (colliding row ids), `BeginBulk` (a request already
    /// pending) and `MergeBulkResult` (no matching pending request) can fail;
    /// a failed command leaves state untouched. `Init` abandons any pending
    /// bulk request, so its result can no longer be merged.
    pub fn dispatch(&mut self, command: DecisionCommand) -> Result<(), CoreError> {
        match command {
            DecisionCommand::Init(summary) => {
                summary.check_unique_row_ids()?;
                self.decisions = initial_decisions(&summary);
                self.summary = summary;
                self.pending_bulk = None;
                self.last_error = None;
                tracing::debug!(
                    required = self.decisions.len(),
                    "Initialised duplicate decisions"
                );
            }
            DecisionCommand::SetFieldOverride {
                row_id,
                field,
                choice,
            } => self.update_decision(row_id, field, choice),
            DecisionCommand::SetCandidate { row_id, contact_id } => {
                self.update_selected_contact(row_id, contact_id)
            }
            DecisionCommand::SetRowAction { row_id, action } => {
                self.handle_row_action(row_id, action)
            }
            DecisionCommand::BeginBulk(action) => {
                if let Some(pending) = &self.pending_bulk {
                    return Err(CoreError::Conflict(format!(
                        "Bulk action '{}' is still in progress; '{action}' was not started",
                        pending.action
                    )));
                }
                self.pending_bulk = Some(PendingBulk {
                    action,
                    validation_id: self.summary.validation_id.clone(),
                });
                self.last_error = None;
            }
            DecisionCommand::MergeBulkResult {
                validation_id,
                decisions,
            } => {
                if !self
                    .pending_bulk
                    .as_ref()
                    .is_some_and(|p| p.answers(&validation_id))
                {
                    tracing::warn!(
                        %validation_id,
                        current = %self.summary.validation_id,
                        "Discarding bulk action result with no matching request"
                    );
                    return Err(CoreError::Conflict(format!(
                        "The bulk action result for validation '{validation_id}' no longer \
                         applies and was discarded"
                    )));
                }
                let merged = decisions.len();
                for decision in decisions {
                    self.decisions.insert(decision.row_id, decision.into());
                }
                self.pending_bulk = None;
                tracing::debug!(merged, "Merged bulk action result");
            }
            DecisionCommand::FailBulk {
                validation_id,
                message,
            } => {
                if self
                    .pending_bulk
                    .as_ref()
                    .is_some_and(|p| p.answers(&validation_id))
                {
                    self.pending_bulk = None;
                    self.last_error = Some(message);
                }
            }
        }
        Ok(())
    }

    // ---- single-row commands (infallible) ----

    /// Set one field's winning side for one row.
    pub fn update_decision(&mut self, row_id: RowId, field: impl Into<String>, choice: FieldChoice) {
        self.decisions
            .entry(row_id)
            .or_default()
            .field_overrides
            .insert(field.into(), choice);
    }

    /// Select the existing record a row resolves against.
    pub fn update_selected_contact(&mut self, row_id: RowId, contact_id: ContactId) {
        // Overrides stay keyed by field name across candidate changes.
        self.decisions.entry(row_id).or_default().existing_contact_id = Some(contact_id);
    }

    pub fn handle_row_action(&mut self, row_id: RowId, action: RowAction) {
        self.decisions.entry(row_id).or_default().action = Some(action);
    }

    // ---- queries ----

    pub fn summary(&self) -> &ValidationSummary {
        &self.summary
    }

    pub fn decisions(&self) -> &BTreeMap<RowId, DecisionState> {
        &self.decisions
    }

    pub fn decision(&self, row_id: RowId) -> Option<&DecisionState> {
        self.decisions.get(&row_id)
    }

    pub fn pending_bulk(&self) -> Option<BulkAction> {
        self.pending_bulk.as_ref().map(|p| p.action)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Rows that need a decision: every duplicate and conflict row.
    pub fn required_rows(&self) -> Vec<RowId> {
        self.summary.required_row_ids()
    }

    /// Required rows that still block completion.
    pub fn unresolved_rows(&self) -> Vec<RowId> {
        self.required_rows()
            .into_iter()
            .filter(|row_id| !self.decisions.get(row_id).is_some_and(DecisionState::is_resolved))
            .collect()
    }

    /// True when nothing is required or every required row is resolved.
    pub fn all_resolved(&self) -> bool {
        self.unresolved_rows().is_empty()
    }

    /// The diffs to show for a row: the backend's diffs for a duplicate, or
    /// a diff against the currently selected candidate for a conflict.
    pub fn row_diffs(&self, row_id: RowId) -> Vec<FieldDiff> {
        if let Some(row) = self.summary.duplicate_row(row_id) {
            return row.field_diffs.clone();
        }
        match (
            self.summary.conflict_row(row_id),
            self.decisions
                .get(&row_id)
                .and_then(|d| d.existing_contact_id.as_ref()),
        ) {
            (Some(row), Some(selected)) => row.diff_against(selected),
            _ => Vec::new(),
        }
    }

    /// Payload for the bulk-action endpoint covering every required row.
    pub fn bulk_request(&self, action: BulkAction) -> BulkActionRequest {
        let duplicate_rows = self
            .required_rows()
            .into_iter()
            .map(|row_id| BulkRow {
                row_id,
                existing_contact_id: self
                    .decisions
                    .get(&row_id)
                    .and_then(|d| d.existing_contact_id.clone()),
                field_diffs: self.row_diffs(row_id),
            })
            .collect();

        BulkActionRequest {
            action,
            duplicate_rows,
        }
    }

    /// One [`Decision`] per required row, in required-row order.
    ///
    /// Skipped rows are included: the backend expects an entry for every
    /// duplicate and conflict row.
    pub fn flatten(&self) -> Vec<Decision> {
        self.required_rows()
            .into_iter()
            .map(|row_id| Decision::from_state(row_id, self.decisions.get(&row_id)))
            .collect()
    }
}

/// Seed duplicates with their matched record and conflicts with their
/// first candidate. New and invalid rows get no entry.
fn initial_decisions(summary: &ValidationSummary) -> BTreeMap<RowId, DecisionState> {
    let duplicates = summary
        .duplicate_rows
        .iter()
        .map(|row| (row.row_id, DecisionState::with_contact(row.matched_contact_id())));
    let conflicts = summary
        .conflict_rows
        .iter()
        .map(|row| (row.row_id, DecisionState::with_contact(row.first_candidate_id())));
    duplicates.chain(conflicts).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    /// Two duplicates (rows 1, 2) and one conflict (row 3, candidates A, B).
    fn scenario_summary() -> ValidationSummary {
        serde_json::from_value(json!({
            "validation_id": "val-42",
            "total_rows": 4,
            "new_rows": [{ "row_id": 7 }],
            "duplicate_rows": [
                {
                    "row_id": 1,
                    "existing_contact_id": "c-1",
                    "field_diffs": [
                        { "field": "phone", "existing_value": "111", "incoming_value": "222", "is_equal": false }
                    ]
                },
                { "row_id": 2, "existing_contact": { "id": "c-2" } }
            ],
            "conflict_rows": [
                {
                    "row_id": 3,
                    "incoming_data": { "email": "a@example.com" },
                    "candidates": [
                        { "id": "A", "email": "a@example.com" },
                        { "id": "B", "email": "b@example.com" }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn merge(decisions: Vec<BulkDecision>) -> DecisionCommand {
        DecisionCommand::MergeBulkResult {
            validation_id: "val-42".to_string(),
            decisions,
        }
    }

    fn bulk(row_id: RowId, action: RowAction, contact: &str) -> BulkDecision {
        BulkDecision {
            row_id,
            action: Some(action),
            existing_contact_id: Some(ContactId::new(contact)),
            field_overrides: BTreeMap::new(),
        }
    }

    // -- Initialisation ------------------------------------------------------

    #[test]
    fn init_seeds_matches_and_first_candidates() {
        let manager = DecisionManager::from_summary(scenario_summary()).unwrap();

        assert_eq!(manager.decisions().len(), 3);
        assert_eq!(
            manager.decision(1).unwrap().existing_contact_id,
            Some(ContactId::new("c-1"))
        );
        assert_eq!(
            manager.decision(2).unwrap().existing_contact_id,
            Some(ContactId::new("c-2"))
        );
        assert_eq!(
            manager.decision(3).unwrap().existing_contact_id,
            Some(ContactId::new("A"))
        );
        assert!(manager.decision(7).is_none(), "new rows get no decision");
        assert!(manager.decisions().values().all(|d| d.action.is_none()));
    }

    #[test]
    fn init_is_idempotent() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        let first = manager.decisions().clone();
        manager
            .dispatch(DecisionCommand::Init(scenario_summary()))
            .unwrap();
        assert_eq!(manager.decisions(), &first);
    }

    #[test]
    fn reinit_discards_prior_choices() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager.handle_row_action(1, RowAction::Skip);
        manager
            .dispatch(DecisionCommand::Init(scenario_summary()))
            .unwrap();
        assert_eq!(manager.decision(1).unwrap().action, None);
    }

    #[test]
    fn init_rejects_colliding_row_ids() {
        let mut summary = scenario_summary();
        summary.conflict_rows[0].row_id = 1;
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        let before = manager.decisions().clone();

        assert_matches!(
            manager.dispatch(DecisionCommand::Init(summary)),
            Err(CoreError::Validation(_))
        );
        assert_eq!(manager.decisions(), &before);
    }

    #[test]
    fn conflict_without_candidates_starts_unresolved() {
        let summary: ValidationSummary = serde_json::from_value(json!({
            "conflict_rows": [{ "row_id": 5, "candidates": [] }]
        }))
        .unwrap();
        let manager = DecisionManager::from_summary(summary).unwrap();
        assert_eq!(manager.unresolved_rows(), vec![5]);
        assert!(!manager.all_resolved());
    }

    // -- Single-row commands ------------------------------------------------

    #[test]
    fn field_override_touches_exactly_one_entry() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        let before = manager.decisions().clone();

        manager.update_decision(1, "phone", FieldChoice::Incoming);

        for (row_id, state) in manager.decisions() {
            if *row_id == 1 {
                assert_eq!(state.field_overrides.len(), 1);
                assert_eq!(state.field_overrides["phone"], FieldChoice::Incoming);
                assert_eq!(state.action, before[row_id].action);
                assert_eq!(state.existing_contact_id, before[row_id].existing_contact_id);
            } else {
                assert_eq!(state, &before[row_id]);
            }
        }
    }

    #[test]
    fn field_override_on_unknown_row_creates_entry() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager.update_decision(99, "email", FieldChoice::Existing);

        let state = manager.decision(99).unwrap();
        assert_eq!(state.field_overrides.len(), 1);
        assert!(state.action.is_none());
        assert!(state.existing_contact_id.is_none());
        // Not a required row, so it never reaches the submission.
        assert_eq!(manager.flatten().len(), 3);
    }

    #[test]
    fn candidate_change_keeps_field_overrides() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager.update_decision(3, "email", FieldChoice::Existing);
        manager.update_selected_contact(3, ContactId::new("B"));

        let state = manager.decision(3).unwrap();
        assert_eq!(state.existing_contact_id, Some(ContactId::new("B")));
        assert_eq!(state.field_overrides["email"], FieldChoice::Existing);
    }

    #[test]
    fn row_diffs_follow_candidate_selection() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        assert!(manager.row_diffs(3)[0].is_equal);

        manager.update_selected_contact(3, ContactId::new("B"));
        assert!(!manager.row_diffs(3)[0].is_equal);
    }

    #[test]
    fn row_action_keeps_overrides() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager.update_decision(1, "phone", FieldChoice::Incoming);
        manager.handle_row_action(1, RowAction::Skip);

        let state = manager.decision(1).unwrap();
        assert_eq!(state.action, Some(RowAction::Skip));
        assert_eq!(state.field_overrides["phone"], FieldChoice::Incoming);
    }

    // -- Completion gate ----------------------------------------------------

    #[test]
    fn empty_summary_is_resolved() {
        let manager = DecisionManager::from_summary(ValidationSummary::default()).unwrap();
        assert!(manager.required_rows().is_empty());
        assert!(manager.all_resolved());
        assert!(manager.flatten().is_empty());
    }

    #[test]
    fn gate_flips_with_action_or_contact() {
        let summary: ValidationSummary = serde_json::from_value(json!({
            "duplicate_rows": [
                { "row_id": 1, "existing_contact_id": "c-1" },
                { "row_id": 2 }
            ]
        }))
        .unwrap();
        let mut manager = DecisionManager::from_summary(summary).unwrap();
        assert!(!manager.all_resolved());
        assert_eq!(manager.unresolved_rows(), vec![2]);

        manager.handle_row_action(2, RowAction::Skip);
        assert!(manager.all_resolved());
    }

    #[test]
    fn gate_accepts_selected_contact_alone() {
        let summary: ValidationSummary = serde_json::from_value(json!({
            "duplicate_rows": [{ "row_id": 1 }]
        }))
        .unwrap();
        let mut manager = DecisionManager::from_summary(summary).unwrap();
        assert!(!manager.all_resolved());

        manager.update_selected_contact(1, ContactId::new("c-9"));
        assert!(manager.all_resolved());
    }

    // -- Bulk reconciliation -------------------------------------------------

    #[test]
    fn bulk_request_covers_every_required_row() {
        let manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        let request = manager.bulk_request(BulkAction::UpdateAll);

        assert_eq!(request.action, BulkAction::UpdateAll);
        let ids: Vec<RowId> = request.duplicate_rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(request.duplicate_rows[0].field_diffs.len(), 1);
        assert_eq!(
            request.duplicate_rows[2].existing_contact_id,
            Some(ContactId::new("A"))
        );

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["action"], "update_all");
    }

    #[test]
    fn bulk_merge_only_replaces_returned_rows() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager.update_decision(2, "email", FieldChoice::Incoming);
        let before = manager.decisions().clone();

        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::SkipAll))
            .unwrap();
        manager
            .dispatch(merge(vec![
                bulk(1, RowAction::Skip, "c-1"),
                bulk(3, RowAction::Skip, "A"),
            ]))
            .unwrap();

        assert_eq!(manager.decision(1).unwrap().action, Some(RowAction::Skip));
        assert_eq!(manager.decision(3).unwrap().action, Some(RowAction::Skip));
        assert_eq!(manager.decision(2), before.get(&2));
        assert!(manager.pending_bulk().is_none());
    }

    #[test]
    fn bulk_merge_replaces_whole_row_state() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager.update_decision(1, "phone", FieldChoice::Incoming);

        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::UpdateAll))
            .unwrap();
        manager
            .dispatch(merge(vec![bulk(1, RowAction::Update, "c-1")]))
            .unwrap();

        assert!(manager.decision(1).unwrap().field_overrides.is_empty());
    }

    #[test]
    fn second_bulk_is_rejected_while_pending() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::SkipAll))
            .unwrap();

        assert_matches!(
            manager.dispatch(DecisionCommand::BeginBulk(BulkAction::UpdateAll)),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(manager.pending_bulk(), Some(BulkAction::SkipAll));
    }

    #[test]
    fn failed_bulk_leaves_decisions_unchanged() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        let before = manager.decisions().clone();

        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::KeepFirst))
            .unwrap();
        manager
            .dispatch(DecisionCommand::FailBulk {
                validation_id: "val-42".into(),
                message: "Invalid response from server".into(),
            })
            .unwrap();

        assert_eq!(manager.decisions(), &before);
        assert_eq!(manager.last_error(), Some("Invalid response from server"));
        assert!(manager.pending_bulk().is_none());

        // The same action can be retried.
        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::KeepFirst))
            .unwrap();
        assert!(manager.last_error().is_none());
    }

    #[test]
    fn merge_without_pending_request_is_rejected() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        let before = manager.decisions().clone();

        assert_matches!(
            manager.dispatch(merge(vec![bulk(1, RowAction::Skip, "c-1")])),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(manager.decisions(), &before);
    }

    #[test]
    fn bulk_result_from_previous_validation_is_discarded() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::SkipAll))
            .unwrap();

        let mut fresh = scenario_summary();
        fresh.validation_id = "val-43".to_string();
        manager.dispatch(DecisionCommand::Init(fresh)).unwrap();
        assert!(manager.pending_bulk().is_none());

        assert_matches!(
            manager.dispatch(merge(vec![bulk(1, RowAction::Skip, "c-1")])),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(manager.decision(1).unwrap().action, None);
    }

    #[test]
    fn bulk_result_tagged_for_another_validation_is_rejected() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::SkipAll))
            .unwrap();

        let result = manager.dispatch(DecisionCommand::MergeBulkResult {
            validation_id: "val-41".to_string(),
            decisions: vec![bulk(1, RowAction::Skip, "c-1")],
        });
        assert_matches!(result, Err(CoreError::Conflict(_)));
        assert_eq!(manager.decision(1).unwrap().action, None);
        assert_eq!(manager.pending_bulk(), Some(BulkAction::SkipAll));
    }

    #[test]
    fn failure_for_another_validation_keeps_pending_request() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::KeepFirst))
            .unwrap();

        manager
            .dispatch(DecisionCommand::FailBulk {
                validation_id: "val-41".into(),
                message: "boom".into(),
            })
            .unwrap();

        assert_eq!(manager.pending_bulk(), Some(BulkAction::KeepFirst));
        assert!(manager.last_error().is_none());
    }

    #[test]
    fn single_row_commands_match_their_wrappers() {
        let mut via_dispatch = DecisionManager::from_summary(scenario_summary()).unwrap();
        let mut via_wrappers = via_dispatch.clone();

        for command in [
            DecisionCommand::SetFieldOverride {
                row_id: 1,
                field: "phone".into(),
                choice: FieldChoice::Incoming,
            },
            DecisionCommand::SetCandidate {
                row_id: 3,
                contact_id: ContactId::new("B"),
            },
            DecisionCommand::SetRowAction {
                row_id: 2,
                action: RowAction::KeepFirst,
            },
        ] {
            assert!(via_dispatch.dispatch(command).is_ok());
        }
        via_wrappers.update_decision(1, "phone", FieldChoice::Incoming);
        via_wrappers.update_selected_contact(3, ContactId::new("B"));
        via_wrappers.handle_row_action(2, RowAction::KeepFirst);

        assert_eq!(via_dispatch.decisions(), via_wrappers.decisions());
    }

    // -- Flattening -----------------------------------------------------------

    #[test]
    fn flatten_emits_one_decision_per_required_row_even_when_skipped() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        for row_id in manager.required_rows() {
            manager.handle_row_action(row_id, RowAction::Skip);
        }

        let decisions = manager.flatten();
        assert_eq!(decisions.len(), manager.required_rows().len());
        assert!(decisions.iter().all(|d| d.action == RowAction::Skip));
    }

    #[test]
    fn bulk_skip_scenario_end_to_end() {
        let mut manager = DecisionManager::from_summary(scenario_summary()).unwrap();
        assert_eq!(
            manager.decision(3).unwrap().existing_contact_id,
            Some(ContactId::new("A"))
        );

        manager
            .dispatch(DecisionCommand::BeginBulk(BulkAction::SkipAll))
            .unwrap();
        manager
            .dispatch(merge(vec![
                bulk(1, RowAction::Skip, "c-1"),
                bulk(3, RowAction::Skip, "A"),
            ]))
            .unwrap();

        let row2 = manager.decision(2).unwrap();
        assert!(row2.action.is_none());
        assert_eq!(row2.existing_contact_id, Some(ContactId::new("c-2")));
        assert!(manager.all_resolved());

        let decisions = manager.flatten();
        assert_eq!(decisions.len(), 3);
        assert_eq!(decisions[0].action, RowAction::Skip);
        assert_eq!(decisions[1].row_id, 2);
        assert_eq!(decisions[1].action, RowAction::Update);
        assert_eq!(decisions[2].action, RowAction::Skip);
    }
}
