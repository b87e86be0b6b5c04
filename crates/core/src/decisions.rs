//! Decision vocabulary for duplicate and conflict rows.
//!
//! [`DecisionState`] is the mutable per-row state held while the user works
//! through the review step; [`Decision`] is the flattened record the backend
//! consumes. One `Decision` is emitted for every required row, skipped or
//! not.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ContactId, RowId};

// ---------------------------------------------------------------------------
// Row actions
// ---------------------------------------------------------------------------

/// What to do with one duplicate or conflict row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Skip,
    Update,
    KeepFirst,
}

/// Action emitted for a row the user never set explicitly.
///
/// A row left untouched is merged into its seeded match.
pub const DEFAULT_ACTION: RowAction = RowAction::Update;

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Update => "update",
            Self::KeepFirst => "keep_first",
        }
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "update" => Ok(Self::Update),
            "keep_first" => Ok(Self::KeepFirst),
            _ => Err(CoreError::Validation(format!(
                "Invalid row action '{s}'. Must be one of: skip, update, keep_first"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Bulk actions
// ---------------------------------------------------------------------------

/// A single action applied to every required row in one round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    SkipAll,
    UpdateAll,
    KeepFirst,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipAll => "skip_all",
            Self::UpdateAll => "update_all",
            Self::KeepFirst => "keep_first",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip_all" => Ok(Self::SkipAll),
            "update_all" => Ok(Self::UpdateAll),
            "keep_first" => Ok(Self::KeepFirst),
            _ => Err(CoreError::Validation(format!(
                "Invalid bulk action '{s}'. Must be one of: skip_all, update_all, keep_first"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Field choices
// ---------------------------------------------------------------------------

/// Which side wins for one field when merging into an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChoice {
    Existing,
    Incoming,
}

/// Choice assumed for any field without an explicit override.
pub const DEFAULT_FIELD_CHOICE: FieldChoice = FieldChoice::Existing;

impl FromStr for FieldChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "existing" => Ok(Self::Existing),
            "incoming" => Ok(Self::Incoming),
            _ => Err(CoreError::Validation(format!(
                "Invalid field choice '{s}'. Must be one of: existing, incoming"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-row state
// ---------------------------------------------------------------------------

/// Mutable decision state for one required row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionState {
    #[serde(default)]
    pub action: Option<RowAction>,
    #[serde(default)]
    pub existing_contact_id: Option<ContactId>,
    #[serde(default)]
    pub field_overrides: BTreeMap<String, FieldChoice>,
}

impl DecisionState {
    pub fn with_contact(existing_contact_id: Option<ContactId>) -> Self {
        Self {
            existing_contact_id,
            ..Self::default()
        }
    }

    /// Override for `field`, falling back to [`DEFAULT_FIELD_CHOICE`].
    pub fn effective_choice(&self, field: &str) -> FieldChoice {
        self.field_overrides
            .get(field)
            .copied()
            .unwrap_or(DEFAULT_FIELD_CHOICE)
    }

    /// True when the row has an explicit action or a non-blank contact id.
    ///
    /// A row carrying only its seeded match satisfies this, so an untouched
    /// duplicate never blocks completion.
    pub fn is_resolved(&self) -> bool {
        self.action.is_some()
            || self
                .existing_contact_id
                .as_ref()
                .is_some_and(|id| !id.is_empty())
    }
}

/// Sentinel sent with every decision: unset fields keep the existing value.
pub const DEFAULT_CHOICE_SENTINEL: &str = "existing";

/// The backend-consumable resolution record for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub row_id: RowId,
    pub action: RowAction,
    pub existing_contact_id: Option<ContactId>,
    pub field_overrides: BTreeMap<String, FieldChoice>,
    pub default_choice: String,
}

impl Decision {
    /// Flatten a row's state, applying [`DEFAULT_ACTION`] when no action
    /// was ever set.
    pub fn from_state(row_id: RowId, state: Option<&DecisionState>) -> Self {
        let state = state.cloned().unwrap_or_default();
        Self {
            row_id,
            action: state.action.unwrap_or(DEFAULT_ACTION),
            existing_contact_id: state.existing_contact_id,
            field_overrides: state.field_overrides,
            default_choice: DEFAULT_CHOICE_SENTINEL.to_string(),
        }
    }
}

/// One entry of the bulk-action response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDecision {
    pub row_id: RowId,
    #[serde(default)]
    pub action: Option<RowAction>,
    #[serde(default)]
    pub existing_contact_id: Option<ContactId>,
    #[serde(default)]
    pub field_overrides: BTreeMap<String, FieldChoice>,
}

impl From<BulkDecision> for DecisionState {
    fn from(d: BulkDecision) -> Self {
        Self {
            action: d.action,
            existing_contact_id: d.existing_contact_id,
            field_overrides: d.field_overrides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn unset_action_defaults_to_update() {
        assert_eq!(DEFAULT_ACTION, RowAction::Update);
        let decision = Decision::from_state(4, Some(&DecisionState::default()));
        assert_eq!(decision.action, RowAction::Update);
    }

    #[test]
    fn missing_state_still_produces_a_decision() {
        let decision = Decision::from_state(9, None);
        assert_eq!(decision.row_id, 9);
        assert_eq!(decision.action, DEFAULT_ACTION);
        assert!(decision.existing_contact_id.is_none());
        assert_eq!(decision.default_choice, "existing");
    }

    #[test]
    fn decision_wire_shape() {
        let mut state = DecisionState::with_contact(Some(ContactId::new("c-1")));
        state.action = Some(RowAction::KeepFirst);
        state
            .field_overrides
            .insert("phone".to_string(), FieldChoice::Incoming);

        let value = serde_json::to_value(Decision::from_state(1, Some(&state))).unwrap();
        assert_eq!(
            value,
            json!({
                "row_id": 1,
                "action": "keep_first",
                "existing_contact_id": "c-1",
                "field_overrides": { "phone": "incoming" },
                "default_choice": "existing"
            })
        );
    }

    #[test]
    fn effective_choice_defaults_to_existing() {
        let mut state = DecisionState::default();
        assert_eq!(state.effective_choice("email"), FieldChoice::Existing);
        state
            .field_overrides
            .insert("email".to_string(), FieldChoice::Incoming);
        assert_eq!(state.effective_choice("email"), FieldChoice::Incoming);
    }

    #[test]
    fn resolution_requires_action_or_contact() {
        assert!(!DecisionState::default().is_resolved());
        assert!(!DecisionState::with_contact(Some(ContactId::new(""))).is_resolved());
        assert!(DecisionState::with_contact(Some(ContactId::new("c"))).is_resolved());

        let skipped = DecisionState {
            action: Some(RowAction::Skip),
            ..DecisionState::default()
        };
        assert!(skipped.is_resolved());
    }

    #[test]
    fn parses_action_literals() {
        assert_eq!("keep_first".parse::<RowAction>().unwrap(), RowAction::KeepFirst);
        assert_eq!("skip_all".parse::<BulkAction>().unwrap(), BulkAction::SkipAll);
        assert_eq!("incoming".parse::<FieldChoice>().unwrap(), FieldChoice::Incoming);
        assert_matches!("merge".parse::<RowAction>(), Err(CoreError::Validation(_)));
        assert_matches!("both".parse::<FieldChoice>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn bulk_decision_without_action_deserializes() {
        let d: BulkDecision = serde_json::from_value(json!({ "row_id": 2 })).unwrap();
        assert_eq!(d.action, None);
        assert!(d.field_overrides.is_empty());
    }
}
