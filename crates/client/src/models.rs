//! Request and response bodies for the import endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crm_import_core::decisions::{BulkDecision, Decision};

/// CSV column name mapped to a contact field name.
pub type FieldMapping = BTreeMap<String, String>;

/// Response of `POST /v1/contacts/import/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateRequest<'a> {
    pub file_id: &'a str,
    pub field_mapping: &'a FieldMapping,
}

/// Response of the bulk-action endpoint. `decisions` is optional so that a
/// body without it can be reported as an invalid response.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkActionResponse {
    #[serde(default)]
    pub decisions: Option<Vec<BulkDecision>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveDecisionsRequest<'a> {
    pub validation_id: &'a str,
    pub decisions: &'a [Decision],
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteImportRequest<'a> {
    pub validation_id: &'a str,
    pub file_id: &'a str,
    pub field_mapping: &'a FieldMapping,
}

/// Import errors reported either as a count or as a list of row errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorTally {
    Count(u64),
    Rows(Vec<serde_json::Value>),
}

impl Default for ErrorTally {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl ErrorTally {
    pub fn count(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Rows(rows) => rows.len() as u64,
        }
    }
}

/// Per-outcome counts returned by the import execution endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    #[serde(default)]
    pub new_contacts: u64,
    #[serde(default)]
    pub merged: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: ErrorTally,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_accepts_error_count_or_list() {
        let counted: ImportOutcome =
            serde_json::from_value(json!({ "new_contacts": 3, "merged": 1, "skipped": 2, "errors": 4 }))
                .unwrap();
        assert_eq!(counted.errors.count(), 4);

        let listed: ImportOutcome = serde_json::from_value(json!({
            "new_contacts": 0,
            "errors": [{ "row_id": 1, "error": "bad email" }]
        }))
        .unwrap();
        assert_eq!(listed.errors.count(), 1);
        assert_eq!(listed.merged, 0);
    }

    #[test]
    fn bulk_response_without_decisions_is_none() {
        let parsed: BulkActionResponse = serde_json::from_value(json!({ "ok": true })).unwrap();
        assert!(parsed.decisions.is_none());
    }
}
