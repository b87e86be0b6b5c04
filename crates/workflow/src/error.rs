use crm_import_client::ClientError;
use crm_import_core::error::CoreError;
use crm_import_core::steps::ImportStep;
use crm_import_core::types::RowId;

/// Errors from an import session.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A domain-level error from `crm_import_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The import API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The operation is not available at the session's current step.
    #[error("'{operation}' is not available during the '{}' step", .step.label())]
    WrongStep {
        operation: &'static str,
        step: ImportStep,
    },

    /// A field mapping names a column the uploaded file does not have.
    #[error("Unknown column '{0}' in field mapping")]
    UnknownColumn(String),

    /// Duplicate rows still need a decision.
    #[error("{} duplicate row(s) still need a decision", .0.len())]
    Unresolved(Vec<RowId>),
}

impl WorkflowError {
    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            Self::Core(CoreError::Conflict(msg) | CoreError::Validation(msg)) => msg.clone(),
            Self::WrongStep { .. } | Self::UnknownColumn(_) | Self::Unresolved(_) => self.to_string(),
        }
    }
}
