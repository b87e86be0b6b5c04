//! Errors raised by the pure decision logic.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A bulk action is in flight, or a bulk result no longer applies.
    #[error("Conflict: {0}")]
    Conflict(String),
}
