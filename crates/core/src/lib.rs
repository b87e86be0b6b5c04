//! Core types and pure logic for the contact-import duplicate-resolution
//! workflow.
//!
//! This crate has no I/O and no async. It provides:
//!
//! - [`validation`]: the server-provided validation summary (new,
//!   duplicate, conflict and invalid row buckets).
//! - [`decisions`]: row actions, field overrides and the decision records
//!   sent back to the backend.
//! - [`resolver`]: the [`DecisionManager`](resolver::DecisionManager)
//!   reducer that reconciles per-row and bulk decisions.
//! - [`summary`]: counting and progress helpers for display.
//! - [`messages`]: user-facing error rewording.
//! - [`steps`]: the import wizard step sequence.

pub mod decisions;
pub mod error;
pub mod messages;
pub mod resolver;
pub mod steps;
pub mod summary;
pub mod types;
pub mod validation;

pub use decisions::{BulkAction, Decision, DecisionState, FieldChoice, RowAction};
pub use error::CoreError;
pub use resolver::{DecisionCommand, DecisionManager};
pub use validation::ValidationSummary;
