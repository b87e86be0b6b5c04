//! Async orchestration of a contact import.
//!
//! [`ImportSession`] drives upload, validation, duplicate review and
//! execution against any [`ImportBackend`], publishing user-facing
//! notifications on a shared
//! [`NotificationBus`](crm_import_events::NotificationBus).

pub mod backend;
pub mod error;
pub mod session;

pub use backend::ImportBackend;
pub use error::WorkflowError;
pub use session::ImportSession;
