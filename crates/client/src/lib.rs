//! HTTP client for the contact-import REST API.
//!
//! Wraps the five import endpoints (upload, validate, bulk action, save
//! decisions, execute) using [`reqwest`], with bearer-token auth and cookie
//! credentials.

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use api::ImportApi;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use models::{FieldMapping, ImportOutcome, UploadResponse};
