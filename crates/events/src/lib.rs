//! Notification bus for the contact-import workflow.
//!
//! [`NotificationBus`] is the in-process publish/subscribe hub for
//! user-facing [`Notification`]s (success and error toasts). Frontends
//! subscribe and render; the workflow publishes.

pub mod bus;

pub use bus::{Notification, NotificationBus, NotificationLevel};
