use crm_import_core::messages::{friendly_error_message, INVALID_RESPONSE_MESSAGE};

/// Message shown when the server could not be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";

/// Errors from the import REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Import API error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail, or the raw body when none was found.
        detail: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Api { detail, .. } => friendly_error_message(detail),
            Self::InvalidResponse(_) => INVALID_RESPONSE_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) => None,
        }
    }
}

/// Pull a human-readable detail out of an error body.
///
/// Looks for `detail` (a string, or a list of `{ "msg": .. }` entries),
/// then `message`, then `error`; falls back to the trimmed raw body.
pub fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail") {
            match detail {
                serde_json::Value::String(s) => return s.clone(),
                serde_json::Value::Array(items) => {
                    let msgs: Vec<&str> = items
                        .iter()
                        .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                        .collect();
                    if !msgs.is_empty() {
                        return msgs.join("; ");
                    }
                }
                _ => {}
            }
        }
        for key in ["message", "error"] {
            if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
                return s.to_string();
            }
        }
    }
    body.trim().to_string()
}
