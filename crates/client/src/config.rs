use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Errors raised while reading client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Failed to read token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Bearer token attached to every request, if any.
    pub token: Option<String>,
    /// Per-request timeout. `None` means requests never time out.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `CRM_API_BASE_URL`         | `http://localhost:8000`  |
    /// | `CRM_API_TOKEN`            | unset                    |
    /// | `CRM_API_TOKEN_FILE`       | unset                    |
    /// | `CRM_REQUEST_TIMEOUT_SECS` | unset (no timeout)       |
    ///
    /// `CRM_API_TOKEN_FILE` takes precedence over `CRM_API_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CRM_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token = match lookup("CRM_API_TOKEN_FILE").filter(|v| !v.trim().is_empty()) {
            Some(path) => {
                let path = PathBuf::from(path.trim());
                let contents = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::TokenFile { path, source })?;
                non_blank(contents)
            }
            None => lookup("CRM_API_TOKEN").and_then(non_blank),
        };

        let request_timeout = match lookup("CRM_REQUEST_TIMEOUT_SECS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    name: "CRM_REQUEST_TIMEOUT_SECS",
                    expected: "u64",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            base_url,
            token,
            request_timeout,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
