//! REST API client for the contact-import endpoints.

use crm_import_core::decisions::{BulkDecision, Decision};
use crm_import_core::resolver::BulkActionRequest;
use crm_import_core::validation::ValidationSummary;
use reqwest::multipart::{Form, Part};

use crate::config::ClientConfig;
use crate::error::{extract_detail, ClientError};
use crate::models::{
    BulkActionResponse, ExecuteImportRequest, FieldMapping, ImportOutcome, SaveDecisionsRequest,
    UploadResponse, ValidateRequest,
};

const UPLOAD_PATH: &str = "/v1/contacts/import/upload";
const VALIDATE_PATH: &str = "/v1/contacts/import/validate-duplicates";
const BULK_ACTION_PATH: &str = "/v1/contacts/import/bulk-duplicate-action";
const SAVE_DECISIONS_PATH: &str = "/v1/contacts/import/duplicate-decisions";
const EXECUTE_PATH: &str = "/v1/contacts/import/import-with-decisions";

/// HTTP client for one import API deployment.
///
/// Sends the bearer token (when configured) on every request and keeps a
/// cookie store so session cookies travel with each call. Nothing is
/// retried automatically.
#[derive(Clone)]
pub struct ImportApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ImportApi {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a CSV file.
    ///
    /// Sends a multipart `POST` with the file under the `file` field and
    /// returns the server-assigned file id and the detected columns.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        tracing::debug!(file_name, "Uploading import file");
        let response = self.post(UPLOAD_PATH).multipart(form).send().await?;
        Self::parse_response(response).await
    }

    /// Classify the uploaded rows into new, duplicate, conflict and invalid.
    pub async fn validate(
        &self,
        file_id: &str,
        field_mapping: &FieldMapping,
    ) -> Result<ValidationSummary, ClientError> {
        let body = ValidateRequest {
            file_id,
            field_mapping,
        };
        let response = self.post(VALIDATE_PATH).json(&body).send().await?;
        Self::parse_response(response).await
    }

    /// Apply one action to a set of rows and return the normalised
    /// decisions.
    ///
    /// A success response without a `decisions` array is reported as
    /// [`ClientError::InvalidResponse`].
    pub async fn bulk_action(
        &self,
        request: &BulkActionRequest,
    ) -> Result<Vec<BulkDecision>, ClientError> {
        let response = self.post(BULK_ACTION_PATH).json(request).send().await?;
        let parsed: BulkActionResponse = Self::parse_response(response).await?;
        parsed.decisions.ok_or_else(|| {
            ClientError::InvalidResponse("bulk action response has no 'decisions' array".into())
        })
    }

    /// Store the user's decisions for a validation run.
    pub async fn save_decisions(
        &self,
        validation_id: &str,
        decisions: &[Decision],
    ) -> Result<(), ClientError> {
        let body = SaveDecisionsRequest {
            validation_id,
            decisions,
        };
        let response = self.post(SAVE_DECISIONS_PATH).json(&body).send().await?;
        Self::check_status(response).await
    }

    /// Run the import using the saved decisions.
    pub async fn execute_import(
        &self,
        validation_id: &str,
        file_id: &str,
        field_mapping: &FieldMapping,
    ) -> Result<ImportOutcome, ClientError> {
        let body = ExecuteImportRequest {
            validation_id,
            file_id,
            field_mapping,
        };
        let response = self.post(EXECUTE_PATH).json(&body).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// A `POST` to `path` with auth attached.
    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Return the response unchanged on success, or an
    /// [`ClientError::Api`] carrying the status and extracted detail.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let mut detail = extract_detail(&body);
            if detail.is_empty() {
                detail = status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string();
            }
            tracing::warn!(status = status.as_u16(), detail = %detail, "Import API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON body. Shape mismatches become
    /// [`ClientError::InvalidResponse`].
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
