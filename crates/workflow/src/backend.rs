//! The seam between the import session and the HTTP API.

use async_trait::async_trait;

use crm_import_client::{ClientError, FieldMapping, ImportApi, ImportOutcome, UploadResponse};
use crm_import_core::decisions::{BulkDecision, Decision};
use crm_import_core::resolver::BulkActionRequest;
use crm_import_core::validation::ValidationSummary;

/// The five import operations an [`ImportSession`](crate::ImportSession)
/// depends on.
#[async_trait]
pub trait ImportBackend: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError>;

    async fn validate(
        &self,
        file_id: &str,
        field_mapping: &FieldMapping,
    ) -> Result<ValidationSummary, ClientError>;

    async fn bulk_action(
        &self,
        request: &BulkActionRequest,
    ) -> Result<Vec<BulkDecision>, ClientError>;

    async fn save_decisions(
        &self,
        validation_id: &str,
        decisions: &[Decision],
    ) -> Result<(), ClientError>;

    async fn execute_import(
        &self,
        validation_id: &str,
        file_id: &str,
        field_mapping: &FieldMapping,
    ) -> Result<ImportOutcome, ClientError>;
}

#[async_trait]
impl ImportBackend for ImportApi {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError> {
        ImportApi::upload(self, file_name, bytes).await
    }

    async fn validate(
        &self,
        file_id: &str,
        field_mapping: &FieldMapping,
    ) -> Result<ValidationSummary, ClientError> {
        ImportApi::validate(self, file_id, field_mapping).await
    }

    async fn bulk_action(
        &self,
        request: &BulkActionRequest,
    ) -> Result<Vec<BulkDecision>, ClientError> {
        ImportApi::bulk_action(self, request).await
    }

    async fn save_decisions(
        &self,
        validation_id: &str,
        decisions: &[Decision],
    ) -> Result<(), ClientError> {
        ImportApi::save_decisions(self, validation_id, decisions).await
    }

    async fn execute_import(
        &self,
        validation_id: &str,
        file_id: &str,
        field_mapping: &FieldMapping,
    ) -> Result<ImportOutcome, ClientError> {
        ImportApi::execute_import(self, validation_id, file_id, field_mapping).await
    }
}
