//! One contact import, from upload to the final outcome.
//!
//! The session owns the [`DecisionManager`] and the current
//! [`ImportStep`]. Network calls are made without holding the session lock,
//! so decision edits stay responsive while a request is in flight. A second
//! bulk action, a re-validation, a step back and the final submission are
//! all refused until a pending bulk action lands.
//!
//! Every failure is logged, published as an error notification, and leaves
//! the session in its last good state so the same action can be retried.

use std::sync::Arc;

use tokio::sync::Mutex;

use crm_import_client::{FieldMapping, ImportOutcome, UploadResponse};
use crm_import_core::decisions::{BulkAction, Decision, FieldChoice, RowAction};
use crm_import_core::error::CoreError;
use crm_import_core::resolver::{DecisionCommand, DecisionManager};
use crm_import_core::steps::{validate_transition, ImportStep};
use crm_import_core::summary::{BucketCounts, DecisionTally, ResolutionProgress};
use crm_import_core::types::{ContactId, RowId};
use crm_import_events::{Notification, NotificationBus};

use crate::backend::ImportBackend;
use crate::error::WorkflowError;

/// Mutable session state guarded by one lock.
#[derive(Debug)]
struct SessionState {
    step: ImportStep,
    file_id: Option<String>,
    columns: Vec<String>,
    field_mapping: FieldMapping,
    manager: DecisionManager,
}

impl SessionState {
    fn require_step(&self, operation: &'static str, allowed: &[ImportStep]) -> Result<(), WorkflowError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(WorkflowError::WrongStep {
                operation,
                step: self.step,
            })
        }
    }

    /// Refuse `operation` while a bulk request is in flight.
    fn require_idle(&self, operation: &'static str) -> Result<(), WorkflowError> {
        match self.manager.pending_bulk() {
            Some(pending) => Err(CoreError::Conflict(format!(
                "Bulk action '{pending}' is still in progress. Wait for it to finish before \
                 '{operation}'."
            ))
            .into()),
            None => Ok(()),
        }
    }

    fn move_to(&mut self, next: ImportStep) -> Result<(), WorkflowError> {
        if self.step != next {
            validate_transition(self.step, next)?;
            tracing::debug!(from = ?self.step, to = ?next, "Import step changed");
            self.step = next;
        }
        Ok(())
    }
}

/// Drives one import against an [`ImportBackend`].
pub struct ImportSession<B: ImportBackend> {
    backend: Arc<B>,
    notifications: Arc<NotificationBus>,
    state: Mutex<SessionState>,
}

impl<B: ImportBackend> ImportSession<B> {
    pub fn new(backend: Arc<B>, notifications: Arc<NotificationBus>) -> Self {
        Self {
            backend,
            notifications,
            state: Mutex::new(SessionState {
                step: ImportStep::Upload,
                file_id: None,
                columns: Vec::new(),
                field_mapping: FieldMapping::new(),
                manager: DecisionManager::new(),
            }),
        }
    }

    // ---- queries ----

    pub async fn step(&self) -> ImportStep {
        self.state.lock().await.step
    }

    pub async fn columns(&self) -> Vec<String> {
        self.state.lock().await.columns.clone()
    }

    pub async fn field_mapping(&self) -> FieldMapping {
        self.state.lock().await.field_mapping.clone()
    }

    /// Run `f` against the current decision state.
    pub async fn with_manager<R>(&self, f: impl FnOnce(&DecisionManager) -> R) -> R {
        f(&self.state.lock().await.manager)
    }

    pub async fn all_resolved(&self) -> bool {
        self.with_manager(DecisionManager::all_resolved).await
    }

    pub async fn bucket_counts(&self) -> BucketCounts {
        self.with_manager(|m| BucketCounts::from_summary(m.summary()))
            .await
    }

    pub async fn progress(&self) -> ResolutionProgress {
        self.with_manager(ResolutionProgress::from_manager).await
    }

    pub async fn tally(&self) -> DecisionTally {
        self.with_manager(DecisionTally::from_manager).await
    }

    /// The decision list `handle_next` would submit right now.
    pub async fn pending_decisions(&self) -> Vec<Decision> {
        self.with_manager(DecisionManager::flatten).await
    }

    // ---- upload & mapping ----

    /// Upload a CSV file. Re-uploading from the mapping step replaces the
    /// previous file and clears the mapping.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, WorkflowError> {
        self.state
            .lock()
            .await
            .require_step("upload", &[ImportStep::Upload, ImportStep::Mapping])?;

        let uploaded = match self.backend.upload(file_name, bytes).await {
            Ok(uploaded) => uploaded,
            Err(e) => return Err(self.fail("Upload failed", e.into())),
        };

        let mut state = self.state.lock().await;
        state.file_id = Some(uploaded.file_id.clone());
        state.columns = uploaded.columns.clone();
        state.field_mapping.clear();
        state.move_to(ImportStep::Mapping)?;

        tracing::info!(
            file_id = %uploaded.file_id,
            columns = uploaded.columns.len(),
            "Import file uploaded"
        );
        Ok(uploaded)
    }

    /// Replace the column-to-field mapping.
    ///
    /// Every mapped column must exist in the uploaded file.
    pub async fn set_field_mapping(&self, mapping: FieldMapping) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        state.require_step("set_field_mapping", &[ImportStep::Mapping])?;

        if let Some(unknown) = mapping.keys().find(|c| !state.columns.contains(*c)) {
            return Err(WorkflowError::UnknownColumn(unknown.clone()));
        }
        state.field_mapping = mapping;
        Ok(())
    }

    /// Map every uploaded column to a field of the same name.
    pub async fn use_identity_mapping(&self) -> Result<(), WorkflowError> {
        let columns = self.columns().await;
        let mapping = columns.into_iter().map(|c| (c.clone(), c)).collect();
        self.set_field_mapping(mapping).await
    }

    /// Step back one wizard step (e.g. from review to mapping).
    pub async fn back(&self) -> Result<ImportStep, WorkflowError> {
        let mut state = self.state.lock().await;
        state.require_idle("back")?;
        let previous = state.step.previous().ok_or(WorkflowError::WrongStep {
            operation: "back",
            step: state.step,
        })?;
        state.move_to(previous)?;
        Ok(previous)
    }

    // ---- validation ----

    /// Classify the uploaded rows and seed decision state.
    ///
    /// Re-validating from the review step replaces the summary and every
    /// decision made against it.
    pub async fn validate(&self) -> Result<BucketCounts, WorkflowError> {
        let (file_id, mapping) = {
            let state = self.state.lock().await;
            state.require_step("validate", &[ImportStep::Mapping, ImportStep::Review])?;
            if let Err(e) = state.require_idle("validate") {
                drop(state);
                return Err(self.fail("Validation not started", e));
            }
            let file_id = state.file_id.clone().ok_or(WorkflowError::WrongStep {
                operation: "validate",
                step: state.step,
            })?;
            (file_id, state.field_mapping.clone())
        };

        let summary = match self.backend.validate(&file_id, &mapping).await {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail("Validation failed", e.into())),
        };
        let counts = BucketCounts::from_summary(&summary);

        let mut state = self.state.lock().await;
        if let Err(e) = state.manager.dispatch(DecisionCommand::Init(summary)) {
            drop(state);
            return Err(self.fail("Validation failed", e.into()));
        }
        state.move_to(ImportStep::Review)?;

        tracing::info!(
            new = counts.new,
            duplicate = counts.duplicate,
            conflict = counts.conflict,
            invalid = counts.invalid,
            "Import file validated"
        );
        Ok(counts)
    }

    // ---- review ----

    pub async fn update_decision(
        &self,
        row_id: RowId,
        field: impl Into<String>,
        choice: FieldChoice,
    ) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        state.require_step("update_decision", &[ImportStep::Review])?;
        state.manager.update_decision(row_id, field, choice);
        Ok(())
    }

    pub async fn update_selected_contact(
        &self,
        row_id: RowId,
        contact_id: ContactId,
    ) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        state.require_step("update_selected_contact", &[ImportStep::Review])?;
        state.manager.update_selected_contact(row_id, contact_id);
        Ok(())
    }

    pub async fn handle_row_action(&self, row_id: RowId, action: RowAction) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        state.require_step("handle_row_action", &[ImportStep::Review])?;
        state.manager.handle_row_action(row_id, action);
        Ok(())
    }

    /// Apply one action to every required row through the bulk endpoint.
    ///
    /// Refused without a network call while another bulk action is
    /// pending. On success only the rows returned by the server change; on
    /// failure nothing changes. A result that no longer matches the current
    /// validation run is discarded. Returns the number of rows merged.
    pub async fn handle_bulk_action(&self, action: BulkAction) -> Result<usize, WorkflowError> {
        let (validation_id, request) = {
            let mut state = self.state.lock().await;
            state.require_step("handle_bulk_action", &[ImportStep::Review])?;
            if let Err(e) = state.manager.dispatch(DecisionCommand::BeginBulk(action)) {
                drop(state);
                return Err(self.fail("Bulk action not started", e.into()));
            }
            (
                state.manager.summary().validation_id.clone(),
                state.manager.bulk_request(action),
            )
        };

        tracing::info!(%action, rows = request.duplicate_rows.len(), "Sending bulk action");
        let result = self.backend.bulk_action(&request).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(decisions) => {
                let merged = decisions.len();
                let applied = state.manager.dispatch(DecisionCommand::MergeBulkResult {
                    validation_id,
                    decisions,
                });
                drop(state);
                if let Err(e) = applied {
                    return Err(self.fail("Bulk action discarded", e.into()));
                }
                self.notifications.publish(Notification::success(
                    "Bulk action applied",
                    format!("{action}: {merged} row(s) updated"),
                ));
                Ok(merged)
            }
            Err(e) => {
                let err = WorkflowError::from(e);
                state.manager.dispatch(DecisionCommand::FailBulk {
                    validation_id,
                    message: err.user_message(),
                })?;
                drop(state);
                Err(self.fail("Bulk action failed", err))
            }
        }
    }

    // ---- execution ----

    /// Submit every decision and run the import.
    ///
    /// Refused while any required row is unresolved or a bulk action is
    /// pending. Emits exactly one
    /// decision per duplicate or conflict row, skipped rows included. On
    /// failure the session returns to the review step.
    pub async fn handle_next(&self) -> Result<ImportOutcome, WorkflowError> {
        let (validation_id, file_id, mapping, decisions) = {
            let mut state = self.state.lock().await;
            state.require_step("handle_next", &[ImportStep::Review])?;
            if let Err(e) = state.require_idle("handle_next") {
                drop(state);
                return Err(self.fail("Import not started", e));
            }

            let unresolved = state.manager.unresolved_rows();
            if !unresolved.is_empty() {
                drop(state);
                return Err(self.fail("Decisions incomplete", WorkflowError::Unresolved(unresolved)));
            }

            let file_id = state.file_id.clone().unwrap_or_default();
            let validation_id = state.manager.summary().validation_id.clone();
            let decisions = state.manager.flatten();
            let mapping = state.field_mapping.clone();
            state.move_to(ImportStep::Importing)?;
            (validation_id, file_id, mapping, decisions)
        };

        tracing::info!(
            validation_id = %validation_id,
            decisions = decisions.len(),
            "Submitting duplicate decisions"
        );

        let outcome = match self.submit(&validation_id, &file_id, &mapping, &decisions).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state.lock().await.move_to(ImportStep::Review)?;
                return Err(self.fail("Import failed", e));
            }
        };

        self.state.lock().await.move_to(ImportStep::Complete)?;
        tracing::info!(
            new_contacts = outcome.new_contacts,
            merged = outcome.merged,
            skipped = outcome.skipped,
            errors = outcome.errors.count(),
            "Import finished"
        );
        self.notifications.publish(Notification::success(
            "Import complete",
            format!(
                "{} new, {} merged, {} skipped, {} error(s)",
                outcome.new_contacts,
                outcome.merged,
                outcome.skipped,
                outcome.errors.count()
            ),
        ));
        Ok(outcome)
    }

    async fn submit(
        &self,
        validation_id: &str,
        file_id: &str,
        mapping: &FieldMapping,
        decisions: &[Decision],
    ) -> Result<ImportOutcome, WorkflowError> {
        self.backend.save_decisions(validation_id, decisions).await?;
        Ok(self
            .backend
            .execute_import(validation_id, file_id, mapping)
            .await?)
    }

    /// Log and publish a failure, returning it for propagation.
    fn fail(&self, title: &str, err: WorkflowError) -> WorkflowError {
        tracing::warn!(error = %err, title, "Import step failed");
        self.notifications
            .publish(Notification::error(title, err.user_message()));
        err
    }
}
