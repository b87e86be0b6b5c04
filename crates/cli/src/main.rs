//! `crm-import` -- non-interactive contact import.
//!
//! Uploads a CSV file, validates it for duplicates, applies the requested
//! bulk and per-row resolutions, then submits every decision and runs the
//! import.
//!
//! # Environment variables
//!
//! | Variable                   | Required | Default                 | Description                     |
//! |----------------------------|----------|-------------------------|---------------------------------|
//! | `CRM_API_BASE_URL`         | no       | `http://localhost:8000` | Import API base URL             |
//! | `CRM_API_TOKEN`            | no       | --                      | Bearer token                    |
//! | `CRM_API_TOKEN_FILE`       | no       | --                      | File holding the bearer token   |
//! | `CRM_REQUEST_TIMEOUT_SECS` | no       | none                    | Per-request timeout             |

mod args;
mod report;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_import_client::{ClientConfig, FieldMapping, ImportApi};
use crm_import_core::summary::BucketCounts;
use crm_import_events::{NotificationBus, NotificationLevel};
use crm_import_workflow::ImportSession;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    tracing::info!(
        base_url = %config.base_url,
        authenticated = config.token.is_some(),
        "Loaded client configuration"
    );

    let api = Arc::new(ImportApi::new(&config).context("Failed to build HTTP client")?);

    // --- Notifications ---
    let bus = Arc::new(NotificationBus::default());
    let drain = tokio::spawn(log_notifications(bus.subscribe()));

    let session = ImportSession::new(api, Arc::clone(&bus));
    let result = run(&cli, &session).await;

    // Closing the bus lets the drain log what is still queued, then stop.
    drop(session);
    drop(bus);
    if let Err(e) = drain.await {
        tracing::warn!(error = %e, "Notification log task failed");
    }
    result
}

async fn run(cli: &Cli, session: &ImportSession<ImportApi>) -> anyhow::Result<()> {
    // --- Upload ---
    let bytes = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let file_name = cli
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "contacts.csv".to_string());
    let uploaded = session.upload(&file_name, bytes).await?;
    println!("Uploaded {file_name}: {} column(s)", uploaded.columns.len());

    // --- Mapping ---
    if cli.mappings.is_empty() {
        session.use_identity_mapping().await?;
    } else {
        let mapping: FieldMapping = cli.mappings.iter().cloned().collect();
        session.set_field_mapping(mapping).await?;
    }

    // --- Validation ---
    let counts: BucketCounts = session.validate().await?;
    report::print_buckets(&counts);

    // --- Review ---
    if let Some(action) = cli.bulk {
        session.handle_bulk_action(action).await?;
    }
    for (row_id, contact_id) in &cli.candidates {
        session
            .update_selected_contact(*row_id, contact_id.clone())
            .await?;
    }
    for (row_id, action) in &cli.row_actions {
        session.handle_row_action(*row_id, *action).await?;
    }
    for o in &cli.overrides {
        session
            .update_decision(o.row_id, o.field.clone(), o.choice)
            .await?;
    }
    report::print_review(&session.progress().await, &session.tally().await);

    if cli.dry_run {
        let decisions = session.pending_decisions().await;
        println!("{}", serde_json::to_string_pretty(&decisions)?);
        return Ok(());
    }

    // --- Import ---
    let outcome = session.handle_next().await?;
    report::print_outcome(&outcome);
    Ok(())
}

/// Forward notifications to the log until the bus closes. Returns how many
/// were logged.
async fn log_notifications(
    mut rx: tokio::sync::broadcast::Receiver<crm_import_events::Notification>,
) -> usize {
    let mut logged = 0;
    loop {
        match rx.recv().await {
            Ok(n) => {
                logged += 1;
                match n.level {
                    NotificationLevel::Error => {
                        tracing::error!(title = %n.title, "{}", n.message)
                    }
                    NotificationLevel::Success | NotificationLevel::Info => {
                        tracing::info!(title = %n.title, "{}", n.message)
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notification log lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
    logged
}
