//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crm_import_core::decisions::{BulkAction, FieldChoice, RowAction};
use crm_import_core::types::{ContactId, RowId};

/// Import contacts from a CSV file, resolving duplicates along the way.
#[derive(Debug, Parser)]
#[command(name = "crm-import", version)]
pub struct Cli {
    /// CSV file to import.
    pub file: PathBuf,

    /// Map a CSV column to a contact field. Repeatable. Defaults to mapping
    /// every column to a field of the same name.
    #[arg(long = "map", value_name = "COLUMN=FIELD", value_parser = parse_mapping)]
    pub mappings: Vec<(String, String)>,

    /// Apply one action to every duplicate and conflict row first.
    #[arg(long, value_name = "skip_all|update_all|keep_first", value_parser = parse_bulk_action)]
    pub bulk: Option<BulkAction>,

    /// Set one row's action. Applied after --bulk.
    #[arg(long = "row-action", value_name = "ROW=ACTION", value_parser = parse_row_action)]
    pub row_actions: Vec<(RowId, RowAction)>,

    /// Resolve a conflict row against a specific candidate.
    #[arg(long = "candidate", value_name = "ROW=CONTACT_ID", value_parser = parse_candidate)]
    pub candidates: Vec<(RowId, ContactId)>,

    /// Choose which side wins for one field of one row.
    #[arg(long = "override", value_name = "ROW:FIELD=CHOICE", value_parser = parse_override)]
    pub overrides: Vec<FieldOverride>,

    /// Print the decisions that would be submitted and stop.
    #[arg(long)]
    pub dry_run: bool,

    /// API base URL. Overrides the environment configuration.
    #[arg(long, env = "CRM_API_BASE_URL")]
    pub base_url: Option<String>,
}

/// One `--override ROW:FIELD=CHOICE` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOverride {
    pub row_id: RowId,
    pub field: String,
    pub choice: FieldChoice,
}

fn split_pair<'a>(raw: &'a str, sep: char, expected: &str) -> Result<(&'a str, &'a str), String> {
    let (left, right) = raw
        .split_once(sep)
        .ok_or_else(|| format!("expected {expected}, got '{raw}'"))?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(format!("expected {expected}, got '{raw}'"));
    }
    Ok((left, right))
}

fn parse_row_id(raw: &str) -> Result<RowId, String> {
    raw.parse()
        .map_err(|_| format!("row id must be an integer, got '{raw}'"))
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (column, field) = split_pair(raw, '=', "COLUMN=FIELD")?;
    Ok((column.to_string(), field.to_string()))
}

fn parse_bulk_action(raw: &str) -> Result<BulkAction, String> {
    raw.parse().map_err(|e: crm_import_core::CoreError| e.to_string())
}

fn parse_row_action(raw: &str) -> Result<(RowId, RowAction), String> {
    let (row, action) = split_pair(raw, '=', "ROW=ACTION")?;
    let action = action
        .parse()
        .map_err(|e: crm_import_core::CoreError| e.to_string())?;
    Ok((parse_row_id(row)?, action))
}

fn parse_candidate(raw: &str) -> Result<(RowId, ContactId), String> {
    let (row, contact) = split_pair(raw, '=', "ROW=CONTACT_ID")?;
    Ok((parse_row_id(row)?, ContactId::new(contact)))
}

fn parse_override(raw: &str) -> Result<FieldOverride, String> {
    let (target, choice) = split_pair(raw, '=', "ROW:FIELD=CHOICE")?;
    let (row, field) = split_pair(target, ':', "ROW:FIELD=CHOICE")?;
    let choice = choice
        .parse()
        .map_err(|e: crm_import_core::CoreError| e.to_string())?;
    Ok(FieldOverride {
        row_id: parse_row_id(row)?,
        field: field.to_string(),
        choice,
    })
}
