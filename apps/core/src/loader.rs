//! Record loading.
//!
//! Reads complaint batches from JSON or CSV files. Source systems disagree on
//! field naming, so every field resolves through an ordered alias list and
//! the first alias present wins. Rows missing an id or dialog are skipped with a
//! warning; missing timestamps become empty strings, never errors.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::AppError;
use crate::models::ComplaintRecord;

const ID_ALIASES: &[&str] = &["DialogID", "Dialog_ID", "ID", "Id", "id"];
const DIALOG_ALIASES: &[&str] = &[
    "CustomerComplaintDialog",
    "Customer_Complaint_Dialog",
    "Complaint",
    "Dialog",
    "dialog_text",
];
const CREATED_ALIASES: &[&str] = &[
    "Date&TimeCreated",
    "DateTimeCreated",
    "Created",
    "StartTime",
    "created_at",
];
const ENDED_ALIASES: &[&str] = &[
    "Date&TimeEnded",
    "DateTimeEnded",
    "Ended",
    "EndTime",
    "ended_at",
];

/// Loads a batch of records, dispatching on the file extension.
pub fn load_records(path: &Path) -> Result<Vec<ComplaintRecord>, AppError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let records = match extension.as_deref() {
        Some("csv") => records_from_csv_path(path)?,
        Some("json") => records_from_json(&fs::read_to_string(path)?)?,
        _ => {
            return Err(AppError::Validation(format!(
                "unsupported input format: {}",
                path.display()
            )))
        }
    };

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parses a JSON array of complaint objects, resolving field aliases per
/// object.
pub fn records_from_json(text: &str) -> Result<Vec<ComplaintRecord>, AppError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| AppError::Validation(format!("input is not valid JSON: {}", e)))?;
    let rows = value
        .as_array()
        .ok_or_else(|| AppError::Validation("expected a JSON array of records".to_string()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let Some(object) = row.as_object() else {
            warn!("Skipping row {}: not a JSON object", index);
            continue;
        };
        let field = |aliases: &[&str]| -> Option<String> {
            aliases.iter().find_map(|alias| {
                object.get(*alias).map(|v| match v.as_str() {
                    Some(s) => s.to_string(),
                    None => v.to_string(),
                })
            })
        };

        let id = field(ID_ALIASES).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let dialog = field(DIALOG_ALIASES).filter(|s| !s.trim().is_empty());
        match (id, dialog) {
            (Some(id), Some(dialog_text)) => records.push(ComplaintRecord {
                id,
                dialog_text,
                created_at: field(CREATED_ALIASES).unwrap_or_default(),
                ended_at: field(ENDED_ALIASES).unwrap_or_default(),
            }),
            _ => warn!("Skipping row {}: missing id or dialog", index),
        }
    }
    Ok(records)
}

fn records_from_csv_path(path: &Path) -> Result<Vec<ComplaintRecord>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |aliases: &[&str]| -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| headers.iter().position(|h| h == *alias))
    };

    let id_col = column(ID_ALIASES)
        .ok_or_else(|| AppError::MissingField("no matching column for id".to_string()))?;
    let dialog_col = column(DIALOG_ALIASES)
        .ok_or_else(|| AppError::MissingField("no matching column for dialog".to_string()))?;
    let created_col = column(CREATED_ALIASES);
    let ended_col = column(ENDED_ALIASES);

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let id = row.get(id_col).map(str::trim).unwrap_or_default();
        let dialog = row.get(dialog_col).map(str::trim).unwrap_or_default();
        if id.is_empty() || dialog.is_empty() {
            warn!("Skipping CSV row {}: missing id or dialog", index + 1);
            continue;
        }
        records.push(ComplaintRecord {
            id: id.to_string(),
            dialog_text: dialog.to_string(),
            created_at: created_col
                .and_then(|c| row.get(c))
                .unwrap_or_default()
                .to_string(),
            ended_at: ended_col
                .and_then(|c| row.get(c))
                .unwrap_or_default()
                .to_string(),
        });
    }
    Ok(records)
}
