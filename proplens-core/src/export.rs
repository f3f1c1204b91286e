//! Exporter — serializes a record subset and the query state that produced
//! it into CSV or JSON download payloads.
//!
//! The caller passes the filtered+sorted set; the exporter never re-derives
//! a view. CSV quoting is RFC-4180 (fields containing a comma, quote, or
//! newline are quoted with internal quotes doubled); numeric cells are
//! emitted unquoted and unformatted so the file stays machine-parseable.
//! An empty record set is a valid export: header-only CSV, empty-array
//! JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{FieldKey, FieldValue, TransactionRecord};
use crate::filter::FilterCriteria;
use crate::sort::SortSpec;

/// Schema version embedded in JSON exports. Bump on breaking envelope
/// changes; imports reject versions newer than this.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// The documented transactions-export column order. Compatibility
/// contract: downstream tooling keys on these columns in this order.
pub const TRANSACTIONS_EXPORT_COLUMNS: &[FieldKey] = &[
    FieldKey::Id,
    FieldKey::Date,
    FieldKey::PropertyType,
    FieldKey::Location,
    FieldKey::Developer,
    FieldKey::Project,
    FieldKey::AreaSqFt,
    FieldKey::PriceAed,
    FieldKey::PricePerSqFt,
];

/// Errors from export serialization. Malformed *data* never errors — these
/// cover writer/serializer failures only.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8,

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported export schema version {found} (max supported: {max})")]
    UnsupportedSchemaVersion { found: u32, max: u32 },
}

/// Serialize `records` as CSV with the given columns.
///
/// Header row first, one data row per record in the given order. Missing
/// optional fields become empty cells, never the text "null".
pub fn to_csv(records: &[TransactionRecord], columns: &[FieldKey]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(columns.iter().map(|c| c.label()))?;

    for record in records {
        wtr.write_record(columns.iter().map(|&c| csv_cell(record.field(c))))?;
    }

    let data = wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(data).map_err(|_| ExportError::Utf8)
}

fn csv_cell(value: FieldValue) -> String {
    // FieldValue renders numbers plain and Missing empty; Display is the
    // single formatting rule shared with the comparison matrix.
    value.to_string()
}

/// Self-describing JSON export: the records plus the criteria and sort
/// that produced them, the dataset fingerprint, and an export timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub dataset_hash: String,
    pub criteria: FilterCriteria,
    pub sort: SortSpec,
    pub record_count: usize,
    pub records: Vec<TransactionRecord>,
}

fn default_schema_version() -> u32 {
    EXPORT_SCHEMA_VERSION
}

impl ExportEnvelope {
    /// Build an envelope. The timestamp is supplied by the caller so the
    /// engine itself stays a pure function of its inputs.
    pub fn new(
        records: Vec<TransactionRecord>,
        criteria: FilterCriteria,
        sort: SortSpec,
        dataset_hash: String,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at,
            dataset_hash,
            criteria,
            sort,
            record_count: records.len(),
            records,
        }
    }
}

/// Serialize an export envelope to pretty JSON.
pub fn to_json(envelope: &ExportEnvelope) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(envelope)?)
}

/// Deserialize an export envelope, rejecting unknown schema versions.
pub fn from_json(json: &str) -> Result<ExportEnvelope, ExportError> {
    let envelope: ExportEnvelope = serde_json::from_str(json)?;
    if envelope.schema_version > EXPORT_SCHEMA_VERSION {
        return Err(ExportError::UnsupportedSchemaVersion {
            found: envelope.schema_version,
            max: EXPORT_SCHEMA_VERSION,
        });
    }
    Ok(envelope)
}
