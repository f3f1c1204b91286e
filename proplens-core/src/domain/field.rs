//! Field projection — one rule for how a record's fields are read.
//!
//! `FieldKey` names every projectable field; `TransactionRecord::field()`
//! turns a record into a `FieldValue` for that key. The sort comparator,
//! the comparison matrix, and the CSV exporter all go through this single
//! projection so a field can never be read three different ways.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::TransactionRecord;

/// Every field of a record that can be sorted on, compared side-by-side,
/// or exported as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Id,
    Date,
    TransactionType,
    PropertyType,
    Location,
    Developer,
    Project,
    AreaSqFt,
    PriceAed,
    PricePerSqFt,
}

/// Comparator class for a field. Selects how the sort comparator orders
/// two values of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSemantic {
    Date,
    Numeric,
    /// Locale-naive code-point comparison. No field is locale-aware.
    Text,
}

impl FieldKey {
    /// The comparator class of this field.
    pub fn semantic(&self) -> FieldSemantic {
        match self {
            FieldKey::Date => FieldSemantic::Date,
            FieldKey::AreaSqFt | FieldKey::PriceAed | FieldKey::PricePerSqFt => {
                FieldSemantic::Numeric
            }
            FieldKey::Id
            | FieldKey::TransactionType
            | FieldKey::PropertyType
            | FieldKey::Location
            | FieldKey::Developer
            | FieldKey::Project => FieldSemantic::Text,
        }
    }

    /// The documented column label for exports (compatibility contract —
    /// downstream spreadsheets key on these exact strings).
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::Id => "Transaction ID",
            FieldKey::Date => "Date",
            FieldKey::TransactionType => "Transaction Type",
            FieldKey::PropertyType => "Property Type",
            FieldKey::Location => "Location",
            FieldKey::Developer => "Developer",
            FieldKey::Project => "Project",
            FieldKey::AreaSqFt => "Area (sqft)",
            FieldKey::PriceAed => "Price (AED)",
            FieldKey::PricePerSqFt => "Price/sqft",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A projected field value. `Missing` stands for an absent optional or an
/// undefined derived value; it renders as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            // Plain formatting: no thousands separators, no padding, so the
            // value stays machine-parseable in exports.
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Missing => Ok(()),
        }
    }
}

impl TransactionRecord {
    /// Project a single field of this record.
    pub fn field(&self, key: FieldKey) -> FieldValue {
        match key {
            FieldKey::Id => FieldValue::Text(self.id.to_string()),
            FieldKey::Date => match self.date {
                Some(d) => FieldValue::Date(d),
                None => FieldValue::Missing,
            },
            FieldKey::TransactionType => FieldValue::Text(self.transaction_type.to_string()),
            FieldKey::PropertyType => FieldValue::Text(self.property_type.to_string()),
            FieldKey::Location => FieldValue::Text(self.location.clone()),
            FieldKey::Developer => match &self.developer {
                Some(d) => FieldValue::Text(d.clone()),
                None => FieldValue::Missing,
            },
            FieldKey::Project => match &self.project {
                Some(p) => FieldValue::Text(p.clone()),
                None => FieldValue::Missing,
            },
            FieldKey::AreaSqFt => match self.area_sq_ft {
                Some(a) if a.is_finite() => FieldValue::Number(a),
                _ => FieldValue::Missing,
            },
            FieldKey::PriceAed => FieldValue::Number(self.price_aed),
            FieldKey::PricePerSqFt => match self.price_per_sq_ft() {
                Some(p) if p.is_finite() => FieldValue::Number(p),
                _ => FieldValue::Missing,
            },
        }
    }
}
