//! Filter evaluator — reduces a record collection to the subset matching a
//! conjunction of criteria.
//!
//! Every predicate is optional and unset by default; an unset predicate
//! matches everything, so `FilterCriteria::default()` is the identity
//! filter. Unparseable user input always degrades to "unset", never to
//! "match nothing" and never to an error.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::{PropertyType, TransactionRecord, TransactionType};

/// UI sentinel meaning "no categorical filter".
pub const ALL_SENTINEL: &str = "all";

/// Inclusive numeric range. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        // NaN bounds are treated as absent, not as "exclude everything".
        Self {
            min: min.filter(|v| v.is_finite()),
            max: max.filter(|v| v.is_finite()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether `value` satisfies the active bounds. Both bounds inclusive.
    pub fn contains(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }

    /// Whether an optional field value passes this filter. A record missing
    /// the field fails an *active* range filter and passes an inactive one.
    fn matches_opt(&self, value: Option<f64>) -> bool {
        if !self.is_active() {
            return true;
        }
        match value {
            Some(v) if v.is_finite() => self.contains(v),
            _ => false,
        }
    }
}

/// Parse a numeric bound from user input. Empty or unparseable input (and
/// NaN/inf) is an unset bound.
pub fn parse_bound(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a categorical choice from user input. The `"all"` sentinel, empty
/// input, and unrecognized values all mean "unset".
pub fn parse_choice<T: FromStr>(input: &str) -> Option<T> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        return None;
    }
    trimmed.parse::<T>().ok()
}

/// A conjunction of independent predicates over transaction records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring match across the searchable fields
    /// (location, developer, project, id). Empty matches everything.
    #[serde(default)]
    pub search_text: String,

    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// Exact location match (the UI presents locations as a picker).
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub price_aed: RangeFilter,
    #[serde(default)]
    pub area_sq_ft: RangeFilter,
}

impl FilterCriteria {
    /// True when no predicate is active — `filter` is the identity.
    pub fn is_unset(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.property_type.is_none()
            && self.transaction_type.is_none()
            && self.location.is_none()
            && !self.price_aed.is_active()
            && !self.area_sq_ft.is_active()
    }

    /// Whether a single record satisfies every active predicate.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let needle = self.search_text.trim().to_lowercase();
        self.matches_with_needle(record, &needle)
    }

    fn matches_with_needle(&self, record: &TransactionRecord, needle: &str) -> bool {
        if !needle.is_empty() && !search_hit(record, needle) {
            return false;
        }
        if let Some(pt) = self.property_type {
            if record.property_type != pt {
                return false;
            }
        }
        if let Some(tt) = self.transaction_type {
            if record.transaction_type != tt {
                return false;
            }
        }
        if let Some(loc) = &self.location {
            if !record.location.eq_ignore_ascii_case(loc) {
                return false;
            }
        }
        if !self.price_aed.matches_opt(Some(record.price_aed)) {
            return false;
        }
        if !self.area_sq_ft.matches_opt(record.area_sq_ft) {
            return false;
        }
        true
    }
}

/// The fixed set of searchable fields: location, developer, project, id.
fn search_hit(record: &TransactionRecord, needle: &str) -> bool {
    record.location.to_lowercase().contains(needle)
        || record
            .developer
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || record
            .project
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(needle))
        || record.id.as_str().to_lowercase().contains(needle)
}

/// Apply `criteria` to `records`, preserving relative order.
///
/// Pure and idempotent: filtering an already-filtered set with the same
/// criteria returns it unchanged.
pub fn filter(records: &[TransactionRecord], criteria: &FilterCriteria) -> Vec<TransactionRecord> {
    let needle = criteria.search_text.trim().to_lowercase();
    records
        .iter()
        .filter(|r| criteria.matches_with_needle(r, &needle))
        .cloned()
        .collect()
}
