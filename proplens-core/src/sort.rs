//! Sort comparator — orders a record subset by a chosen field and direction.
//!
//! Guarantees a total, reproducible order:
//! - the sort is stable (equal keys keep their pre-sort relative order)
//! - exact key ties break on `id` ascending, in both directions
//! - records with a missing or unparseable key sort last regardless of
//!   direction (a naive reversed comparator would float them to the front)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::{FieldKey, FieldValue, TransactionRecord};

/// Sort direction. `Desc` flips the primary comparison only — never the
/// tie-break and never the missing-last rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Which field to sort on and in which direction. The comparator class
/// (date / numeric / text) travels with the field itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: FieldKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: FieldKey, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Newest-first by transaction date — the view every page opens with.
impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: FieldKey::Date,
            direction: SortDirection::Desc,
        }
    }
}

/// Compare two records under `spec`. Total order: never returns `Equal`
/// for records with distinct ids.
pub fn compare(a: &TransactionRecord, b: &TransactionRecord, spec: &SortSpec) -> Ordering {
    compare_keys(
        &sort_key(a, spec.field),
        &sort_key(b, spec.field),
        spec.direction,
    )
    // Explicit secondary key: id ascending, never direction-flipped.
    .then_with(|| a.id.cmp(&b.id))
}

/// Sort `records` by `spec`, returning a new vector. Stable; bit-identical
/// across runs for the same input.
///
/// Keys are projected once per record, not once per comparison.
pub fn sort(records: &[TransactionRecord], spec: &SortSpec) -> Vec<TransactionRecord> {
    let mut decorated: Vec<(Option<SortKey>, TransactionRecord)> = records
        .iter()
        .map(|r| (sort_key(r, spec.field), r.clone()))
        .collect();
    decorated.sort_by(|(ka, a), (kb, b)| {
        compare_keys(ka, kb, spec.direction).then_with(|| a.id.cmp(&b.id))
    });
    decorated.into_iter().map(|(_, r)| r).collect()
}

fn compare_keys(a: &Option<SortKey>, b: &Option<SortKey>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(ka), Some(kb)) => {
            let ord = ka.cmp(kb);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        // Missing keys sort last independent of direction.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Totally ordered key for one field of one record. `None` means the key is
/// missing (absent optional, undefined derived value, or NaN).
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Date(chrono::NaiveDate),
    // Finite by construction: NaN and infinities map to a missing key.
    Numeric(f64),
    Text(String),
}

impl Eq for SortKey {}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Numeric(a), SortKey::Numeric(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // A single spec projects a single variant; mixed variants
            // cannot occur but must still order deterministically.
            (SortKey::Date(_), _) => Ordering::Less,
            (_, SortKey::Date(_)) => Ordering::Greater,
            (SortKey::Numeric(_), _) => Ordering::Less,
            (_, SortKey::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn sort_key(record: &TransactionRecord, field: FieldKey) -> Option<SortKey> {
    match record.field(field) {
        FieldValue::Date(d) => Some(SortKey::Date(d)),
        FieldValue::Number(n) if n.is_finite() => Some(SortKey::Numeric(n)),
        FieldValue::Number(_) => None,
        FieldValue::Text(s) => Some(SortKey::Text(s)),
        FieldValue::Missing => None,
    }
}
