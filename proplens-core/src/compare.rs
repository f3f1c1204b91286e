//! Comparison set manager — a small, bounded, user-curated selection of
//! records and the side-by-side matrix built from it.
//!
//! The set holds record ids only, never record copies: values are always
//! projected from the current store, so a stale selection can never show
//! stale data. Toggling is pure — each call returns a new set.

use serde::{Deserialize, Serialize};

use crate::domain::{FieldKey, FieldValue, RecordId};
use crate::store::RecordStore;

/// Default capacity, matching the three comparison slots in the UI.
pub const DEFAULT_COMPARE_CAPACITY: usize = 3;

/// Outcome of a toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The set was at capacity and the id was not a member: no state change.
    RejectedFull,
}

/// Ordered, capacity-bounded selection of record ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSet {
    ids: Vec<RecordId>,
    capacity: usize,
}

impl Default for ComparisonSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_COMPARE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::new(),
            capacity,
        }
    }

    /// Selection order, oldest first.
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.capacity
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// Toggle `id`: a member is removed, a non-member is appended if there
    /// is room. At capacity the toggle is rejected — nothing is evicted.
    /// Returns the new set and what happened.
    pub fn toggle(&self, id: &RecordId) -> (ComparisonSet, ToggleOutcome) {
        if let Some(pos) = self.ids.iter().position(|existing| existing == id) {
            let mut ids = self.ids.clone();
            ids.remove(pos);
            return (
                ComparisonSet {
                    ids,
                    capacity: self.capacity,
                },
                ToggleOutcome::Removed,
            );
        }
        if self.is_full() {
            return (self.clone(), ToggleOutcome::RejectedFull);
        }
        let mut ids = self.ids.clone();
        ids.push(id.clone());
        (
            ComparisonSet {
                ids,
                capacity: self.capacity,
            },
            ToggleOutcome::Added,
        )
    }

    /// Drop ids the store no longer resolves. The selection survives filter
    /// changes; only a store refresh can invalidate a member.
    pub fn prune(&self, store: &RecordStore) -> ComparisonSet {
        ComparisonSet {
            ids: self
                .ids
                .iter()
                .filter(|id| store.contains(id))
                .cloned()
                .collect(),
            capacity: self.capacity,
        }
    }
}

/// One row of the comparison matrix: a field and its value per selected
/// record, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub field: FieldKey,
    pub values: Vec<(RecordId, FieldValue)>,
}

/// Build the field-by-field comparison matrix.
///
/// Rows follow `fields` order, columns follow selection order. Ids the
/// store cannot resolve are dropped without error.
pub fn matrix(set: &ComparisonSet, store: &RecordStore, fields: &[FieldKey]) -> Vec<ComparisonRow> {
    let selected: Vec<_> = set
        .ids()
        .iter()
        .filter_map(|id| store.get(id))
        .collect();

    fields
        .iter()
        .map(|&field| ComparisonRow {
            field,
            values: selected
                .iter()
                .map(|record| (record.id.clone(), record.field(field)))
                .collect(),
        })
        .collect()
}
