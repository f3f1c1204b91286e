//! RecordStore — the immutable, normalized record collection for a session.
//!
//! Populated once from an external fetch, then treated as read-only for its
//! whole lifetime. A data refresh is modeled as building a new store and
//! swapping it in wholesale, so derived computations always see a
//! consistent snapshot.
//!
//! Construction canonicalizes the feed:
//! - records with a non-finite or negative price are dropped
//! - non-positive or non-finite areas are normalized to `None`
//! - duplicate ids are deduplicated, first occurrence wins

use std::collections::HashMap;

use crate::domain::{RecordId, TransactionRecord};

/// Immutable snapshot of the session's transaction records.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<TransactionRecord>,
    index: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Build a store from raw feed records, canonicalizing as described in
    /// the module docs. Input order is preserved for the surviving records.
    pub fn new(raw: Vec<TransactionRecord>) -> Self {
        let mut records = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());

        for mut record in raw {
            if !record.is_sane() {
                continue;
            }
            if let Some(area) = record.area_sq_ft {
                if !area.is_finite() || area <= 0.0 {
                    record.area_sq_ft = None;
                }
            }
            if index.contains_key(&record.id) {
                continue; // keep-first dedupe
            }
            index.insert(record.id.clone(), records.len());
            records.push(record);
        }

        Self { records, index }
    }

    /// All records, in canonical (insertion) order.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Look up a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&TransactionRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Content hash of the snapshot (BLAKE3 over the canonical JSON).
    ///
    /// Two stores built from the same feed hash identically, so exports and
    /// derived views can name the exact dataset they were computed from.
    pub fn dataset_hash(&self) -> String {
        let json =
            serde_json::to_string(&self.records).expect("TransactionRecord serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
