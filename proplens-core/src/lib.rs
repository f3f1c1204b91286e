//! PropLens Core — the query/aggregation engine behind the property
//! analytics pages.
//!
//! This crate contains the reusable core the dashboard pages share:
//! - Domain types (transaction records, ids, field projection)
//! - Immutable record store with canonicalized construction
//! - Filter evaluator (conjunction of optional predicates)
//! - Sort comparator (stable, total order, missing-last)
//! - Aggregator (group summaries with percentage-of-total)
//! - Comparison set manager (bounded side-by-side selection)
//! - Exporter (CSV / self-describing JSON payloads)
//! - Derived-views fan-out (one query state in, all page views out)
//!
//! Every operation is a pure, synchronous function of its inputs: no I/O,
//! no hidden state, no mutation of the record store. A data refresh is a
//! wholesale store replacement.

pub mod aggregate;
pub mod compare;
pub mod domain;
pub mod export;
pub mod filter;
pub mod sort;
pub mod store;
pub mod views;

pub use aggregate::{aggregate, AggregationSpec, BucketSpec, GroupBy, GroupOrder, GroupSummary};
pub use compare::{
    matrix, ComparisonRow, ComparisonSet, ToggleOutcome, DEFAULT_COMPARE_CAPACITY,
};
pub use domain::{
    Coordinates, FieldKey, FieldSemantic, FieldValue, PropertyType, RecordId, TransactionRecord,
    TransactionType,
};
pub use export::{
    from_json, to_csv, to_json, ExportEnvelope, ExportError, EXPORT_SCHEMA_VERSION,
    TRANSACTIONS_EXPORT_COLUMNS,
};
pub use filter::{filter, parse_bound, parse_choice, FilterCriteria, RangeFilter, ALL_SENTINEL};
pub use sort::{sort, SortDirection, SortSpec};
pub use store::RecordStore;
pub use views::{
    derive_views, derive_views_with_fields, DerivedViews, QueryState, DEFAULT_COMPARE_FIELDS,
};
