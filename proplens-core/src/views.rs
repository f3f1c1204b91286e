//! Derived views — one immutable query state in, every page view out.
//!
//! The four user-facing specs (filter, sort, aggregation, comparison) live
//! together in `QueryState`; `derive_views` recomputes the list rows, the
//! summary groups, and the comparison matrix from scratch on every call.
//! Nothing is cached and nothing is mutated, so the UI layer can re-derive
//! on each input change and always sees a consistent snapshot.

use rayon::join;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, AggregationSpec, GroupSummary};
use crate::compare::{matrix, ComparisonRow, ComparisonSet};
use crate::domain::FieldKey;
use crate::filter::{filter, FilterCriteria};
use crate::sort::{sort, SortSpec};
use crate::store::RecordStore;

/// Fields shown in the side-by-side comparison table, in row order.
pub const DEFAULT_COMPARE_FIELDS: &[FieldKey] = &[
    FieldKey::Date,
    FieldKey::TransactionType,
    FieldKey::PropertyType,
    FieldKey::Location,
    FieldKey::Developer,
    FieldKey::Project,
    FieldKey::AreaSqFt,
    FieldKey::PriceAed,
    FieldKey::PricePerSqFt,
];

/// The complete user-facing query state, as one immutable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[serde(default)]
    pub sort: SortSpec,
    #[serde(default)]
    pub aggregation: AggregationSpec,
    #[serde(default)]
    pub comparison: ComparisonSet,
}

/// Everything the surrounding pages render, derived in one pass.
#[derive(Debug, Clone)]
pub struct DerivedViews {
    /// Filtered and sorted records for the list/grid.
    pub rows: Vec<crate::domain::TransactionRecord>,
    /// Group summaries for the overview cards, over the filtered set.
    pub groups: Vec<GroupSummary>,
    /// Comparison matrix, drawn from the full store so the selection
    /// survives filter changes.
    pub matrix: Vec<ComparisonRow>,
}

/// Derive all views from `(store, state)`.
///
/// Filter runs once; sort and aggregate both consume the filtered set and
/// are independent, so they fan out across threads. The result depends
/// only on the inputs — a stale result is simply discarded by the caller.
pub fn derive_views(store: &RecordStore, state: &QueryState) -> DerivedViews {
    derive_views_with_fields(store, state, DEFAULT_COMPARE_FIELDS)
}

/// `derive_views` with an explicit comparison field list.
pub fn derive_views_with_fields(
    store: &RecordStore,
    state: &QueryState,
    compare_fields: &[FieldKey],
) -> DerivedViews {
    let filtered = filter(store.records(), &state.criteria);

    let (rows, groups) = join(
        || sort(&filtered, &state.sort),
        || aggregate(&filtered, &state.aggregation),
    );

    let comparison = state.comparison.prune(store);
    let matrix = matrix(&comparison, store, compare_fields);

    DerivedViews {
        rows,
        groups,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::GroupBy;
    use crate::domain::{PropertyType, RecordId, TransactionRecord, TransactionType};
    use crate::filter::RangeFilter;
    use crate::sort::SortDirection;
    use chrono::NaiveDate;

    fn make_record(id: &str, property_type: PropertyType, price: f64) -> TransactionRecord {
        TransactionRecord {
            id: RecordId::new(id),
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            transaction_type: TransactionType::Sale,
            property_type,
            location: "Dubai South".into(),
            developer: None,
            project: None,
            area_sq_ft: Some(1000.0),
            price_aed: price,
            coordinates: None,
        }
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(vec![
            make_record("T1", PropertyType::Apartment, 1_000_000.0),
            make_record("T2", PropertyType::Villa, 4_000_000.0),
            make_record("T3", PropertyType::Apartment, 2_000_000.0),
        ])
    }

    #[test]
    fn derives_rows_groups_and_matrix_together() {
        let store = sample_store();
        let mut state = QueryState {
            sort: SortSpec::new(FieldKey::PriceAed, SortDirection::Desc),
            aggregation: AggregationSpec::new(GroupBy::PropertyType),
            ..Default::default()
        };
        state.comparison = state.comparison.toggle(&RecordId::new("T2")).0;

        let views = derive_views(&store, &state);

        let ids: Vec<&str> = views.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["T2", "T3", "T1"]);
        assert_eq!(views.groups[0].key, "apartment");
        assert_eq!(views.groups[0].count, 2);
        assert_eq!(views.matrix.len(), DEFAULT_COMPARE_FIELDS.len());
        assert_eq!(views.matrix[0].values.len(), 1);
    }

    #[test]
    fn aggregation_scope_is_the_filtered_set() {
        let store = sample_store();
        let state = QueryState {
            criteria: FilterCriteria {
                price_aed: RangeFilter::new(Some(1_500_000.0), None),
                ..Default::default()
            },
            aggregation: AggregationSpec::new(GroupBy::PropertyType),
            ..Default::default()
        };
        let views = derive_views(&store, &state);

        // Two of three records pass the filter; percentages are over those two.
        assert_eq!(views.rows.len(), 2);
        let pct_sum: f64 = views.groups.iter().map(|g| g.percentage_of_total).sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_survives_filter_changes() {
        let store = sample_store();
        let mut state = QueryState::default();
        state.comparison = state.comparison.toggle(&RecordId::new("T1")).0;
        // A filter that excludes T1 from the rows...
        state.criteria.price_aed = RangeFilter::new(Some(3_000_000.0), None);

        let views = derive_views(&store, &state);
        assert_eq!(views.rows.len(), 1);
        // ...does not remove it from the matrix.
        assert_eq!(views.matrix[0].values.len(), 1);
        assert_eq!(views.matrix[0].values[0].0.as_str(), "T1");
    }

    #[test]
    fn stale_comparison_ids_are_pruned() {
        let store = sample_store();
        let mut state = QueryState::default();
        state.comparison = state.comparison.toggle(&RecordId::new("DELETED")).0;
        state.comparison = state.comparison.toggle(&RecordId::new("T3")).0;

        let views = derive_views(&store, &state);
        let columns: Vec<&str> = views.matrix[0]
            .values
            .iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(columns, vec!["T3"]);
    }

    #[test]
    fn same_inputs_same_outputs() {
        let store = sample_store();
        let state = QueryState::default();
        let a = derive_views(&store, &state);
        let b = derive_views(&store, &state);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.groups, b.groups);
        assert_eq!(a.matrix, b.matrix);
    }

    #[test]
    fn empty_store_derives_empty_views() {
        let store = RecordStore::new(vec![]);
        let views = derive_views(&store, &QueryState::default());
        assert!(views.rows.is_empty());
        assert!(views.groups.is_empty());
        assert!(views.matrix.iter().all(|row| row.values.is_empty()));
    }
}
