//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Filter idempotence — filtering a filtered set changes nothing
//! 2. Sort stability and reproducibility — total order, bit-identical reruns
//! 3. Partition coverage — group counts and percentages add up
//! 4. Comparison set bound — no toggle sequence exceeds capacity

use chrono::NaiveDate;
use proptest::prelude::*;

use proplens_core::{
    aggregate, filter, sort, AggregationSpec, ComparisonSet, FieldKey, FilterCriteria, GroupBy,
    PropertyType, RangeFilter, RecordId, SortDirection, SortSpec, TransactionRecord,
    TransactionType,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_property_type() -> impl Strategy<Value = PropertyType> {
    prop_oneof![
        Just(PropertyType::Apartment),
        Just(PropertyType::Villa),
        Just(PropertyType::Townhouse),
        Just(PropertyType::Office),
        Just(PropertyType::Retail),
        Just(PropertyType::Land),
    ]
}

fn arb_transaction_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Sale),
        Just(TransactionType::Rent),
        Just(TransactionType::Lease),
    ]
}

fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop_oneof![
        Just(None::<NaiveDate>),
        (2015u32..2026, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y as i32, m, d)),
    ]
}

fn arb_record(index: usize) -> impl Strategy<Value = TransactionRecord> {
    (
        arb_date(),
        arb_transaction_type(),
        arb_property_type(),
        prop_oneof![
            Just("Dubai Marina"),
            Just("Downtown Dubai"),
            Just("Palm Jumeirah"),
            Just("JVC"),
        ],
        proptest::option::of(100.0..10_000.0f64),
        0.0..20_000_000.0f64,
    )
        .prop_map(
            move |(date, transaction_type, property_type, location, area, price)| {
                TransactionRecord {
                    id: RecordId::new(format!("T{index:04}")),
                    date,
                    transaction_type,
                    property_type,
                    location: location.to_string(),
                    developer: None,
                    project: None,
                    area_sq_ft: area,
                    price_aed: price,
                    coordinates: None,
                }
            },
        )
}

fn arb_records(max: usize) -> impl Strategy<Value = Vec<TransactionRecord>> {
    (0..max).prop_flat_map(|n| (0..n).map(arb_record).collect::<Vec<_>>())
}

fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
    (
        proptest::option::of(arb_property_type()),
        proptest::option::of(0.0..10_000_000.0f64),
        proptest::option::of(0.0..10_000_000.0f64),
        proptest::option::of(0.0..5_000.0f64),
    )
        .prop_map(|(property_type, price_min, price_max, area_min)| FilterCriteria {
            property_type,
            price_aed: RangeFilter::new(price_min, price_max),
            area_sq_ft: RangeFilter::new(area_min, None),
            ..Default::default()
        })
}

fn arb_sort_spec() -> impl Strategy<Value = SortSpec> {
    (
        prop_oneof![
            Just(FieldKey::Date),
            Just(FieldKey::PriceAed),
            Just(FieldKey::AreaSqFt),
            Just(FieldKey::PricePerSqFt),
            Just(FieldKey::Location),
        ],
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)],
    )
        .prop_map(|(field, direction)| SortSpec::new(field, direction))
}

// ── 1. Filter Idempotence ────────────────────────────────────────────

proptest! {
    /// filter(filter(R, C), C) == filter(R, C).
    #[test]
    fn filter_is_idempotent(records in arb_records(40), criteria in arb_criteria()) {
        let once = filter(&records, &criteria);
        let twice = filter(&once, &criteria);
        prop_assert_eq!(once, twice);
    }

    /// The filtered set preserves the input's relative order.
    #[test]
    fn filter_preserves_order(records in arb_records(40), criteria in arb_criteria()) {
        let out = filter(&records, &criteria);
        let input_ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        let positions: Vec<_> = out
            .iter()
            .map(|r| input_ids.iter().position(|id| *id == r.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

// ── 2. Sort Stability & Reproducibility ──────────────────────────────

proptest! {
    /// Sorting twice yields bit-identical output (total order).
    #[test]
    fn sort_is_reproducible(records in arb_records(40), spec in arb_sort_spec()) {
        prop_assert_eq!(sort(&records, &spec), sort(&records, &spec));
    }

    /// Sorting a sorted set is the identity.
    #[test]
    fn sort_is_idempotent(records in arb_records(40), spec in arb_sort_spec()) {
        let once = sort(&records, &spec);
        let twice = sort(&once, &spec);
        prop_assert_eq!(once, twice);
    }

    /// Output is a permutation of the input.
    #[test]
    fn sort_is_a_permutation(records in arb_records(40), spec in arb_sort_spec()) {
        let out = sort(&records, &spec);
        prop_assert_eq!(out.len(), records.len());
        let mut in_ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        let mut out_ids: Vec<_> = out.iter().map(|r| r.id.clone()).collect();
        in_ids.sort();
        out_ids.sort();
        prop_assert_eq!(in_ids, out_ids);
    }

    /// Missing sort keys land at the back regardless of direction.
    #[test]
    fn sort_places_missing_last(records in arb_records(40), direction in prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]) {
        let spec = SortSpec::new(FieldKey::AreaSqFt, direction);
        let out = sort(&records, &spec);
        let first_missing = out
            .iter()
            .position(|r| r.area_sq_ft.is_none())
            .unwrap_or(out.len());
        prop_assert!(out[first_missing..].iter().all(|r| r.area_sq_ft.is_none()));
    }
}

// ── 3. Partition Coverage ────────────────────────────────────────────

proptest! {
    /// Grouping by a total categorical field covers every record, and the
    /// percentages sum to 100 within the rounding tolerance.
    #[test]
    fn aggregation_partitions_completely(records in arb_records(40)) {
        let groups = aggregate(&records, &AggregationSpec::new(GroupBy::PropertyType));

        let count_sum: usize = groups.iter().map(|g| g.count).sum();
        prop_assert_eq!(count_sum, records.len());

        if !records.is_empty() {
            let pct_sum: f64 = groups.iter().map(|g| g.percentage_of_total).sum();
            prop_assert!((pct_sum - 100.0).abs() < 1e-6);
            let display_sum: f64 = groups.iter().map(|g| g.percentage_display()).sum();
            prop_assert!((display_sum - 100.0).abs() <= 0.1 * groups.len() as f64);
        }

        prop_assert!(groups.iter().all(|g| g.count > 0));
    }

    /// Price buckets partition the whole set too (every price lands in
    /// exactly one bucket).
    #[test]
    fn price_buckets_partition_completely(records in arb_records(40)) {
        let spec = AggregationSpec::new(GroupBy::PriceBucket(
            proplens_core::BucketSpec::new(vec![500_000.0, 1_000_000.0, 5_000_000.0]),
        ));
        let groups = aggregate(&records, &spec);
        let count_sum: usize = groups.iter().map(|g| g.count).sum();
        prop_assert_eq!(count_sum, records.len());
    }
}

// ── 4. Bounded Comparison Set ────────────────────────────────────────

proptest! {
    /// No toggle sequence can push the set past its capacity, and every
    /// intermediate state is well-formed (no duplicate members).
    #[test]
    fn comparison_set_never_exceeds_capacity(
        toggles in proptest::collection::vec(0usize..8, 0..30),
        capacity in 1usize..5,
    ) {
        let mut set = ComparisonSet::with_capacity(capacity);
        for t in toggles {
            let id = RecordId::new(format!("T{t}"));
            set = set.toggle(&id).0;
            prop_assert!(set.len() <= capacity);
            let mut ids: Vec<_> = set.ids().to_vec();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), set.len());
        }
    }

    /// Toggling the same id twice is the identity.
    #[test]
    fn double_toggle_is_identity(ids in proptest::collection::vec(0usize..6, 0..6)) {
        let mut set = ComparisonSet::new();
        for t in &ids {
            set = set.toggle(&RecordId::new(format!("T{t}"))).0;
        }
        let target = RecordId::new("FRESH");
        let (after_one, _) = set.toggle(&target);
        let (after_two, _) = after_one.toggle(&target);
        prop_assert_eq!(after_two, set);
    }
}
