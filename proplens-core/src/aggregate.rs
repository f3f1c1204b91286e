//! Aggregator — groups a record subset by a categorical dimension (or
//! bucketed numeric field) and computes per-group summary statistics.
//!
//! Output ordering is deterministic: descending count with key-ascending
//! tie-break by default, alphabetical on request, and always ascending
//! bucket order for bucketed numeric grouping. A group is never emitted
//! with `count = 0`; empty input yields an empty list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::TransactionRecord;

/// Ascending thresholds carving a numeric axis into `thresholds.len() + 1`
/// half-open buckets: `< t0`, `[t0, t1)`, …, `>= tn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    thresholds: Vec<f64>,
}

impl BucketSpec {
    /// Build a bucket spec, sanitizing the thresholds: non-finite values
    /// are dropped, the rest sorted ascending and deduplicated. An empty
    /// threshold list degrades to a single all-encompassing bucket.
    pub fn new(thresholds: Vec<f64>) -> Self {
        let mut thresholds: Vec<f64> = thresholds.into_iter().filter(|t| t.is_finite()).collect();
        thresholds.sort_by(|a, b| a.partial_cmp(b).expect("finite thresholds"));
        thresholds.dedup();
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Number of buckets this spec defines.
    pub fn bucket_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// Index of the bucket containing `value`.
    pub fn bucket_index(&self, value: f64) -> usize {
        self.thresholds.iter().take_while(|&&t| value >= t).count()
    }

    /// Human-readable label for bucket `index`, e.g. `< 500000`,
    /// `500000-1000000`, `>= 2000000`. Plain numbers, no separators.
    pub fn label(&self, index: usize) -> String {
        if self.thresholds.is_empty() {
            return "all".to_string();
        }
        if index == 0 {
            format!("< {}", self.thresholds[0])
        } else if index == self.thresholds.len() {
            format!(">= {}", self.thresholds[index - 1])
        } else {
            format!("{}-{}", self.thresholds[index - 1], self.thresholds[index])
        }
    }
}

/// Dimension to group by: a categorical field, or a numeric field carved
/// into buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupBy {
    PropertyType,
    TransactionType,
    Location,
    Developer,
    PriceBucket(BucketSpec),
    AreaBucket(BucketSpec),
}

impl GroupBy {
    pub fn is_bucketed(&self) -> bool {
        matches!(self, GroupBy::PriceBucket(_) | GroupBy::AreaBucket(_))
    }
}

/// Requested group ordering. Bucketed grouping ignores this and always
/// orders by ascending bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Largest group first; equal counts break alphabetically.
    #[default]
    CountDesc,
    /// Alphabetical by group key.
    KeyAsc,
}

/// What to group on and how to order the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub group_by: GroupBy,
    #[serde(default)]
    pub order: GroupOrder,
}

impl AggregationSpec {
    pub fn new(group_by: GroupBy) -> Self {
        Self {
            group_by,
            order: GroupOrder::default(),
        }
    }
}

impl Default for AggregationSpec {
    fn default() -> Self {
        Self::new(GroupBy::PropertyType)
    }
}

/// Summary statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub sum_price: f64,
    pub avg_price: f64,
    /// Mean area over the group's records that have one; `None` when no
    /// member has a defined area (never zero).
    pub avg_area: Option<f64>,
    /// Share of the in-scope record count, in percent, at full precision.
    pub percentage_of_total: f64,
}

impl GroupSummary {
    /// Percentage rounded to one decimal, as shown on summary cards. The
    /// full-precision value stays in `percentage_of_total`.
    pub fn percentage_display(&self) -> f64 {
        (self.percentage_of_total * 10.0).round() / 10.0
    }
}

/// Group `records` per `spec` and summarize each group.
///
/// The percentage denominator is `records.len()` — the filtered set passed
/// in, not the full store. Records lacking the grouping field contribute to
/// the denominator but appear in no group.
pub fn aggregate(records: &[TransactionRecord], spec: &AggregationSpec) -> Vec<GroupSummary> {
    if records.is_empty() {
        return Vec::new();
    }
    let total = records.len();

    // Accumulate per key. Bucket index doubles as the sort rank for
    // bucketed grouping.
    struct Acc {
        rank: usize,
        count: usize,
        sum_price: f64,
        area_sum: f64,
        area_count: usize,
    }
    let mut groups: HashMap<String, Acc> = HashMap::new();

    for record in records {
        let Some((key, rank)) = group_key(record, &spec.group_by) else {
            continue;
        };
        let acc = groups.entry(key).or_insert(Acc {
            rank,
            count: 0,
            sum_price: 0.0,
            area_sum: 0.0,
            area_count: 0,
        });
        acc.count += 1;
        acc.sum_price += record.price_aed;
        if let Some(area) = record.area_sq_ft {
            acc.area_sum += area;
            acc.area_count += 1;
        }
    }

    let mut summaries: Vec<(usize, GroupSummary)> = groups
        .into_iter()
        .map(|(key, acc)| {
            let avg_area = if acc.area_count > 0 {
                Some(acc.area_sum / acc.area_count as f64)
            } else {
                None
            };
            let summary = GroupSummary {
                key,
                count: acc.count,
                sum_price: acc.sum_price,
                avg_price: acc.sum_price / acc.count as f64,
                avg_area,
                percentage_of_total: acc.count as f64 / total as f64 * 100.0,
            };
            (acc.rank, summary)
        })
        .collect();

    if spec.group_by.is_bucketed() {
        // Bucket order regardless of count.
        summaries.sort_by(|a, b| a.0.cmp(&b.0));
    } else {
        match spec.order {
            GroupOrder::CountDesc => summaries.sort_by(|a, b| {
                b.1.count
                    .cmp(&a.1.count)
                    .then_with(|| a.1.key.cmp(&b.1.key))
            }),
            GroupOrder::KeyAsc => summaries.sort_by(|a, b| a.1.key.cmp(&b.1.key)),
        }
    }

    summaries.into_iter().map(|(_, s)| s).collect()
}

/// The grouping key (and ordering rank) for one record, or `None` when the
/// record lacks the grouping field.
fn group_key(record: &TransactionRecord, group_by: &GroupBy) -> Option<(String, usize)> {
    match group_by {
        GroupBy::PropertyType => Some((record.property_type.to_string(), 0)),
        GroupBy::TransactionType => Some((record.transaction_type.to_string(), 0)),
        GroupBy::Location => Some((record.location.clone(), 0)),
        GroupBy::Developer => record.developer.as_ref().map(|d| (d.clone(), 0)),
        GroupBy::PriceBucket(buckets) => {
            let idx = buckets.bucket_index(record.price_aed);
            Some((buckets.label(idx), idx))
        }
        GroupBy::AreaBucket(buckets) => record.area_sq_ft.map(|area| {
            let idx = buckets.bucket_index(area);
            (buckets.label(idx), idx)
        }),
    }
}
