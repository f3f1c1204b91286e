//! Saved query configuration — a TOML mirror of the engine's query state.
//!
//! Criteria fields are strings in the file and go through the engine's
//! lenient parsers, so a malformed bound or an unknown category in a saved
//! query degrades to "unset" exactly like malformed UI input would.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use proplens_core::{
    parse_bound, parse_choice, AggregationSpec, BucketSpec, FieldKey, FilterCriteria, GroupBy,
    GroupOrder, RangeFilter, SortDirection, SortSpec,
};

/// Errors from loading a query config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),

    #[error("unknown aggregation dimension '{0}'")]
    UnknownDimension(String),
}

/// A saved query: filters, sort, and an optional aggregation, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub filters: FilterSection,
    pub sort: Option<SortSection>,
    pub aggregate: Option<AggregateSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub search: String,
    pub property_type: String,
    pub transaction_type: String,
    pub location: String,
    pub min_price: String,
    pub max_price: String,
    pub min_area: String,
    pub max_area: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSection {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateSection {
    pub by: String,
    /// Thresholds for price/area bucket dimensions.
    pub buckets: Vec<f64>,
    pub alphabetical: bool,
}

impl Default for AggregateSection {
    fn default() -> Self {
        Self {
            by: "property-type".into(),
            buckets: Vec::new(),
            alphabetical: false,
        }
    }
}

impl QueryConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Build engine criteria from the filter section. Never fails:
    /// unparseable values degrade to unset predicates.
    pub fn criteria(&self) -> FilterCriteria {
        let f = &self.filters;
        FilterCriteria {
            search_text: f.search.clone(),
            property_type: parse_choice(&f.property_type),
            transaction_type: parse_choice(&f.transaction_type),
            location: location_choice(&f.location),
            price_aed: RangeFilter::new(parse_bound(&f.min_price), parse_bound(&f.max_price)),
            area_sq_ft: RangeFilter::new(parse_bound(&f.min_area), parse_bound(&f.max_area)),
        }
    }

    /// Build the sort spec; `None` section means the default (date desc).
    pub fn sort_spec(&self) -> Result<SortSpec, ConfigError> {
        match &self.sort {
            None => Ok(SortSpec::default()),
            Some(section) => {
                let field = parse_sort_field(&section.field)
                    .ok_or_else(|| ConfigError::UnknownSortField(section.field.clone()))?;
                let direction = if section.descending {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                Ok(SortSpec::new(field, direction))
            }
        }
    }

    pub fn aggregation_spec(&self) -> Result<Option<AggregationSpec>, ConfigError> {
        let Some(section) = &self.aggregate else {
            return Ok(None);
        };
        let group_by = parse_dimension(&section.by, &section.buckets)
            .ok_or_else(|| ConfigError::UnknownDimension(section.by.clone()))?;
        let order = if section.alphabetical {
            GroupOrder::KeyAsc
        } else {
            GroupOrder::CountDesc
        };
        Ok(Some(AggregationSpec { group_by, order }))
    }
}

/// Location is free text; only the "all"/empty sentinel unsets it.
fn location_choice(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(proplens_core::ALL_SENTINEL) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_sort_field(name: &str) -> Option<FieldKey> {
    match name.trim().to_ascii_lowercase().as_str() {
        "date" => Some(FieldKey::Date),
        "price" => Some(FieldKey::PriceAed),
        "area" => Some(FieldKey::AreaSqFt),
        "price-per-sqft" | "ppsf" => Some(FieldKey::PricePerSqFt),
        "location" => Some(FieldKey::Location),
        "developer" => Some(FieldKey::Developer),
        "project" => Some(FieldKey::Project),
        "id" => Some(FieldKey::Id),
        _ => None,
    }
}

pub fn parse_dimension(name: &str, buckets: &[f64]) -> Option<GroupBy> {
    match name.trim().to_ascii_lowercase().as_str() {
        "property-type" => Some(GroupBy::PropertyType),
        "transaction-type" => Some(GroupBy::TransactionType),
        "location" => Some(GroupBy::Location),
        "developer" => Some(GroupBy::Developer),
        "price-bucket" => Some(GroupBy::PriceBucket(BucketSpec::new(buckets.to_vec()))),
        "area-bucket" => Some(GroupBy::AreaBucket(BucketSpec::new(buckets.to_vec()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proplens_core::PropertyType;

    #[test]
    fn minimal_config_is_identity_query() {
        let config = QueryConfig::from_toml_str("").unwrap();
        assert!(config.criteria().is_unset());
        assert_eq!(config.sort_spec().unwrap(), SortSpec::default());
        assert!(config.aggregation_spec().unwrap().is_none());
    }

    #[test]
    fn full_config_parses() {
        let config = QueryConfig::from_toml_str(
            r#"
            [filters]
            search = "marina"
            property_type = "apartment"
            min_price = "1000000"
            max_price = "5000000"

            [sort]
            field = "price"
            descending = true

            [aggregate]
            by = "price-bucket"
            buckets = [1000000.0, 2000000.0]
            "#,
        )
        .unwrap();

        let criteria = config.criteria();
        assert_eq!(criteria.search_text, "marina");
        assert_eq!(criteria.property_type, Some(PropertyType::Apartment));
        assert_eq!(criteria.price_aed.min, Some(1_000_000.0));
        assert_eq!(criteria.price_aed.max, Some(5_000_000.0));

        let sort = config.sort_spec().unwrap();
        assert_eq!(sort.field, FieldKey::PriceAed);
        assert_eq!(sort.direction, SortDirection::Desc);

        let agg = config.aggregation_spec().unwrap().unwrap();
        assert!(matches!(agg.group_by, GroupBy::PriceBucket(_)));
    }

    #[test]
    fn malformed_bounds_degrade_to_unset() {
        let config = QueryConfig::from_toml_str(
            r#"
            [filters]
            min_price = "one million"
            property_type = "all"
            "#,
        )
        .unwrap();
        let criteria = config.criteria();
        assert_eq!(criteria.price_aed.min, None);
        assert_eq!(criteria.property_type, None);
        assert!(criteria.is_unset());
    }

    #[test]
    fn unknown_sort_field_is_an_error() {
        let config = QueryConfig::from_toml_str(
            r#"
            [sort]
            field = "charisma"
            "#,
        )
        .unwrap();
        let err = config.sort_spec().unwrap_err();
        assert!(err.to_string().contains("charisma"));
    }
}
