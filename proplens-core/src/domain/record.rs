//! TransactionRecord — the unit every engine operation consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::ids::RecordId;

/// Kind of transaction registered for a property.
///
/// Deserialized through `From<String>` so an unrecognized feed value
/// degrades to `Other` instead of failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum TransactionType {
    Sale,
    Rent,
    Lease,
    Other,
}

impl From<String> for TransactionType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(TransactionType::Other)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Sale => "sale",
            TransactionType::Rent => "rent",
            TransactionType::Lease => "lease",
            TransactionType::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sale" => Ok(TransactionType::Sale),
            "rent" => Ok(TransactionType::Rent),
            "lease" => Ok(TransactionType::Lease),
            _ => Err(()),
        }
    }
}

/// Property category of the transacted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PropertyType {
    Apartment,
    Villa,
    Townhouse,
    Office,
    Retail,
    Land,
    Other,
}

impl From<String> for PropertyType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(PropertyType::Other)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Office => "office",
            PropertyType::Retail => "retail",
            PropertyType::Land => "land",
            PropertyType::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PropertyType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apartment" => Ok(PropertyType::Apartment),
            "villa" => Ok(PropertyType::Villa),
            "townhouse" => Ok(PropertyType::Townhouse),
            "office" => Ok(PropertyType::Office),
            "retail" => Ok(PropertyType::Retail),
            "land" => Ok(PropertyType::Land),
            _ => Err(()),
        }
    }
}

/// WGS84 point for map rendering (out of scope for the engine itself,
/// carried through untouched).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single registered property transaction.
///
/// `price_per_sq_ft` is intentionally NOT a field: it is always recomputed
/// from `price_aed` / `area_sq_ft` so it can never drift from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: RecordId,

    /// Transaction date. `None` when the feed value is absent or malformed —
    /// such records still flow through every operation and simply sort last.
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,

    pub transaction_type: TransactionType,
    pub property_type: PropertyType,
    pub location: String,

    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub project: Option<String>,

    /// Unit area in square feet. Non-positive feed values are normalized to
    /// `None` by the record store.
    #[serde(default)]
    pub area_sq_ft: Option<f64>,

    /// Transaction value in AED. Non-negative.
    #[serde(default)]
    pub price_aed: f64,

    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl TransactionRecord {
    /// Derived price per square foot. Defined only when a positive area is
    /// known; never stored, never settable.
    pub fn price_per_sq_ft(&self) -> Option<f64> {
        match self.area_sq_ft {
            Some(area) if area > 0.0 => Some(self.price_aed / area),
            _ => None,
        }
    }

    /// Basic sanity check: the price is a finite, non-negative number.
    /// Records failing this are dropped at store construction.
    pub fn is_sane(&self) -> bool {
        self.price_aed.is_finite() && self.price_aed >= 0.0
    }
}

/// Date formats the DLD feeds have been observed to emit.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a feed date leniently: unknown formats become `None`, never an error.
pub fn parse_feed_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    // Accept null, a missing field (via #[serde(default)]), or a string in
    // any known format. Anything else degrades to None.
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_feed_date))
}
