//! Domain types: records, identifiers, and field projection.

pub mod field;
pub mod ids;
pub mod record;

pub use field::{FieldKey, FieldSemantic, FieldValue};
pub use ids::RecordId;
pub use record::{
    parse_feed_date, Coordinates, PropertyType, TransactionRecord, TransactionType,
};
