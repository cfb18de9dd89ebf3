// ── Domain model ──
//
// Record capability, the schema-less `Entity`, and column configuration.

pub mod column;
pub mod record;

pub use column::{ColumnAttr, ColumnConfig};
pub use record::{Entity, FieldRef, FieldValue, ID_FIELD, Record};
