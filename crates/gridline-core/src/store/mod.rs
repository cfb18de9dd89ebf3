// ── Local state ──
//
// The authoritative in-memory snapshot of one entity type and the
// durable key/value slot holding column layouts.

pub mod columns;
mod snapshot;

pub use columns::{ColumnStore, FileColumnStore, MemoryColumnStore, load_columns, save_columns};
pub use snapshot::{EntitySnapshot, Snapshot};
