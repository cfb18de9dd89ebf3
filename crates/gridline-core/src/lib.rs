//! Table state engine and entity CRUD orchestration for gridline.
//!
//! - **[`EntityService`]** wraps list / create / update / delete for one
//!   entity behind a uniform contract, using a bearer [`TokenSource`] and a
//!   per-entity [`EntityCodec`]. Writes never raise; they return a
//!   [`MutationOutcome`].
//!
//! - **[`EntityDataController`]** owns the authoritative snapshot, tracks
//!   loading state, and refreshes after successful mutations.
//!
//! - **[`TableState`]** derives the filtered, sorted, tree-flattened and
//!   paginated view, and holds selection, expansion and column layout.
//!
//! - **[`ColumnStore`]** persists column layouts per view.
//!
//! [`TokenSource`]: gridline_api::TokenSource

pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod locale;
pub mod model;
pub mod schedule;
pub mod service;
pub mod store;
pub mod stream;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use gridline_api::{Credentials, DEFAULT_FALLBACK_TOKEN};
pub use codec::{EntityCodec, FieldMapCodec};
pub use config::{
    AuthSettings, Connection, EntityEndpoints, ServiceConfig, TlsVerification, ViewDefinition,
};
pub use controller::{EntityDataController, LoadState, REFRESH_DELAY};
pub use error::CoreError;
pub use locale::{Language, Operation};
pub use model::{ColumnAttr, ColumnConfig, Entity, FieldRef, FieldValue, ID_FIELD, Record};
pub use schedule::{Debouncer, SEARCH_DEBOUNCE, TaskToken, schedule};
pub use service::{EntityService, MutationOutcome};
pub use store::{ColumnStore, EntitySnapshot, FileColumnStore, MemoryColumnStore, Snapshot};
pub use stream::EntityStream;
pub use table::{
    FlatRow, PaginationWindow, Selection, SortOrder, SortSpec, TableConfig, TableState,
};

/// Service over schema-less entities, as built from configuration.
pub type DynamicService = EntityService<FieldMapCodec>;

/// Controller over schema-less entities, as built from configuration.
pub type DynamicController = EntityDataController<FieldMapCodec>;
