// ── Column configuration ──
//
// One `ColumnConfig` per displayed column. The full set is what gets
// persisted per view, so the serialized shape is the storage format.

use serde::{Deserialize, Serialize};

/// Display configuration for one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    /// Unique within a configuration set.
    pub id: String,
    /// Record field rendered in this column.
    pub data_field: String,
    pub display_name: String,
    pub width: u32,
    pub visible: bool,
    pub pinned: bool,
    /// Stable order within the pinned and unpinned partitions.
    pub original_order: u32,
}

impl ColumnConfig {
    /// A visible, unpinned column whose id, field and label are all `field`.
    pub fn new(field: impl Into<String>, width: u32, original_order: u32) -> Self {
        let field = field.into();
        Self {
            id: field.clone(),
            data_field: field.clone(),
            display_name: field,
            width,
            visible: true,
            pinned: false,
            original_order,
        }
    }

    #[must_use]
    pub fn labeled(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Replace one attribute.
    pub fn apply(&mut self, attr: ColumnAttr) {
        match attr {
            ColumnAttr::DataField(v) => self.data_field = v,
            ColumnAttr::DisplayName(v) => self.display_name = v,
            ColumnAttr::Width(v) => self.width = v,
            ColumnAttr::Visible(v) => self.visible = v,
            ColumnAttr::Pinned(v) => self.pinned = v,
            ColumnAttr::OriginalOrder(v) => self.original_order = v,
        }
    }
}

/// A single column attribute with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnAttr {
    DataField(String),
    DisplayName(String),
    Width(u32),
    Visible(bool),
    Pinned(bool),
    OriginalOrder(u32),
}
