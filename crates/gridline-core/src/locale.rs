// ── Localized default messages ──
//
// Used when a write reply carries no server message of its own.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Language of user-facing default messages, also forwarded to the auth
/// endpoint as the login language tag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Vi,
}

/// The write operation a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Language {
    /// Default message for a write that succeeded without a server message.
    pub fn success(self, op: Operation) -> &'static str {
        match (self, op) {
            (Self::En, Operation::Create) => "Added successfully",
            (Self::En, Operation::Update) => "Updated successfully",
            (Self::En, Operation::Delete) => "Deleted successfully",
            (Self::Vi, Operation::Create) => "Thêm mới thành công",
            (Self::Vi, Operation::Update) => "Cập nhật thành công",
            (Self::Vi, Operation::Delete) => "Xóa thành công",
        }
    }

    /// Default message for a write that failed without a server message.
    pub fn failure(self, op: Operation) -> &'static str {
        match (self, op) {
            (Self::En, Operation::Create) => "Failed to add record",
            (Self::En, Operation::Update) => "Failed to update record",
            (Self::En, Operation::Delete) => "Failed to delete record",
            (Self::Vi, Operation::Create) => "Thêm mới thất bại",
            (Self::Vi, Operation::Update) => "Cập nhật thất bại",
            (Self::Vi, Operation::Delete) => "Xóa thất bại",
        }
    }

    /// Message for an update or delete attempted without an id.
    pub fn missing_id(self) -> &'static str {
        match self {
            Self::En => "Record id is required",
            Self::Vi => "Thiếu mã bản ghi",
        }
    }
}
