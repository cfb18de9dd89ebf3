// ── Record capability and the bundled entity type ──
//
// The table engine never looks inside a record beyond `id()` and
// `field(name)`. `Entity` is the open, schema-less implementation used by
// config-driven views; callers with typed domain structs implement
// `Record` themselves.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name that always resolves to the record identity.
pub const ID_FIELD: &str = "id";

// ── FieldValue ──────────────────────────────────────────────────────

/// An owned field value: string, number, or null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Borrow as a [`FieldRef`]; `None` for null.
    pub fn as_field_ref(&self) -> Option<FieldRef<'_>> {
        match self {
            Self::Null => None,
            Self::Number(n) => Some(FieldRef::Number(*n)),
            Self::Text(s) => Some(FieldRef::Text(s)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert an arbitrary JSON value.
    ///
    /// Booleans and nested structures have no field representation of their
    /// own and are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Parse a command-line literal: numbers become numbers, `null`
    /// becomes null, anything else is text.
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "null" {
            return Self::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(raw.to_owned()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_field_ref() {
            Some(r) => write!(f, "{r}"),
            None => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ── FieldRef ────────────────────────────────────────────────────────

/// A borrowed, non-null field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    Number(f64),
}

impl fmt::Display for FieldRef<'_> {
    #[allow(clippy::float_cmp)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            // Whole numbers print without a trailing ".0".
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

// ── Record ──────────────────────────────────────────────────────────

/// Anything the table engine can display: an identity plus named fields.
pub trait Record: Send + Sync + 'static {
    /// Unique identity within a collection.
    fn id(&self) -> &str;

    /// Look up a field by name. `None` means null or absent.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;
}

// ── Entity ──────────────────────────────────────────────────────────

/// Schema-less record: a required `id` plus insertion-ordered fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldValue>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field. Setting `id` replaces the identity.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if name == ID_FIELD {
            self.id = value.to_string();
        } else {
            self.fields.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Overlay every field of `other` onto `self`, keeping `self.id`.
    pub fn merge(&mut self, other: &Entity) {
        for (name, value) in &other.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

impl Record for Entity {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        if name == ID_FIELD {
            return Some(FieldRef::Text(&self.id));
        }
        self.fields.get(name).and_then(FieldValue::as_field_ref)
    }
}
