// ── Wire codecs ──
//
// A codec converts between a domain record and its wire JSON shape. The
// service is generic over the codec, so typed domain structs can plug in
// their own conversion while config-driven views use `FieldMapCodec`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::model::{Entity, FieldValue, ID_FIELD, Record};

/// Conversion between a domain record and its wire representation.
pub trait EntityCodec: Send + Sync + 'static {
    type Entity: Record + Clone;

    /// Decode one wire record. Rejection fails the whole list.
    fn from_wire(&self, wire: &Value) -> Result<Self::Entity, CoreError>;

    /// Encode a record for an add / update / delete body.
    fn to_wire(&self, entity: &Self::Entity) -> Value;

    /// A record carrying only the given identity, used as the delete payload.
    fn identity_stub(&self, id: &str) -> Self::Entity;
}

/// Codec for [`Entity`] driven by a domain → wire field-name map.
///
/// Fields absent from the map keep their name on both sides.
#[derive(Debug, Clone, Default)]
pub struct FieldMapCodec {
    to_wire: IndexMap<String, String>,
    from_wire: IndexMap<String, String>,
}

impl FieldMapCodec {
    pub fn new(domain_to_wire: IndexMap<String, String>) -> Self {
        let from_wire = domain_to_wire
            .iter()
            .map(|(domain, wire)| (wire.clone(), domain.clone()))
            .collect();
        Self {
            to_wire: domain_to_wire,
            from_wire,
        }
    }

    /// Name used on the wire for a domain field.
    pub fn wire_name<'a>(&'a self, domain: &'a str) -> &'a str {
        self.to_wire.get(domain).map_or(domain, String::as_str)
    }

    /// Name used in the domain for a wire field.
    pub fn domain_name<'a>(&'a self, wire: &'a str) -> &'a str {
        self.from_wire.get(wire).map_or(wire, String::as_str)
    }
}

impl EntityCodec for FieldMapCodec {
    type Entity = Entity;

    fn from_wire(&self, wire: &Value) -> Result<Entity, CoreError> {
        let Value::Object(obj) = wire else {
            return Err(CoreError::Codec {
                message: format!("expected a JSON object, got {wire}"),
            });
        };

        let id_key = self.wire_name(ID_FIELD);
        let id = match obj.get(id_key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(CoreError::Codec {
                    message: format!("record has no `{id_key}`"),
                });
            }
        };

        let mut entity = Entity::new(id);
        for (key, value) in obj {
            if key == id_key {
                continue;
            }
            entity
                .fields
                .insert(self.domain_name(key).to_owned(), FieldValue::from_json(value));
        }
        Ok(entity)
    }

    fn to_wire(&self, entity: &Entity) -> Value {
        let mut obj = Map::with_capacity(entity.fields.len() + 1);
        if !entity.id.is_empty() {
            obj.insert(
                self.wire_name(ID_FIELD).to_owned(),
                Value::String(entity.id.clone()),
            );
        }
        for (name, value) in &entity.fields {
            obj.insert(self.wire_name(name).to_owned(), value.to_json());
        }
        Value::Object(obj)
    }

    fn identity_stub(&self, id: &str) -> Entity {
        Entity::new(id)
    }
}
