// ── Entity CRUD service ──
//
// Uniform list / create / update / delete over one entity's endpoints.
// Only `list()` raises; every write failure is folded into a
// `MutationOutcome` carrying a message the user can read.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use gridline_api::{ApiClient, TokenSource};

use crate::codec::EntityCodec;
use crate::config::{Connection, EntityEndpoints};
use crate::error::CoreError;
use crate::locale::{Language, Operation};
use crate::model::Record;

/// Result of an add / update / delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
    /// The reply's `result` payload, when the server sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl MutationOutcome {
    pub fn succeeded(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// CRUD operations for one entity type.
pub struct EntityService<C: EntityCodec> {
    name: String,
    api: ApiClient,
    tokens: Arc<TokenSource>,
    endpoints: EntityEndpoints,
    codec: C,
    language: Language,
}

impl<C: EntityCodec> EntityService<C> {
    pub fn new(
        name: impl Into<String>,
        connection: &Connection,
        endpoints: EntityEndpoints,
        codec: C,
    ) -> Self {
        Self {
            name: name.into(),
            api: connection.api.clone(),
            tokens: Arc::clone(&connection.tokens),
            endpoints,
            codec,
            language: connection.language,
        }
    }

    /// Entity name, used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn endpoints(&self) -> &EntityEndpoints {
        &self.endpoints
    }

    pub fn language(&self) -> Language {
        self.language
    }

    // ── Read ─────────────────────────────────────────────────────────

    /// Fetch and decode the whole collection.
    ///
    /// Any failure, including a single record the codec rejects, yields
    /// `CoreError::ListFailed`. A reply without `result` is an empty list.
    pub async fn list(&self) -> Result<Vec<C::Entity>, CoreError> {
        let token = self.tokens.token().await;
        let raw = match self.fetch(&token).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(entity = %self.name, error = %e, "list request failed");
                return Err(CoreError::list_failed(&self.name, e));
            }
        };

        let records = raw
            .iter()
            .map(|wire| self.codec.from_wire(wire))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!(entity = %self.name, error = %e, "list record rejected");
                CoreError::list_failed(&self.name, e)
            })?;

        debug!(entity = %self.name, count = records.len(), "list loaded");
        Ok(records)
    }

    async fn fetch(&self, token: &SecretString) -> Result<Vec<Value>, gridline_api::Error> {
        let url = self.api.endpoint_url(&self.endpoints.list)?;
        self.api.get_list(url, token).await
    }

    // ── Write ────────────────────────────────────────────────────────

    pub async fn create(&self, entity: &C::Entity) -> MutationOutcome {
        let body = self.codec.to_wire(entity);
        self.write(Operation::Create, &self.endpoints.add, &body).await
    }

    /// Update an existing record. Fails without a request when the id is empty.
    pub async fn update(&self, entity: &C::Entity) -> MutationOutcome {
        if entity.id().trim().is_empty() {
            return MutationOutcome::failed(self.language.missing_id());
        }
        let body = self.codec.to_wire(entity);
        self.write(Operation::Update, &self.endpoints.update, &body).await
    }

    /// Delete by id. The payload is the codec's identity stub.
    pub async fn delete(&self, id: &str) -> MutationOutcome {
        if id.trim().is_empty() {
            return MutationOutcome::failed(self.language.missing_id());
        }
        let body = self.codec.to_wire(&self.codec.identity_stub(id));
        self.write(Operation::Delete, &self.endpoints.delete, &body).await
    }

    async fn write(&self, op: Operation, path: &str, body: &Value) -> MutationOutcome {
        let token = self.tokens.token().await;
        let reply = match self.api.endpoint_url(path) {
            Ok(url) => self.api.post_write(url, &token, body).await,
            Err(e) => Err(e),
        };

        match reply {
            Ok(reply) if reply.is_success() => {
                debug!(entity = %self.name, %op, "write accepted");
                let message = reply
                    .server_message()
                    .unwrap_or_else(|| self.language.success(op).to_owned());
                MutationOutcome::succeeded(message, reply.result)
            }
            Ok(reply) => {
                let message = reply
                    .server_message()
                    .unwrap_or_else(|| self.language.failure(op).to_owned());
                warn!(entity = %self.name, %op, status = ?reply.status, %message, "write rejected");
                MutationOutcome::failed(message)
            }
            Err(e) => {
                warn!(entity = %self.name, %op, error = %e, "write failed");
                MutationOutcome::failed(self.language.failure(op))
            }
        }
    }
}

impl<C: EntityCodec> std::fmt::Debug for EntityService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("name", &self.name)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
