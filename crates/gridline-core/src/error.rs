// ── Core error types ──
//
// Consumers never see HTTP status codes or JSON parse failures directly.
// `From<gridline_api::Error>` translates transport-layer errors into
// domain variants. Write operations do not raise at all: their failures
// are folded into `MutationOutcome`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── List retrieval ───────────────────────────────────────────────
    /// The only error `EntityService::list` raises.
    #[error("Failed to load {entity}: {reason}")]
    ListFailed { entity: String, reason: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Codec error: {message}")]
    Codec { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Column layout storage failed: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Wrap any error as a `ListFailed` for the named entity.
    pub fn list_failed(entity: &str, err: impl std::fmt::Display) -> Self {
        Self::ListFailed {
            entity: entity.to_owned(),
            reason: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gridline_api::Error> for CoreError {
    fn from(err: gridline_api::Error) -> Self {
        match err {
            gridline_api::Error::Authentication { message } => CoreError::Api {
                message: format!("authentication failed: {message}"),
                status: Some(401),
            },
            gridline_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e.url().map(ToString::to_string).unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            gridline_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            gridline_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            gridline_api::Error::Http { status: 404, body } => CoreError::NotFound {
                entity: "resource".into(),
                identifier: body,
            },
            gridline_api::Error::Http { status, body } => CoreError::Api {
                message: body,
                status: Some(status),
            },
            gridline_api::Error::Deserialization { message, body: _ } => CoreError::Codec {
                message: format!("Deserialization error: {message}"),
            },
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Codec {
            message: err.to_string(),
        }
    }
}
