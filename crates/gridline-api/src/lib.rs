//! Async HTTP client for token-authenticated CRUD endpoints.
//!
//! - [`ApiClient`]: list (`GET → {result: [...]}`) and write
//!   (`POST → {status, messages?, message?, result?}`) requests with a
//!   bearer `Authorization` header.
//! - [`AuthClient`] / [`TokenSource`]: token acquisition that always
//!   resolves, falling back to a fixed token on failure.
//! - [`TransportConfig`]: shared TLS / timeout settings.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{AuthClient, Credentials, DEFAULT_FALLBACK_TOKEN, TokenSource};
pub use client::ApiClient;
pub use error::Error;
pub use models::{ListEnvelope, STATUS_SUCCESS, WriteReply};
pub use transport::{TlsMode, TransportConfig};
