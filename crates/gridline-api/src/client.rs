// CRUD HTTP client
//
// Wraps `reqwest::Client` with base-URL-relative endpoint resolution,
// bearer authorization, and envelope decoding. Entity semantics live in
// `gridline-core`; this module only moves JSON.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ListEnvelope, WriteReply};
use crate::transport::TransportConfig;

/// Largest body excerpt kept in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for list / write endpoints.
///
/// List endpoints answer `{ result: [...] }`; write endpoints answer
/// `{ status, messages?, message?, result? }`. Both are decoded here and
/// returned without further interpretation.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root; endpoint paths are appended to it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The underlying HTTP client (shared with the auth client).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an endpoint path against the base URL.
    ///
    /// Absolute URLs are used as-is. Relative paths are appended to the
    /// base path, so `https://host/api` + `/customer/getAll` yields
    /// `https://host/api/customer/getAll`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).map_err(Error::InvalidUrl);
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a list endpoint and return the raw records.
    ///
    /// A reply without a `result` array decodes to an empty list.
    pub async fn get_list(&self, url: Url, token: &SecretString) -> Result<Vec<Value>, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        let envelope: ListEnvelope = Self::decode(resp).await?;
        let records = envelope.result.unwrap_or_default();
        trace!(count = records.len(), "list decoded");
        Ok(records)
    }

    /// POST a JSON body to a write endpoint and decode the reply.
    pub async fn post_write(
        &self,
        url: Url,
        token: &SecretString,
        body: &(impl Serialize + Sync),
    ) -> Result<WriteReply, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::decode(resp).await
    }

    /// Check the HTTP status and decode a JSON body.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
