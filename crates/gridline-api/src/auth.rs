// Bearer token acquisition
//
// The auth endpoint exchanges username/password/company/language for a
// token. Acquisition never fails from the caller's point of view: any
// transport or parsing problem substitutes the configured fallback token.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::{LoginRequest, LoginResponse};
use crate::transport::TransportConfig;

/// Fallback token used when none is configured.
pub const DEFAULT_FALLBACK_TOKEN: &str = "gridline-fallback-token";

/// Credentials posted to the auth endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub company_id: String,
    /// Language tag forwarded to the server (e.g. `"vi"`, `"en"`).
    pub language: String,
}

/// Client for the login endpoint.
pub struct AuthClient {
    http: reqwest::Client,
    login_url: Url,
    credentials: Credentials,
    fallback_token: SecretString,
}

impl AuthClient {
    /// Create an auth client with its own `reqwest::Client`.
    pub fn new(
        login_url: Url,
        credentials: Credentials,
        fallback_token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, login_url, credentials, fallback_token))
    }

    /// Create an auth client sharing a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        login_url: Url,
        credentials: Credentials,
        fallback_token: SecretString,
    ) -> Self {
        Self {
            http,
            login_url,
            credentials,
            fallback_token,
        }
    }

    /// The login endpoint URL.
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Log in and return the issued token, surfacing every failure.
    pub async fn login(&self) -> Result<SecretString, Error> {
        debug!("logging in at {}", self.login_url);

        let body = LoginRequest {
            username: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
            company_id: &self.credentials.company_id,
            language: &self.credentials.language,
        };

        let resp = self
            .http
            .post(self.login_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let token = parsed.into_token().ok_or_else(|| Error::Authentication {
            message: "login reply carried no token".into(),
        })?;

        debug!("login successful");
        Ok(SecretString::from(token))
    }

    /// Acquire a token, substituting the fallback token on any failure.
    pub async fn token(&self) -> SecretString {
        match self.login().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "token acquisition failed, using fallback token");
                self.fallback_token.clone()
            }
        }
    }
}

/// Where bearer tokens come from.
///
/// Every variant resolves to *some* token; callers never handle an auth
/// failure path.
pub enum TokenSource {
    /// A fixed, pre-issued token.
    Static(SecretString),
    /// Log in before every request.
    Login(AuthClient),
}

impl TokenSource {
    pub async fn token(&self) -> SecretString {
        match self {
            Self::Static(token) => token.clone(),
            Self::Login(client) => client.token().await,
        }
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("TokenSource::Static(****)"),
            Self::Login(client) => write!(f, "TokenSource::Login({})", client.login_url),
        }
    }
}
