// ── Runtime configuration ──
//
// These types describe how to reach the CRUD backend and what each
// entity view looks like. They carry credentials and tuning but never
// touch disk: the CLI/TUI builds them from `gridline-config` and hands
// them in.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use url::Url;

use gridline_api::{ApiClient, AuthClient, Credentials, TlsMode, TokenSource, TransportConfig};

use crate::codec::FieldMapCodec;
use crate::error::CoreError;
use crate::locale::Language;
use crate::model::ColumnConfig;
use crate::table::SortSpec;

/// How bearer tokens are obtained.
#[derive(Debug, Clone)]
pub enum AuthSettings {
    /// A pre-issued token, sent as-is.
    Static(SecretString),
    /// Log in at `login_url` before each request.
    Login {
        login_url: Url,
        credentials: Credentials,
        fallback_token: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    #[default]
    SystemDefaults,
    CustomCa(std::path::PathBuf),
    DangerAcceptInvalid,
}

/// Connection settings shared by every view of one profile.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// API root; view endpoint paths are resolved against it.
    pub base_url: Url,
    pub auth: AuthSettings,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Language of default mutation messages.
    pub language: Language,
}

impl ServiceConfig {
    fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client and token source. No request is made.
    pub fn connect(&self) -> Result<Connection, CoreError> {
        let http = self.transport().build_client()?;
        let api = ApiClient::with_client(http.clone(), self.base_url.clone());
        let tokens = match &self.auth {
            AuthSettings::Static(token) => TokenSource::Static(token.clone()),
            AuthSettings::Login {
                login_url,
                credentials,
                fallback_token,
            } => TokenSource::Login(AuthClient::with_client(
                http,
                login_url.clone(),
                credentials.clone(),
                fallback_token.clone(),
            )),
        };
        Ok(Connection {
            api,
            tokens: Arc::new(tokens),
            language: self.language,
        })
    }
}

/// A ready HTTP client plus token source, shared by services.
#[derive(Debug, Clone)]
pub struct Connection {
    pub api: ApiClient,
    pub tokens: Arc<TokenSource>,
    pub language: Language,
}

/// Endpoint paths of one entity view, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEndpoints {
    pub list: String,
    pub add: String,
    pub update: String,
    pub delete: String,
}

impl EntityEndpoints {
    /// Conventional `<entity>/getAll|add|update|delete` paths.
    pub fn conventional(entity: &str) -> Self {
        Self {
            list: format!("{entity}/getAll"),
            add: format!("{entity}/add"),
            update: format!("{entity}/update"),
            delete: format!("{entity}/delete"),
        }
    }
}

/// Everything needed to show and manage one entity type.
#[derive(Debug, Clone)]
pub struct ViewDefinition {
    pub name: String,
    pub endpoints: EntityEndpoints,
    /// Domain → wire field-name map.
    pub wire_fields: IndexMap<String, String>,
    /// Fields the search term is matched against.
    pub searchable: Vec<String>,
    /// Field holding the parent id, when the view is a tree.
    pub tree_parent: Option<String>,
    pub items_per_page: usize,
    pub default_sort: Option<SortSpec>,
    /// Column layout used when nothing has been persisted.
    pub columns: Vec<ColumnConfig>,
}

impl ViewDefinition {
    pub fn codec(&self) -> FieldMapCodec {
        FieldMapCodec::new(self.wire_fields.clone())
    }

    /// Key under which the column layout is persisted.
    pub fn column_key(&self) -> String {
        format!("columns.{}", self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn conventional_endpoints() {
        let ep = EntityEndpoints::conventional("customer");
        assert_eq!(ep.list, "customer/getAll");
        assert_eq!(ep.delete, "customer/delete");
    }

    #[test]
    fn static_auth_connects_without_requests() {
        let cfg = ServiceConfig {
            base_url: Url::parse("http://localhost:9/api").unwrap(),
            auth: AuthSettings::Static(SecretString::from("t")),
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(5),
            language: Language::Vi,
        };
        let conn = cfg.connect();
        assert!(conn.is_ok_and(|c| c.language == Language::Vi));
    }
}
