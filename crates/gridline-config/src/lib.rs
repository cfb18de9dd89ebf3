//! Shared configuration for the gridline CLI and TUI.
//!
//! TOML profiles and entity views, credential resolution (env + keyring +
//! plaintext), and translation into `gridline_core` runtime types. Both
//! binaries depend on this crate; the CLI adds flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gridline_core::{
    AuthSettings, ColumnConfig, Credentials, DEFAULT_FALLBACK_TOKEN, EntityEndpoints,
    FileColumnStore, Language, ServiceConfig, SortSpec, TlsVerification, ViewDefinition,
};

/// Keyring service name.
const KEYRING_SERVICE: &str = "gridline";

/// Env var consulted for the login password after `password_env`.
pub const PASSWORD_ENV: &str = "GRIDLINE_PASSWORD";

/// Column width used when a view column does not set one.
const DEFAULT_COLUMN_WIDTH: u32 = 150;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("view '{0}' not found")]
    UnknownView(String),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Named entity views.
    #[serde(default)]
    pub views: BTreeMap<String, View>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
            views: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }

    pub fn view(&self, name: &str) -> Result<&View, ConfigError> {
        self.views
            .get(name)
            .ok_or_else(|| ConfigError::UnknownView(name.into()))
    }

    /// Resolve a view into its runtime definition.
    pub fn view_definition(&self, name: &str) -> Result<ViewDefinition, ConfigError> {
        self.view(name)?.to_definition(name, &self.defaults)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Language of default messages and the login language tag.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            language: default_language(),
            items_per_page: default_items_per_page(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_language() -> String {
    "en".into()
}
fn default_items_per_page() -> usize {
    10
}
fn default_auth_path() -> String {
    "auth/login".into()
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "https://erp.example.com/api").
    pub base_url: String,

    /// Login endpoint, relative to `base_url` or absolute.
    #[serde(default = "default_auth_path")]
    pub auth_path: String,

    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    pub company_id: Option<String>,

    /// Overrides `defaults.language`.
    pub language: Option<String>,

    /// Token sent when login fails.
    pub fallback_token: Option<String>,

    /// Pre-issued bearer token; skips login entirely.
    pub token: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

/// A configured entity view.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct View {
    /// Entity path segment used for conventional endpoints.
    /// Defaults to the view name.
    pub entity: Option<String>,

    /// Endpoint overrides; unset ones follow `<entity>/getAll|add|update|delete`.
    pub list: Option<String>,
    pub add: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,

    #[serde(default)]
    pub searchable: Vec<String>,

    pub tree_parent: Option<String>,

    pub items_per_page: Option<usize>,

    /// `field`, `field:asc`, `field:desc` or `-field`.
    pub default_sort: Option<String>,

    /// Domain → wire field names.
    #[serde(default)]
    pub wire: IndexMap<String, String>,

    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

/// One default column of a view.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ColumnDef {
    pub id: String,
    /// Record field; defaults to `id`.
    pub field: Option<String>,
    /// Header label; defaults to `id`.
    pub name: Option<String>,
    pub width: Option<u32>,
    pub visible: Option<bool>,
    pub pinned: Option<bool>,
}

impl View {
    /// Translate into the runtime definition used by core.
    pub fn to_definition(&self, name: &str, defaults: &Defaults) -> Result<ViewDefinition, ConfigError> {
        let entity = self.entity.as_deref().unwrap_or(name);
        let conventional = EntityEndpoints::conventional(entity);
        let endpoints = EntityEndpoints {
            list: self.list.clone().unwrap_or(conventional.list),
            add: self.add.clone().unwrap_or(conventional.add),
            update: self.update.clone().unwrap_or(conventional.update),
            delete: self.delete.clone().unwrap_or(conventional.delete),
        };

        let default_sort = self.default_sort.as_deref().map(parse_sort).transpose()?;

        Ok(ViewDefinition {
            name: name.to_owned(),
            endpoints,
            wire_fields: self.wire.clone(),
            searchable: self.searchable.clone(),
            tree_parent: self.tree_parent.clone(),
            items_per_page: self.items_per_page.unwrap_or(defaults.items_per_page),
            default_sort,
            columns: self.column_configs(),
        })
    }

    /// Column layout in declaration order.
    pub fn column_configs(&self) -> Vec<ColumnConfig> {
        self.columns
            .iter()
            .zip(0u32..)
            .map(|(def, order)| ColumnConfig {
                id: def.id.clone(),
                data_field: def.field.clone().unwrap_or_else(|| def.id.clone()),
                display_name: def.name.clone().unwrap_or_else(|| def.id.clone()),
                width: def.width.unwrap_or(DEFAULT_COLUMN_WIDTH),
                visible: def.visible.unwrap_or(true),
                pinned: def.pinned.unwrap_or(false),
                original_order: order,
            })
            .collect()
    }
}

/// Parse `field`, `field:asc`, `field:desc` or `-field`.
pub fn parse_sort(raw: &str) -> Result<SortSpec, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: &str| ConfigError::Validation {
        field: "default_sort".into(),
        reason: format!("{reason}: '{raw}'"),
    };

    if let Some(field) = raw.strip_prefix('-') {
        if field.is_empty() {
            return Err(invalid("missing field name"));
        }
        return Ok(SortSpec::desc(field));
    }

    let (field, order) = raw.split_once(':').unwrap_or((raw, "asc"));
    if field.is_empty() {
        return Err(invalid("missing field name"));
    }
    let order = gridline_core::SortOrder::from_str(order).map_err(|_| invalid("order must be asc or desc"))?;
    Ok(SortSpec {
        field: field.to_owned(),
        order,
    })
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "gridline", "gridline")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gridline");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding persisted column layouts.
pub fn columns_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("columns"),
        |dirs| dirs.data_dir().join("columns"),
    )
}

/// Column layout store in the platform data directory.
pub fn column_store() -> FileColumnStore {
    FileColumnStore::new(columns_dir())
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, layered over defaults and under `GRIDLINE_` env vars.
///
/// Nested keys use a double underscore: `GRIDLINE_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GRIDLINE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve the login password: `password_env` → `GRIDLINE_PASSWORD` →
/// keyring → plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve how tokens are obtained for a profile.
///
/// A static `token` wins; otherwise `username` and a password are required.
pub fn resolve_auth(
    profile: &Profile,
    profile_name: &str,
    base_url: &url::Url,
    language: Language,
) -> Result<AuthSettings, ConfigError> {
    if let Some(ref token) = profile.token {
        return Ok(AuthSettings::Static(SecretString::from(token.clone())));
    }

    let username = profile.username.clone().ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })?;
    let password = resolve_password(profile, profile_name)?;
    let login_url = join_url(base_url, &profile.auth_path)?;

    Ok(AuthSettings::Login {
        login_url,
        credentials: Credentials {
            username,
            password,
            company_id: profile.company_id.clone().unwrap_or_default(),
            language: language.to_string(),
        },
        fallback_token: SecretString::from(
            profile
                .fallback_token
                .clone()
                .unwrap_or_else(|| DEFAULT_FALLBACK_TOKEN.to_owned()),
        ),
    })
}

fn join_url(base: &url::Url, path: &str) -> Result<url::Url, ConfigError> {
    let joined = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_owned()
    } else {
        format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };
    joined.parse().map_err(|_| ConfigError::Validation {
        field: "auth_path".into(),
        reason: format!("invalid URL: {joined}"),
    })
}

/// Parse a language tag.
pub fn parse_language(raw: &str) -> Result<Language, ConfigError> {
    Language::from_str(raw).map_err(|_| ConfigError::Validation {
        field: "language".into(),
        reason: format!("unsupported language '{raw}'"),
    })
}

/// Build a `ServiceConfig` from a profile, with no flag overrides.
pub fn profile_to_service_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ServiceConfig, ConfigError> {
    let base_url: url::Url = profile.base_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {}", profile.base_url),
    })?;

    let language = parse_language(profile.language.as_deref().unwrap_or(&defaults.language))?;
    let auth = resolve_auth(profile, profile_name, &base_url, language)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ServiceConfig {
        base_url,
        auth,
        tls,
        timeout,
        language,
    })
}
