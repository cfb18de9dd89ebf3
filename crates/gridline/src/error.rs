//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gridline_config::ConfigError;
use gridline_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(gridline::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(gridline::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(gridline::no_credentials),
        help(
            "Set username and password with: gridline config init\n\
             Or pass a token with --token / GRIDLINE_TOKEN."
        )
    )]
    NoCredentials { profile: String },

    // ── Records ──────────────────────────────────────────────────────
    #[error("{entity} '{identifier}' not found")]
    #[diagnostic(
        code(gridline::not_found),
        help("Run: gridline list {entity} to see available records")
    )]
    NotFound { entity: String, identifier: String },

    #[error("{message}")]
    #[diagnostic(code(gridline::load_failed))]
    LoadFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(gridline::rejected))]
    Rejected { message: String },

    #[error("{failed} of {total} records failed")]
    #[diagnostic(code(gridline::partial_failure))]
    PartialFailure { failed: usize, total: usize },

    #[error("API error: {message}")]
    #[diagnostic(code(gridline::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gridline::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(gridline::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: gridline config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("View '{name}' not found in configuration")]
    #[diagnostic(
        code(gridline::view_not_found),
        help(
            "Available views: {available}\n\
             Declare one under [views.<name>] in {path}"
        )
    )]
    ViewNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(gridline::no_config),
        help(
            "Create one with: gridline config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(gridline::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(gridline::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(gridline::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    #[diagnostic(code(gridline::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ViewNotFound { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Rejected { .. } | Self::PartialFailure { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotFound { entity, identifier } => Self::NotFound { entity, identifier },
            err @ CoreError::ListFailed { .. } => Self::LoadFailed {
                message: err.to_string(),
            },
            CoreError::Validation { message } | CoreError::Codec { message } => Self::Validation {
                field: "record".into(),
                reason: message,
            },
            CoreError::Config { message } | CoreError::Persistence { message } => {
                Self::Config { message }
            }
            CoreError::Api { message, .. } => Self::Api { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
