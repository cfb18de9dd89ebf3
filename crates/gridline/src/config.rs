//! CLI configuration: thin wrapper around `gridline_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--base-url, --token, etc.).

use gridline_core::{ServiceConfig, ViewDefinition};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use gridline_config::{
    Config, Profile, column_store, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated names for "available: ..." hints.
pub fn available(names: impl Iterator<Item = impl AsRef<str>>) -> String {
    let names: Vec<String> = names.map(|n| n.as_ref().to_owned()).collect();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Apply flag overrides on top of a profile.
fn with_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if let Some(ref token) = global.token {
        profile.token = Some(token.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}

/// Build the connection settings from config, profile and CLI overrides.
///
/// Without a matching profile, `--base-url` plus `--token` are enough.
pub fn resolve_service_config(global: &GlobalOpts, cfg: &Config) -> Result<ServiceConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.base_url.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available(cfg.profiles.keys()),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let profile = with_overrides(profile, global);
    Ok(gridline_config::profile_to_service_config(
        &profile,
        &profile_name,
        &cfg.defaults,
    )?)
}

/// Look up a view and translate it into its runtime definition.
pub fn resolve_view(cfg: &Config, name: &str) -> Result<ViewDefinition, CliError> {
    if !cfg.views.contains_key(name) {
        return Err(CliError::ViewNotFound {
            name: name.into(),
            available: available(cfg.views.keys()),
            path: config_path().display().to_string(),
        });
    }
    Ok(cfg.view_definition(name)?)
}
