//! Config subcommand handlers.

use dialoguer::{Input, Select};

use gridline_core::Language;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "language = \"{}\"", cfg.defaults.language);
    let _ = writeln!(out, "items_per_page = {}", cfg.defaults.items_per_page);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "base_url = \"{}\"", p.base_url);
        let _ = writeln!(out, "auth_path = \"{}\"", p.auth_path);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref c) = p.company_id {
            let _ = writeln!(out, "company_id = \"{c}\"");
        }
        if let Some(ref l) = p.language {
            let _ = writeln!(out, "language = \"{l}\"");
        }
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if p.fallback_token.is_some() {
            let _ = writeln!(out, "fallback_token = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    for (name, v) in &cfg.views {
        let _ = writeln!(out);
        let _ = writeln!(out, "[views.{name}]");
        if let Some(ref entity) = v.entity {
            let _ = writeln!(out, "entity = \"{entity}\"");
        }
        if !v.searchable.is_empty() {
            let _ = writeln!(out, "searchable = {:?}", v.searchable);
        }
        if let Some(ref parent) = v.tree_parent {
            let _ = writeln!(out, "tree_parent = \"{parent}\"");
        }
        if let Some(ref sort) = v.default_sort {
            let _ = writeln!(out, "default_sort = \"{sort}\"");
        }
        let _ = writeln!(out, "# {} columns", v.columns.len());
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available(cfg.profiles.keys()),
    }
}

/// Offer to store the password in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_password_storage(password: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        gridline_config::store_password(profile_name, password)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: gridline config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            gridline_config::store_password(&profile_name, &secret)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Interactive wizard writing a first profile.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("✨ gridline configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let base_url: String = Input::new()
        .with_prompt("API base URL")
        .default("https://localhost/api".into())
        .interact_text()
        .map_err(prompt_err)?;
    url::Url::parse(&base_url).map_err(|e| CliError::Validation {
        field: "base_url".into(),
        reason: e.to_string(),
    })?;

    let languages = [Language::En, Language::Vi];
    let lang_idx = Select::new()
        .with_prompt("Message language")
        .items(&languages)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let language = languages.get(lang_idx).copied().unwrap_or_default();

    let auth_choices = &["Username/Password login", "Pre-issued token"];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        base_url,
        auth_path: "auth/login".into(),
        language: Some(language.to_string()),
        ..Profile::default()
    };

    if auth_selection == 0 {
        let username: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?;
        let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
        if username.is_empty() || password.is_empty() {
            return Err(CliError::Validation {
                field: "credentials".into(),
                reason: "username and password cannot be empty".into(),
            });
        }
        let company_id: String = Input::new()
            .with_prompt("Company ID")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)?;

        profile.username = Some(username);
        profile.password = prompt_password_storage(&password, &profile_name)?;
        profile.company_id = Some(company_id).filter(|c| !c.is_empty());
    } else {
        let token = rpassword::prompt_password("Token: ").map_err(prompt_err)?;
        if token.is_empty() {
            return Err(CliError::Validation {
                field: "token".into(),
                reason: "token cannot be empty".into(),
            });
        }
        profile.token = Some(token);
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: declare a [views.<name>] table, then run: gridline list <name>");
    Ok(())
}
