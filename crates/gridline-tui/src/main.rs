//! `gridline-tui`: interactive terminal browser for configured entity views.
//!
//! Every `[views.<name>]` table in the config file becomes a tab backed by
//! its own [`DynamicController`](gridline_core::DynamicController). Tabs
//! are switched with number keys (1-9) or Tab / Shift+Tab.
//!
//! Logs are written to a file (default `/tmp/gridline-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gridline_core::{ColumnStore, DynamicController, DynamicService};

use crate::app::{App, ViewHandle};

/// Browse, search and edit entity tables from the terminal.
#[derive(Parser, Debug)]
#[command(name = "gridline-tui", version, about)]
struct Cli {
    /// Backend profile to use
    #[arg(short, long, env = "GRIDLINE_PROFILE")]
    profile: Option<String>,

    /// View to open first
    #[arg(long)]
    view: Option<String>,

    /// Log file path (defaults to /tmp/gridline-tui.log)
    #[arg(long, default_value = "/tmp/gridline-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// terminal is in raw mode. The returned guard must live until exit so
/// buffered logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("gridline_tui={log_level},gridline_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("gridline-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the profile and build one controller per configured view.
fn build_views(cli: &Cli) -> Result<(String, Vec<ViewHandle>)> {
    let cfg = gridline_config::load_config()?;

    let profile_name = cli
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    let profile = cfg
        .profile(&profile_name)
        .map_err(|_| eyre!("profile '{profile_name}' not found; run `gridline config init`"))?;

    let service_config =
        gridline_config::profile_to_service_config(profile, &profile_name, &cfg.defaults)?;
    let conn = service_config.connect()?;

    let mut views = Vec::with_capacity(cfg.views.len());
    for name in cfg.views.keys() {
        let definition = cfg.view_definition(name)?;
        let service = DynamicService::new(
            definition.name.clone(),
            &conn,
            definition.endpoints.clone(),
            definition.codec(),
        );
        views.push(ViewHandle {
            definition,
            controller: DynamicController::new(service),
        });
    }

    if views.is_empty() {
        return Err(eyre!("no views configured; add a [views.<name>] table to the config file"));
    }

    Ok((profile_name, views))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let (profile, views) = build_views(&cli)?;
    info!(profile = %profile, views = views.len(), "starting gridline-tui");

    let store: Arc<dyn ColumnStore> = Arc::new(gridline_config::column_store());
    let mut app = App::new(views, &store, profile);
    if let Some(ref name) = cli.view {
        if !app.start_on(name) {
            warn!(view = %name, "unknown view requested, opening the first one");
        }
    }

    app.run().await?;

    Ok(())
}
