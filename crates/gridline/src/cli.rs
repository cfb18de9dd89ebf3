//! Clap derive structures for the `gridline` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gridline -- browse and edit CRUD entity tables from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "gridline",
    version,
    about = "Browse and edit entity tables of a CRUD backend",
    long_about = "Search, sort, page and edit the entity collections of a\n\
        token-authenticated CRUD backend. Views are declared in the config\n\
        file: endpoints, searchable fields, tree parent and default columns.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "GRIDLINE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 'u', env = "GRIDLINE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Pre-issued bearer token (skips login)
    #[arg(long, env = "GRIDLINE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GRIDLINE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GRIDLINE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "GRIDLINE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// File format for `export`.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List configured views
    Views,

    /// Show one page of a view
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a single record
    Get(GetArgs),

    /// Create a record
    Add(AddArgs),

    /// Update a record
    Edit(EditArgs),

    /// Delete one or more records
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Export the filtered, sorted records of a view
    Export(ExportArgs),

    /// Create every record of a JSON file
    Import(ImportArgs),

    /// Inspect or change the column layout of a view
    Columns(ColumnsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Query Arguments ───────────────────────────────────────────

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Case-insensitive substring matched against the searchable fields
    #[arg(long, short = 'S')]
    pub search: Option<String>,

    /// Sort by this field (overrides the view's default sort)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

// ── Record Commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// View name
    pub view: String,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page (overrides the view)
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Expand these tree nodes
    #[arg(long, value_name = "ID")]
    pub expand: Vec<String>,

    /// Expand every tree node
    #[arg(long, conflicts_with = "expand")]
    pub expand_all: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// View name
    pub view: String,

    /// Record id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// View name
    pub view: String,

    /// Field assignment (repeatable)
    #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Read the record from a JSON object file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// View name
    pub view: String,

    /// Record id
    pub id: String,

    /// Field assignment (repeatable)
    #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Read field values from a JSON object file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// View name
    pub view: String,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// View name
    pub view: String,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Write to this file instead of stdout
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// File format
    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// View name
    pub view: String,

    /// JSON file holding an array of records
    #[arg(long, short = 'f')]
    pub file: PathBuf,
}

// ── Columns ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// View name
    pub view: String,

    #[command(subcommand)]
    pub command: ColumnsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ColumnsCommand {
    /// Show the current column layout
    Show,

    /// Change one column
    Set {
        /// Column id
        column: String,

        /// Show or hide the column
        #[arg(long)]
        visible: Option<bool>,

        /// Pin the column to the left edge
        #[arg(long)]
        pinned: Option<bool>,

        /// Column width
        #[arg(long)]
        width: Option<u32>,

        /// Header label
        #[arg(long)]
        name: Option<String>,

        /// Position among unpinned columns
        #[arg(long)]
        order: Option<u32>,
    },

    /// Restore the view's default columns
    Reset,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Show current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// List profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
