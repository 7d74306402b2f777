//! Clap derive structures for the `dfsctl` CLI.
//!
//! Kept free of crate-internal types so `build.rs` can include it to
//! render man pages and completions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dfsctl -- declarative convergence for DFS namespaces and replication
#[derive(Debug, Parser)]
#[command(
    name = "dfsctl",
    version,
    about = "Converge DFS namespaces and replication groups to a declared state",
    long_about = "Reads a manifest describing namespace roots, namespace folders and\n\
        replication groups, compares it with the recorded inventory and applies\n\
        the minimal set of changes. Running it twice changes nothing the second time.",
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
    /// Settings file (defaults to the platform config directory)
    #[arg(long, env = "DFSCTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Inventory state file (.json, .yaml or .toml)
    #[arg(long, short = 'i', env = "DFSCTL_INVENTORY", global = true)]
    pub inventory: Option<PathBuf>,

    /// Output format (defaults to `defaults.output` from settings)
    #[arg(long, short = 'o', env = "DFSCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the changes a manifest would make, without applying them
    #[command(alias = "check")]
    Plan(ManifestArgs),

    /// Converge the inventory to a manifest
    Apply(ManifestArgs),

    /// Show what the inventory currently records
    #[command(alias = "get")]
    Show(ShowArgs),

    /// Build a UNC path from its components
    Unc(UncArgs),

    /// Manage dfsctl settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Plan / Apply ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Manifest describing the desired state (.toml, .yaml or .json)
    pub manifest: PathBuf,
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(subcommand)]
    pub command: ShowCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShowCommand {
    /// Namespace roots
    Roots,
    /// Namespace folders
    Folders,
    /// Replication groups
    #[command(alias = "groups")]
    ReplicationGroups,
}

// ── Unc ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UncArgs {
    /// Path components, e.g. `corp dfs data` for \\corp\dfs\data
    #[arg(required = true, num_args = 1..)]
    pub parts: Vec<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a settings file (interactive unless --yes)
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective settings
    Show,

    /// Print the settings file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
