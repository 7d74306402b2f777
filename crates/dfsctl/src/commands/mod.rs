//! Command dispatch: bridges CLI args -> reconcilers -> output formatting.

pub mod apply;
pub mod config_cmd;
pub mod plan;
pub mod show;
pub mod unc;
pub mod util;

use std::path::PathBuf;

use clap::ValueEnum;

use dfsctl_config::Config;
use dfsctl_core::{
    NamespaceFolderReconciler, NamespaceRootReconciler, ReconcileDefaults,
    ReplicationGroupReconciler,
};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Settings and resolved global flags shared by every handler.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
    pub color: bool,
}

impl Context {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = global
            .config
            .clone()
            .unwrap_or_else(dfsctl_config::config_path);
        let config = dfsctl_config::load_config_from(&config_path)?;

        let format = match global.output {
            Some(format) => format,
            None => OutputFormat::from_str(&config.defaults.output, true).map_err(|reason| {
                CliError::Validation {
                    field: "defaults.output".into(),
                    reason,
                }
            })?,
        };

        tracing::debug!(path = %config_path.display(), ?format, "loaded settings");
        Ok(Self {
            config,
            config_path,
            format,
            color: output::should_color(global.color),
        })
    }

    pub fn reconcilers(&self) -> Result<Reconcilers, CliError> {
        let defaults = self.config.defaults.to_reconcile_defaults()?;
        Ok(Reconcilers::new(defaults))
    }

    /// `--inventory`, falling back to `defaults.inventory`.
    pub fn inventory_path(&self, global: &GlobalOpts) -> Result<PathBuf, CliError> {
        global
            .inventory
            .clone()
            .or_else(|| self.config.defaults.inventory.clone())
            .ok_or_else(|| CliError::NoInventory {
                config_path: self.config_path.display().to_string(),
            })
    }
}

/// One reconciler per entity kind, sharing the configured defaults.
pub struct Reconcilers {
    pub roots: NamespaceRootReconciler,
    pub folders: NamespaceFolderReconciler,
    pub groups: ReplicationGroupReconciler,
}

impl Reconcilers {
    pub fn new(defaults: ReconcileDefaults) -> Self {
        Self {
            roots: NamespaceRootReconciler::new(defaults),
            folders: NamespaceFolderReconciler::new(defaults),
            groups: ReplicationGroupReconciler::new(defaults),
        }
    }
}

/// Dispatch a command to the appropriate handler.
pub fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Plan(args) => plan::handle(&args, ctx, global),
        Command::Apply(args) => apply::handle(&args, ctx, global),
        Command::Show(args) => show::handle(&args, ctx, global),
        Command::Unc(args) => unc::handle(&args, ctx, global),
        Command::Config(args) => config_cmd::handle(&args, ctx, global),
        // Handled before settings are loaded
        Command::Completions(_) => Ok(()),
    }
}
