//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::{Input, Select};

use dfsctl_config::{Config, Defaults};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for the values worth changing on first run.
fn prompt_defaults() -> Result<Defaults, CliError> {
    let mut defaults = Defaults::default();

    let inventory: String = Input::new()
        .with_prompt("Inventory file (leave empty to pass --inventory each time)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    if !inventory.trim().is_empty() {
        defaults.inventory = Some(PathBuf::from(inventory.trim()));
    }

    let formats = &["table", "json", "yaml", "plain"];
    let selection = Select::new()
        .with_prompt("Default output format")
        .items(formats)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if let Some(format) = formats.get(selection) {
        defaults.output = (*format).to_owned();
    }

    Ok(defaults)
}

pub fn handle(args: &ConfigArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { force } => {
            let path = &ctx.config_path;
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists; pass --force to overwrite", path.display()),
                });
            }

            let defaults = if global.yes {
                Defaults::default()
            } else if std::io::stdin().is_terminal() {
                prompt_defaults()?
            } else {
                return Err(CliError::NonInteractiveRequiresYes {
                    action: "config init".into(),
                });
            };
            dfsctl_config::save_config_to(&Config { defaults }, path)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let detail = toml::to_string_pretty(&ctx.config)?;
            let out = output::render_single(
                ctx.format,
                &ctx.config,
                |_| detail.trim_end().to_owned(),
                |_| ctx.config_path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&ctx.config_path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
