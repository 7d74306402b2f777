//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use tracing::debug;

use dfsctl_config::{ConfigError, DocumentFormat};
use dfsctl_core::{
    ChangeSet, CoreError, Declared, Executor, Inventory, Reconciler, StateReader, apply_change_set,
    plan,
};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

// ── Inventory files ─────────────────────────────────────────────────

/// Load the inventory at `path`; a file that does not exist yet is empty.
pub fn load_inventory(path: &Path) -> Result<Inventory, CliError> {
    match dfsctl_config::load_document::<Inventory>(path) {
        Ok(inventory) => Ok(inventory),
        Err(ConfigError::NotFound { .. }) => {
            debug!(path = %path.display(), "no inventory yet, starting empty");
            Ok(Inventory::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write the inventory in the format its extension names.
pub fn save_inventory(path: &Path, inventory: &Inventory) -> Result<(), CliError> {
    let contents = match DocumentFormat::from_path(path)? {
        DocumentFormat::Json => serde_json::to_string_pretty(inventory)?,
        DocumentFormat::Yaml => serde_yaml::to_string(inventory)?,
        DocumentFormat::Toml => toml::to_string_pretty(inventory)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    debug!(path = %path.display(), "inventory written");
    Ok(())
}

// ── Simulation ──────────────────────────────────────────────────────

/// Plan each declaration against `scratch`, then apply it there so later
/// declarations see the effect (a folder planned after its new root).
pub fn simulate<R>(
    reconciler: &R,
    declared: &[R::Desired],
    scratch: &mut Inventory,
    planned: &mut Vec<ChangeSet>,
) -> Result<(), CoreError>
where
    R: Reconciler,
    Inventory: StateReader<R::Current> + Executor,
{
    for desired in declared {
        let changes = plan(reconciler, desired, &*scratch)?;
        debug!(entity = %desired.entity(), operations = changes.len(), "planned");
        apply_change_set(&changes, scratch)?;
        planned.push(changes);
    }
    Ok(())
}
