//! Plan (check mode): compute the changes a manifest would make.

use tabled::Tabled;

use dfsctl_config::Manifest;
use dfsctl_core::{ChangeSet, Inventory};

use crate::cli::{GlobalOpts, ManifestArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, Reconcilers, util};

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

fn plan_row(changes: &ChangeSet, color: bool) -> PlanRow {
    PlanRow {
        entity: changes.entity.to_string(),
        status: output::status_cell(!changes.is_empty(), color),
        changes: changes
            .iter()
            .map(|op| output::action_cell(&op.to_string(), op.is_destructive(), color))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn plain_line(changes: &ChangeSet) -> String {
    if changes.is_empty() {
        format!("{}: ok", changes.entity)
    } else {
        format!("{}: {}", changes.entity, changes.describe())
    }
}

/// Change sets for every declaration, in manifest order: roots, folders,
/// then replication groups. `inventory` is left untouched.
pub fn plan_manifest(
    manifest: &Manifest,
    reconcilers: &Reconcilers,
    inventory: &Inventory,
) -> Result<Vec<ChangeSet>, CliError> {
    let mut scratch = inventory.clone();
    let mut planned = Vec::with_capacity(manifest.len());
    util::simulate(&reconcilers.roots, &manifest.roots, &mut scratch, &mut planned)?;
    util::simulate(&reconcilers.folders, &manifest.folders, &mut scratch, &mut planned)?;
    util::simulate(
        &reconcilers.groups,
        &manifest.replication_groups,
        &mut scratch,
        &mut planned,
    )?;
    Ok(planned)
}

pub fn handle(args: &ManifestArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let manifest = dfsctl_config::load_manifest(&args.manifest)?;
    let inventory = util::load_inventory(&ctx.inventory_path(global)?)?;
    let planned = plan_manifest(&manifest, &ctx.reconcilers()?, &inventory)?;

    let out = output::render_list(
        ctx.format,
        &planned,
        |c| plan_row(c, ctx.color),
        plain_line,
    )?;
    output::print_output(&out, global.quiet);

    if !global.quiet {
        let operations: usize = planned.iter().map(ChangeSet::len).sum();
        let touched = planned.iter().filter(|c| !c.is_empty()).count();
        if operations == 0 {
            eprintln!("No changes. The inventory matches the manifest.");
        } else {
            eprintln!(
                "Plan: {operations} change(s) across {touched} of {} entities.",
                planned.len()
            );
        }
    }
    Ok(())
}
