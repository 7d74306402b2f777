//! Apply: converge the inventory to a manifest and record the result.

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use dfsctl_config::Manifest;
use dfsctl_core::{
    ChangeLog, ChangeSet, CoreError, Declared, EntityRef, Executor, Inventory, Reconciler,
    StateReader, converge,
};

use crate::cli::{GlobalOpts, ManifestArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, Reconcilers, plan, util};

/// Outcome for one declared entity.
#[derive(Debug, Serialize)]
pub struct EntityReport {
    pub entity: EntityRef,
    pub changed: bool,
    /// Change log joined on one line; empty when already converged.
    pub msg: String,
    pub changes: ChangeLog,
}

impl EntityReport {
    fn new(entity: EntityRef, changes: ChangeLog) -> Self {
        Self {
            entity,
            changed: !changes.is_empty(),
            msg: changes.joined(),
            changes,
        }
    }
}

#[derive(Tabled)]
struct ApplyRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

fn converge_each<R>(
    reconciler: &R,
    declared: &[R::Desired],
    inventory: &mut Inventory,
    reports: &mut Vec<EntityReport>,
) -> Result<(), CoreError>
where
    R: Reconciler,
    Inventory: StateReader<R::Current> + Executor,
{
    for desired in declared {
        let changes = converge(reconciler, desired, inventory)?;
        reports.push(EntityReport::new(desired.entity(), changes));
    }
    Ok(())
}

fn converge_manifest(
    manifest: &Manifest,
    reconcilers: &Reconcilers,
    inventory: &mut Inventory,
    reports: &mut Vec<EntityReport>,
) -> Result<(), CoreError> {
    converge_each(&reconcilers.roots, &manifest.roots, inventory, reports)?;
    converge_each(&reconcilers.folders, &manifest.folders, inventory, reports)?;
    converge_each(
        &reconcilers.groups,
        &manifest.replication_groups,
        inventory,
        reports,
    )
}

pub fn handle(args: &ManifestArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let manifest = dfsctl_config::load_manifest(&args.manifest)?;
    let inventory_path = ctx.inventory_path(global)?;
    let mut inventory = util::load_inventory(&inventory_path)?;
    let reconcilers = ctx.reconcilers()?;

    let planned = plan::plan_manifest(&manifest, &reconcilers, &inventory)?;
    let removals = planned
        .iter()
        .flat_map(ChangeSet::iter)
        .filter(|op| op.is_destructive())
        .count();
    if removals > 0
        && !util::confirm(
            &format!("Apply {removals} removal(s) to {}?", inventory_path.display()),
            global.yes,
        )?
    {
        return Ok(());
    }

    let mut reports = Vec::with_capacity(manifest.len());
    let outcome = converge_manifest(&manifest, &reconcilers, &mut inventory, &mut reports);

    // Whatever was applied is real, failure or not.
    util::save_inventory(&inventory_path, &inventory)?;

    let out = output::render_list(
        ctx.format,
        &reports,
        |r| ApplyRow {
            entity: r.entity.to_string(),
            status: output::status_cell(r.changed, ctx.color),
            changes: output::join_cell(r.changes.entries()),
        },
        |r| {
            if r.changed {
                format!("{}: {}", r.entity, r.msg)
            } else {
                format!("{}: ok", r.entity)
            }
        },
    )?;
    output::print_output(&out, global.quiet);
    outcome?;

    let changed = reports.iter().filter(|r| r.changed).count();
    info!(changed, total = reports.len(), "apply finished");
    if !global.quiet {
        let applied: usize = reports.iter().map(|r| r.changes.len()).sum();
        eprintln!(
            "Applied {applied} change(s) to {changed} of {} entities; inventory written to {}",
            reports.len(),
            inventory_path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dfsctl_core::{Name, NamespaceFolder, NamespaceRoot, ReconcileDefaults, ReplicationGroup};

    use super::*;

    fn manifest() -> Manifest {
        Manifest {
            roots: vec![NamespaceRoot::new(r"\\corp\dfs").with_targets([r"\\fs1\dfs"])],
            folders: vec![NamespaceFolder::new(r"\\corp\dfs\data").with_targets([r"\\fs1\data"])],
            replication_groups: vec![ReplicationGroup::new("dfsr").with_members(["fs1", "fs2"])],
        }
    }

    #[test]
    fn converging_twice_reports_no_changes() {
        let reconcilers = Reconcilers::new(ReconcileDefaults::default());
        let mut inventory = Inventory::new();

        let mut first = Vec::new();
        converge_manifest(&manifest(), &reconcilers, &mut inventory, &mut first).unwrap();
        assert!(first.iter().all(|r| r.changed));

        let mut second = Vec::new();
        converge_manifest(&manifest(), &reconcilers, &mut inventory, &mut second).unwrap();
        assert_eq!(second.len(), 3);
        assert!(second.iter().all(|r| !r.changed && r.msg.is_empty()));
    }

    #[test]
    fn plan_matches_what_apply_does() {
        let reconcilers = Reconcilers::new(ReconcileDefaults::default());
        let inventory = Inventory::new();
        let planned = plan::plan_manifest(&manifest(), &reconcilers, &inventory).unwrap();
        assert!(inventory.is_empty());

        let mut applied = inventory.clone();
        let mut reports = Vec::new();
        converge_manifest(&manifest(), &reconcilers, &mut applied, &mut reports).unwrap();

        let planned_lines: Vec<String> = planned.iter().map(|c| c.describe().joined()).collect();
        let applied_lines: Vec<String> = reports.iter().map(|r| r.msg.clone()).collect();
        assert_eq!(planned_lines, applied_lines);
        assert!(applied.group(&Name::from("DFSR")).is_some());
    }

    #[test]
    fn report_carries_joined_message() {
        let log: ChangeLog = ["a", "b"].into_iter().collect();
        let report = EntityReport::new(EntityRef::Group(Name::from("dfsr")), log);
        assert!(report.changed);
        assert_eq!(report.msg, "a; b");
    }
}
