//! Show handlers: list what the inventory records.

use tabled::Tabled;

use dfsctl_core::{NamespaceFolderState, NamespaceRootState, ReplicationGroupState};

use crate::cli::{GlobalOpts, ShowArgs, ShowCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RootRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Type")]
    namespace_type: String,
    #[tabled(rename = "State")]
    availability: String,
    #[tabled(rename = "Targets")]
    targets: String,
    #[tabled(rename = "TTL")]
    ttl: u32,
}

fn root_row(r: &NamespaceRootState) -> RootRow {
    RootRow {
        path: r.path.to_string(),
        namespace_type: r.namespace_type.to_string(),
        availability: r.availability.to_string(),
        targets: output::join_cell(&r.targets),
        ttl: r.settings.referral.ttl,
    }
}

#[derive(Tabled)]
struct FolderRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "State")]
    availability: String,
    #[tabled(rename = "Targets")]
    targets: String,
    #[tabled(rename = "TTL")]
    ttl: u32,
}

fn folder_row(f: &NamespaceFolderState) -> FolderRow {
    FolderRow {
        path: f.path.to_string(),
        availability: f.availability.to_string(),
        targets: output::join_cell(&f.targets),
        ttl: f.settings.ttl,
    }
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Members")]
    members: String,
    #[tabled(rename = "Folders")]
    folders: String,
    #[tabled(rename = "Connections")]
    connections: usize,
    #[tabled(rename = "Staging MB")]
    staging_quota: u32,
}

fn group_row(g: &ReplicationGroupState) -> GroupRow {
    GroupRow {
        name: g.name.to_string(),
        members: output::join_cell(&g.members),
        folders: g
            .folders
            .iter()
            .map(|f| format!("{} ({})", f.name, f.content_path))
            .collect::<Vec<_>>()
            .join("\n"),
        connections: g.connections.len(),
        staging_quota: g.staging_quota,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ShowArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let inventory = util::load_inventory(&ctx.inventory_path(global)?)?;

    let out = match args.command {
        ShowCommand::Roots => output::render_list(
            ctx.format,
            &inventory.roots,
            root_row,
            |r| r.path.to_string(),
        )?,
        ShowCommand::Folders => output::render_list(
            ctx.format,
            &inventory.folders,
            folder_row,
            |f| f.path.to_string(),
        )?,
        ShowCommand::ReplicationGroups => output::render_list(
            ctx.format,
            &inventory.replication_groups,
            group_row,
            |g| g.name.to_string(),
        )?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
