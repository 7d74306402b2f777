// ── Primitive operations ──
//
// Everything a reconciler can ask an executor to do. Operations carry
// the identity of the entity they touch so an executor can apply them
// without any other context, and `Display` renders the change-log line.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changelog::ChangeLog;
use crate::model::{
    Availability, GlobList, Name, NamespaceType, ReferralSettings, ReplicatedFolderState,
    RootSettings, Topology, UncPath,
};

// ── Entity reference ────────────────────────────────────────────────

/// Identity of a managed entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum EntityRef {
    Root(UncPath),
    Folder(UncPath),
    Group(Name),
}

impl EntityRef {
    pub fn key(&self) -> &str {
        match self {
            Self::Root(p) | Self::Folder(p) => p.as_str(),
            Self::Group(n) => n.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Root(_) => "namespace root",
            Self::Folder(_) => "namespace folder",
            Self::Group(_) => "replication group",
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.key())
    }
}

// ── Attributes ──────────────────────────────────────────────────────

/// A scalar attribute set in place on an existing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    Description(String),
    InsiteReferrals(bool),
    TargetFailback(bool),
    Ttl(u32),
    AccessBasedEnumeration(bool),
    RootScalability(bool),
    SiteCosting(bool),
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Description(_) => "description",
            Self::InsiteReferrals(_) => "insite_referrals",
            Self::TargetFailback(_) => "target_failback",
            Self::Ttl(_) => "ttl",
            Self::AccessBasedEnumeration(_) => "access_based_enumeration",
            Self::RootScalability(_) => "root_scalability",
            Self::SiteCosting(_) => "site_costing",
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Description(d) => format!("\"{d}\""),
            Self::Ttl(t) => format!("{t}s"),
            Self::InsiteReferrals(b)
            | Self::TargetFailback(b)
            | Self::AccessBasedEnumeration(b)
            | Self::RootScalability(b)
            | Self::SiteCosting(b) => b.to_string(),
        }
    }
}

// ── Folder update ───────────────────────────────────────────────────

/// Changed settings of an existing replicated folder. `None` = unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_files: Option<GlobList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_dirs: Option<GlobList>,
}

impl FolderUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.exclude_files.is_none() && self.exclude_dirs.is_none()
    }

    fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.description.is_some() {
            fields.push("description");
        }
        if self.exclude_files.is_some() {
            fields.push("exclude_files");
        }
        if self.exclude_dirs.is_some() {
            fields.push("exclude_dirs");
        }
        fields
    }
}

// ── Operation ───────────────────────────────────────────────────────

/// One primitive change against the managed system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    // ── Namespace operations ─────────────────────────────────────────
    CreateRoot {
        path: UncPath,
        namespace_type: NamespaceType,
        targets: Vec<UncPath>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        settings: RootSettings,
    },
    CreateFolder {
        path: UncPath,
        targets: Vec<UncPath>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        settings: ReferralSettings,
    },
    Delete {
        entity: EntityRef,
    },
    SetAvailability {
        entity: EntityRef,
        availability: Availability,
    },
    SetAttribute {
        entity: EntityRef,
        attribute: Attribute,
    },
    AddTarget {
        entity: EntityRef,
        target: UncPath,
    },
    RemoveTarget {
        entity: EntityRef,
        target: UncPath,
    },

    // ── Replication operations ───────────────────────────────────────
    CreateGroup {
        name: Name,
        topology: Topology,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        staging_quota: u32,
        conflict_and_deleted_quota: u32,
    },
    DeleteGroup {
        name: Name,
    },
    /// Adds `member` and one connection to each member in `connect_to`.
    AddMember {
        group: Name,
        member: Name,
        connect_to: Vec<Name>,
    },
    /// Removes `member` and its connections to each member in `disconnect_from`.
    RemoveMember {
        group: Name,
        member: Name,
        disconnect_from: Vec<Name>,
    },
    AddFolder {
        group: Name,
        folder: ReplicatedFolderState,
    },
    UpdateFolder {
        group: Name,
        folder: Name,
        update: FolderUpdate,
    },
    SetStagingQuota {
        group: Name,
        megabytes: u32,
    },
    SetConflictQuota {
        group: Name,
        megabytes: u32,
    },
}

impl Operation {
    /// The entity this operation changes.
    pub fn entity(&self) -> EntityRef {
        match self {
            Self::CreateRoot { path, .. } => EntityRef::Root(path.clone()),
            Self::CreateFolder { path, .. } => EntityRef::Folder(path.clone()),
            Self::Delete { entity }
            | Self::SetAvailability { entity, .. }
            | Self::SetAttribute { entity, .. }
            | Self::AddTarget { entity, .. }
            | Self::RemoveTarget { entity, .. } => entity.clone(),
            Self::CreateGroup { name, .. } | Self::DeleteGroup { name } => {
                EntityRef::Group(name.clone())
            }
            Self::AddMember { group, .. }
            | Self::RemoveMember { group, .. }
            | Self::AddFolder { group, .. }
            | Self::UpdateFolder { group, .. }
            | Self::SetStagingQuota { group, .. }
            | Self::SetConflictQuota { group, .. } => EntityRef::Group(group.clone()),
        }
    }

    /// Short verb used in tabular output.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::CreateRoot { .. } | Self::CreateFolder { .. } | Self::CreateGroup { .. } => {
                "create"
            }
            Self::Delete { .. } | Self::DeleteGroup { .. } => "delete",
            Self::SetAvailability { .. } => "set-availability",
            Self::SetAttribute { .. } => "set-attribute",
            Self::AddTarget { .. } => "add-target",
            Self::RemoveTarget { .. } => "remove-target",
            Self::AddMember { .. } => "add-member",
            Self::RemoveMember { .. } => "remove-member",
            Self::AddFolder { .. } => "add-folder",
            Self::UpdateFolder { .. } => "update-folder",
            Self::SetStagingQuota { .. } => "set-staging-quota",
            Self::SetConflictQuota { .. } => "set-conflict-quota",
        }
    }

    /// Whether applying this removes something from the managed system.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::Delete { .. }
                | Self::DeleteGroup { .. }
                | Self::RemoveTarget { .. }
                | Self::RemoveMember { .. }
        )
    }
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateRoot {
                path,
                namespace_type,
                targets,
                ..
            } => write!(
                f,
                "Created namespace root {path} ({namespace_type}) with targets {}",
                join_display(targets)
            ),
            Self::CreateFolder { path, targets, .. } => write!(
                f,
                "Created namespace folder {path} with targets {}",
                join_display(targets)
            ),
            Self::Delete { entity } => write!(f, "Removed {entity}"),
            Self::SetAvailability {
                entity,
                availability,
            } => write!(f, "Set {entity} {availability}"),
            Self::SetAttribute { entity, attribute } => write!(
                f,
                "Set {} of {entity} to {}",
                attribute.name(),
                attribute.value()
            ),
            Self::AddTarget { entity, target } => write!(f, "Added target {target} to {entity}"),
            Self::RemoveTarget { entity, target } => {
                write!(f, "Removed target {target} from {entity}")
            }
            Self::CreateGroup { name, topology, .. } => {
                write!(f, "Created replication group {name} ({topology})")
            }
            Self::DeleteGroup { name } => write!(f, "Removed replication group {name}"),
            Self::AddMember {
                group,
                member,
                connect_to,
            } => {
                write!(f, "Added member {member} to replication group {group}")?;
                if !connect_to.is_empty() {
                    write!(f, " connected to {}", join_display(connect_to))?;
                }
                Ok(())
            }
            Self::RemoveMember {
                group,
                member,
                disconnect_from,
            } => {
                write!(f, "Removed member {member} from replication group {group}")?;
                if !disconnect_from.is_empty() {
                    write!(f, " disconnected from {}", join_display(disconnect_from))?;
                }
                Ok(())
            }
            Self::AddFolder { group, folder } => write!(
                f,
                "Added folder {} ({}) to replication group {group}",
                folder.name, folder.content_path
            ),
            Self::UpdateFolder {
                group,
                folder,
                update,
            } => write!(
                f,
                "Updated {} of folder {folder} in replication group {group}",
                update.fields().join(", ")
            ),
            Self::SetStagingQuota { group, megabytes } => write!(
                f,
                "Set staging quota of replication group {group} to {megabytes} MB"
            ),
            Self::SetConflictQuota { group, megabytes } => write!(
                f,
                "Set conflict and deleted quota of replication group {group} to {megabytes} MB"
            ),
        }
    }
}

// ── Change set ──────────────────────────────────────────────────────

/// Ordered operations that converge one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub entity: EntityRef,
    pub operations: Vec<Operation>,
}

impl ChangeSet {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            operations: Vec::new(),
        }
    }

    pub fn push(&mut self, operation: Operation) {
        tracing::trace!(entity = %self.entity, op = operation.verb(), "planned operation");
        self.operations.push(operation);
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// The change log this set would produce if fully applied.
    pub fn describe(&self) -> ChangeLog {
        self.operations.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
