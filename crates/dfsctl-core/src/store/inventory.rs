// ── In-memory managed system ──
//
// A serializable stand-in for live DFS infrastructure. It answers state
// reads and applies primitives with the same preconditions the real
// system enforces (no duplicate targets, folders need a root, mesh
// peers must be members), so it can back the CLI and idempotence tests.

use serde::{Deserialize, Serialize};

use crate::converge::{Executor, StateReader};
use crate::error::ExecutionError;
use crate::model::{
    Availability, Connection, Name, NamespaceFolderState, NamespaceRootState, ReferralSettings,
    ReplicationGroupState, RootSettings, UncPath,
};
use crate::operation::{Attribute, EntityRef, Operation};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub roots: Vec<NamespaceRootState>,
    #[serde(default)]
    pub folders: Vec<NamespaceFolderState>,
    #[serde(default)]
    pub replication_groups: Vec<ReplicationGroupState>,
}

/// Mutable view over either namespace kind.
enum NamespaceMut<'a> {
    Root(&'a mut NamespaceRootState),
    Folder(&'a mut NamespaceFolderState),
}

impl NamespaceMut<'_> {
    fn targets(&mut self) -> &mut Vec<UncPath> {
        match self {
            Self::Root(r) => &mut r.targets,
            Self::Folder(f) => &mut f.targets,
        }
    }

    fn availability(&mut self) -> &mut Availability {
        match self {
            Self::Root(r) => &mut r.availability,
            Self::Folder(f) => &mut f.availability,
        }
    }

    fn description(&mut self) -> &mut Option<String> {
        match self {
            Self::Root(r) => &mut r.description,
            Self::Folder(f) => &mut f.description,
        }
    }

    fn referral(&mut self) -> &mut ReferralSettings {
        match self {
            Self::Root(r) => &mut r.settings.referral,
            Self::Folder(f) => &mut f.settings,
        }
    }

    fn root_settings(&mut self) -> Option<&mut RootSettings> {
        match self {
            Self::Root(r) => Some(&mut r.settings),
            Self::Folder(_) => None,
        }
    }
}

fn fail(operation: &Operation, message: impl Into<String>) -> ExecutionError {
    ExecutionError::new(operation.to_string(), message)
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.folders.is_empty() && self.replication_groups.is_empty()
    }

    pub fn root(&self, path: &UncPath) -> Option<&NamespaceRootState> {
        self.roots.iter().find(|r| r.path == *path)
    }

    pub fn folder(&self, path: &UncPath) -> Option<&NamespaceFolderState> {
        self.folders.iter().find(|f| f.path == *path)
    }

    pub fn group(&self, name: &Name) -> Option<&ReplicationGroupState> {
        self.replication_groups.iter().find(|g| g.name == *name)
    }

    fn namespace_mut(
        &mut self,
        operation: &Operation,
        entity: &EntityRef,
    ) -> Result<NamespaceMut<'_>, ExecutionError> {
        let found = match entity {
            EntityRef::Root(path) => self
                .roots
                .iter_mut()
                .find(|r| r.path == *path)
                .map(NamespaceMut::Root),
            EntityRef::Folder(path) => self
                .folders
                .iter_mut()
                .find(|f| f.path == *path)
                .map(NamespaceMut::Folder),
            EntityRef::Group(_) => {
                return Err(fail(operation, "not a namespace entity"));
            }
        };
        found.ok_or_else(|| fail(operation, format!("{entity} does not exist")))
    }

    fn group_mut(
        &mut self,
        operation: &Operation,
        name: &Name,
    ) -> Result<&mut ReplicationGroupState, ExecutionError> {
        self.replication_groups
            .iter_mut()
            .find(|g| g.name == *name)
            .ok_or_else(|| fail(operation, format!("replication group {name} does not exist")))
    }

    fn delete(&mut self, operation: &Operation, entity: &EntityRef) -> Result<(), ExecutionError> {
        let before = self.roots.len() + self.folders.len() + self.replication_groups.len();
        match entity {
            EntityRef::Root(path) => {
                self.roots.retain(|r| r.path != *path);
                // Removing a namespace removes its folders with it.
                self.folders.retain(|f| !f.path.is_descendant_of(path));
            }
            EntityRef::Folder(path) => self.folders.retain(|f| f.path != *path),
            EntityRef::Group(name) => self.replication_groups.retain(|g| g.name != *name),
        }
        let after = self.roots.len() + self.folders.len() + self.replication_groups.len();
        if before == after {
            return Err(fail(operation, format!("{entity} does not exist")));
        }
        Ok(())
    }

    fn set_attribute(
        &mut self,
        operation: &Operation,
        entity: &EntityRef,
        attribute: &Attribute,
    ) -> Result<(), ExecutionError> {
        if let EntityRef::Group(name) = entity {
            let Attribute::Description(description) = attribute else {
                return Err(fail(operation, "replication groups only support description"));
            };
            self.group_mut(operation, name)?.description = Some(description.clone());
            return Ok(());
        }

        let mut target = self.namespace_mut(operation, entity)?;
        match attribute {
            Attribute::Description(d) => *target.description() = Some(d.clone()),
            Attribute::InsiteReferrals(b) => target.referral().insite_referrals = *b,
            Attribute::TargetFailback(b) => target.referral().target_failback = *b,
            Attribute::Ttl(t) => target.referral().ttl = *t,
            Attribute::AccessBasedEnumeration(b) => {
                root_only(operation, &mut target)?.access_based_enumeration = *b;
            }
            Attribute::RootScalability(b) => {
                root_only(operation, &mut target)?.root_scalability = *b;
            }
            Attribute::SiteCosting(b) => root_only(operation, &mut target)?.site_costing = *b,
        }
        Ok(())
    }

    fn apply_namespace(&mut self, operation: &Operation) -> Result<(), ExecutionError> {
        match operation {
            Operation::CreateRoot {
                path,
                namespace_type,
                targets,
                description,
                settings,
            } => {
                if self.root(path).is_some() {
                    return Err(fail(operation, "namespace root already exists"));
                }
                self.roots.push(NamespaceRootState {
                    path: path.clone(),
                    namespace_type: *namespace_type,
                    targets: targets.clone(),
                    description: description.clone(),
                    availability: Availability::Online,
                    settings: *settings,
                });
            }
            Operation::CreateFolder {
                path,
                targets,
                description,
                settings,
            } => {
                if self.folder(path).is_some() {
                    return Err(fail(operation, "namespace folder already exists"));
                }
                if !self.roots.iter().any(|r| path.is_descendant_of(&r.path)) {
                    return Err(fail(operation, "no namespace root contains this folder"));
                }
                self.folders.push(NamespaceFolderState {
                    path: path.clone(),
                    targets: targets.clone(),
                    description: description.clone(),
                    availability: Availability::Online,
                    settings: *settings,
                });
            }
            Operation::Delete { entity } => self.delete(operation, entity)?,
            Operation::SetAvailability {
                entity,
                availability,
            } => *self.namespace_mut(operation, entity)?.availability() = *availability,
            Operation::SetAttribute { entity, attribute } => {
                self.set_attribute(operation, entity, attribute)?;
            }
            Operation::AddTarget { entity, target } => {
                let mut ns = self.namespace_mut(operation, entity)?;
                let targets = ns.targets();
                if targets.contains(target) {
                    return Err(fail(operation, "target already exists"));
                }
                targets.push(target.clone());
            }
            Operation::RemoveTarget { entity, target } => {
                let mut ns = self.namespace_mut(operation, entity)?;
                let targets = ns.targets();
                let before = targets.len();
                targets.retain(|t| t != target);
                if targets.len() == before {
                    return Err(fail(operation, "target does not exist"));
                }
            }
            _ => return Err(fail(operation, "not a namespace operation")),
        }
        Ok(())
    }

    fn apply_replication(&mut self, operation: &Operation) -> Result<(), ExecutionError> {
        match operation {
            Operation::CreateGroup {
                name,
                topology,
                description,
                staging_quota,
                conflict_and_deleted_quota,
            } => {
                if self.group(name).is_some() {
                    return Err(fail(operation, "replication group already exists"));
                }
                self.replication_groups.push(ReplicationGroupState::empty(
                    name.clone(),
                    *topology,
                    description.clone(),
                    *staging_quota,
                    *conflict_and_deleted_quota,
                ));
            }
            Operation::DeleteGroup { name } => {
                self.delete(operation, &EntityRef::Group(name.clone()))?;
            }
            Operation::AddMember {
                group,
                member,
                connect_to,
            } => {
                let state = self.group_mut(operation, group)?;
                if state.members.contains(member) {
                    return Err(fail(operation, "member already exists"));
                }
                if let Some(stranger) = connect_to.iter().find(|p| !state.members.contains(p)) {
                    return Err(fail(operation, format!("peer {stranger} is not a member")));
                }
                for peer in connect_to {
                    if !state.connections.iter().any(|c| c.links(member, peer)) {
                        state
                            .connections
                            .push(Connection::new(member.clone(), peer.clone()));
                    }
                }
                state.members.push(member.clone());
            }
            Operation::RemoveMember { group, member, .. } => {
                let state = self.group_mut(operation, group)?;
                if !state.members.contains(member) {
                    return Err(fail(operation, "member does not exist"));
                }
                state.members.retain(|m| m != member);
                state.connections.retain(|c| !c.touches(member));
            }
            Operation::AddFolder { group, folder } => {
                let state = self.group_mut(operation, group)?;
                if state.folder(&folder.name).is_some() {
                    return Err(fail(operation, "replicated folder already exists"));
                }
                state.folders.push(folder.clone());
            }
            Operation::UpdateFolder {
                group,
                folder,
                update,
            } => {
                let state = self.group_mut(operation, group)?;
                let Some(existing) = state.folders.iter_mut().find(|f| f.name == *folder) else {
                    return Err(fail(operation, "replicated folder does not exist"));
                };
                if let Some(description) = &update.description {
                    existing.description = Some(description.clone());
                }
                if let Some(globs) = &update.exclude_files {
                    existing.exclude_files = globs.clone();
                }
                if let Some(globs) = &update.exclude_dirs {
                    existing.exclude_dirs = globs.clone();
                }
            }
            Operation::SetStagingQuota { group, megabytes } => {
                self.group_mut(operation, group)?.staging_quota = *megabytes;
            }
            Operation::SetConflictQuota { group, megabytes } => {
                self.group_mut(operation, group)?.conflict_and_deleted_quota = *megabytes;
            }
            _ => return Err(fail(operation, "not a replication operation")),
        }
        Ok(())
    }
}

fn root_only<'a>(
    operation: &Operation,
    target: &'a mut NamespaceMut<'_>,
) -> Result<&'a mut RootSettings, ExecutionError> {
    target
        .root_settings()
        .ok_or_else(|| fail(operation, "attribute only applies to namespace roots"))
}

impl Executor for Inventory {
    fn apply(&mut self, operation: &Operation) -> Result<(), ExecutionError> {
        match operation {
            Operation::CreateGroup { .. }
            | Operation::DeleteGroup { .. }
            | Operation::AddMember { .. }
            | Operation::RemoveMember { .. }
            | Operation::AddFolder { .. }
            | Operation::UpdateFolder { .. }
            | Operation::SetStagingQuota { .. }
            | Operation::SetConflictQuota { .. } => self.apply_replication(operation),
            Operation::CreateRoot { .. }
            | Operation::CreateFolder { .. }
            | Operation::Delete { .. }
            | Operation::SetAvailability { .. }
            | Operation::SetAttribute { .. }
            | Operation::AddTarget { .. }
            | Operation::RemoveTarget { .. } => self.apply_namespace(operation),
        }
    }
}

impl StateReader<NamespaceRootState> for Inventory {
    fn fetch_current(
        &self,
        entity: &EntityRef,
    ) -> Result<Option<NamespaceRootState>, ExecutionError> {
        match entity {
            EntityRef::Root(path) => Ok(self.root(path).cloned()),
            other => Err(ExecutionError::new(
                format!("Read {other}"),
                "expected a namespace root",
            )),
        }
    }
}

impl StateReader<NamespaceFolderState> for Inventory {
    fn fetch_current(
        &self,
        entity: &EntityRef,
    ) -> Result<Option<NamespaceFolderState>, ExecutionError> {
        match entity {
            EntityRef::Folder(path) => Ok(self.folder(path).cloned()),
            other => Err(ExecutionError::new(
                format!("Read {other}"),
                "expected a namespace folder",
            )),
        }
    }
}

impl StateReader<ReplicationGroupState> for Inventory {
    fn fetch_current(
        &self,
        entity: &EntityRef,
    ) -> Result<Option<ReplicationGroupState>, ExecutionError> {
        match entity {
            EntityRef::Group(name) => Ok(self.group(name).cloned()),
            other => Err(ExecutionError::new(
                format!("Read {other}"),
                "expected a replication group",
            )),
        }
    }
}
