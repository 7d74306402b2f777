use std::collections::HashMap;

use tracing::{debug, warn};

use super::{Declared, ReconcileDefaults, Reconciler, description_change};
use crate::diff;
use crate::error::CoreError;
use crate::lifecycle::{LifecycleStateMachine, Observed, Transition};
use crate::model::{
    GroupState, Name, ReplicatedFolder, ReplicatedFolderState, ReplicationGroup,
    ReplicationGroupState,
};
use crate::operation::{ChangeSet, EntityRef, FolderUpdate, Operation};

/// Reconciles a replication group: members (pruned), folders (additive
/// only), description and quotas.
#[derive(Debug, Clone, Default)]
pub struct ReplicationGroupReconciler {
    defaults: ReconcileDefaults,
}

impl ReplicationGroupReconciler {
    pub fn new(defaults: ReconcileDefaults) -> Self {
        Self { defaults }
    }

    fn validate(entity: &EntityRef, desired: &ReplicationGroup) -> Result<(), CoreError> {
        if desired.name.is_blank() {
            return Err(CoreError::validation(entity, "name must not be empty"));
        }
        if desired.state == GroupState::Absent {
            return Ok(());
        }
        if desired.staging_quota == Some(0) || desired.conflict_and_deleted_quota == Some(0) {
            return Err(CoreError::validation(entity, "quotas must be positive"));
        }
        if let Some(members) = &desired.members {
            if members.iter().any(Name::is_blank) {
                return Err(CoreError::validation(entity, "member names must not be empty"));
            }
        }

        let mut content_paths: HashMap<&Name, &str> = HashMap::new();
        for folder in &desired.folders {
            if folder.name.is_blank() {
                return Err(CoreError::validation(entity, "folder names must not be empty"));
            }
            let Some(path) = folder.content_path.as_deref().filter(|p| !p.trim().is_empty())
            else {
                return Err(CoreError::validation(
                    entity,
                    format!("folder '{}' requires content_path", folder.name),
                ));
            };
            match content_paths.get(&folder.name) {
                Some(seen) if !same_local_path(seen, path) => {
                    return Err(CoreError::validation(
                        entity,
                        format!(
                            "folder '{}' declared with conflicting content paths '{seen}' and '{path}'",
                            folder.name
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    content_paths.insert(&folder.name, path);
                }
            }
        }
        Ok(())
    }
}

fn same_local_path(a: &str, b: &str) -> bool {
    a.trim_end_matches('\\')
        .eq_ignore_ascii_case(b.trim_end_matches('\\'))
}

/// First declaration wins; later duplicates were validated identical.
fn unique_folders(folders: &[ReplicatedFolder]) -> Vec<&ReplicatedFolder> {
    let mut unique: Vec<&ReplicatedFolder> = Vec::with_capacity(folders.len());
    for folder in folders {
        if !unique.iter().any(|f| f.name == folder.name) {
            unique.push(folder);
        }
    }
    unique
}

fn folder_update(desired: &ReplicatedFolder, current: &ReplicatedFolderState) -> FolderUpdate {
    FolderUpdate {
        description: desired
            .description
            .as_ref()
            .filter(|d| d.as_str() != current.description.as_deref().unwrap_or_default())
            .cloned(),
        exclude_files: desired
            .exclude_files
            .as_ref()
            .filter(|g| **g != current.exclude_files)
            .cloned(),
        exclude_dirs: desired
            .exclude_dirs
            .as_ref()
            .filter(|g| **g != current.exclude_dirs)
            .cloned(),
    }
}

impl Reconciler for ReplicationGroupReconciler {
    type Desired = ReplicationGroup;
    type Current = ReplicationGroupState;

    fn reconcile(
        &self,
        desired: &ReplicationGroup,
        current: Option<&ReplicationGroupState>,
    ) -> Result<ChangeSet, CoreError> {
        let entity = desired.entity();
        Self::validate(&entity, desired)?;

        let group = desired.name.clone();
        let mut changes = ChangeSet::new(entity);
        let staging_quota = desired.staging_quota.unwrap_or(self.defaults.staging_quota_mb);
        let conflict_quota = desired
            .conflict_and_deleted_quota
            .unwrap_or(self.defaults.conflict_quota_mb);
        let observed = current.map_or(Observed::Missing, |_| Observed::Exists(None));

        let created;
        let baseline = match (
            LifecycleStateMachine::transition(desired.state.into(), observed),
            current,
        ) {
            (Transition::Destroy, _) => {
                changes.push(Operation::DeleteGroup { name: group });
                return Ok(changes);
            }
            (Transition::Create { .. }, _) => {
                changes.push(Operation::CreateGroup {
                    name: group.clone(),
                    topology: desired.topology,
                    description: desired.description.clone(),
                    staging_quota,
                    conflict_and_deleted_quota: conflict_quota,
                });
                created = ReplicationGroupState::empty(
                    group.clone(),
                    desired.topology,
                    desired.description.clone(),
                    staging_quota,
                    conflict_quota,
                );
                &created
            }
            (_, Some(current)) => current,
            (_, None) => return Ok(changes),
        };

        // ── Scalar attributes ──
        if let Some(attribute) = description_change(
            desired.description.as_deref(),
            baseline.description.as_deref(),
        ) {
            changes.push(Operation::SetAttribute {
                entity: changes.entity.clone(),
                attribute,
            });
        }
        if staging_quota != baseline.staging_quota {
            changes.push(Operation::SetStagingQuota {
                group: group.clone(),
                megabytes: staging_quota,
            });
        }
        if conflict_quota != baseline.conflict_and_deleted_quota {
            changes.push(Operation::SetConflictQuota {
                group: group.clone(),
                megabytes: conflict_quota,
            });
        }

        // ── Members ──
        if let Some(members) = &desired.members {
            let delta = diff::diff(members.iter().cloned(), baseline.members.iter().cloned())
                .with_policy(ReplicationGroup::MEMBERS_POLICY);
            let mut roster = baseline.members.clone();

            for member in delta.to_remove {
                roster.retain(|m| *m != member);
                let disconnect_from = desired
                    .topology
                    .peers_for(&member, &roster)
                    .into_iter()
                    .cloned()
                    .collect();
                changes.push(Operation::RemoveMember {
                    group: group.clone(),
                    member,
                    disconnect_from,
                });
            }
            for member in delta.to_add {
                let connect_to = desired
                    .topology
                    .peers_for(&member, &roster)
                    .into_iter()
                    .cloned()
                    .collect();
                roster.push(member.clone());
                changes.push(Operation::AddMember {
                    group: group.clone(),
                    member,
                    connect_to,
                });
            }
        }

        // ── Folders ──
        let declared = unique_folders(&desired.folders);
        let delta = diff::diff(
            declared.iter().map(|f| f.name.clone()),
            baseline.folders.iter().map(|f| f.name.clone()),
        )
        .with_policy(ReplicationGroup::FOLDERS_POLICY);

        for folder in &declared {
            match baseline.folder(&folder.name) {
                None => changes.push(Operation::AddFolder {
                    group: group.clone(),
                    folder: ReplicatedFolderState {
                        name: folder.name.clone(),
                        content_path: folder.content_path.clone().unwrap_or_default(),
                        description: folder.description.clone(),
                        dfsn_path: folder.dfsn_path.clone(),
                        exclude_files: folder.exclude_files.clone().unwrap_or_default(),
                        exclude_dirs: folder.exclude_dirs.clone().unwrap_or_default(),
                    },
                }),
                Some(existing) => {
                    if let Some(path) = folder.content_path.as_deref() {
                        if !same_local_path(path, &existing.content_path) {
                            warn!(
                                group = %group,
                                folder = %folder.name,
                                live = %existing.content_path,
                                declared = %path,
                                "content_path differs from live folder; left unchanged"
                            );
                        }
                    }
                    let update = folder_update(folder, existing);
                    if !update.is_empty() {
                        changes.push(Operation::UpdateFolder {
                            group: group.clone(),
                            folder: folder.name.clone(),
                            update,
                        });
                    }
                }
            }
        }

        let untouched = baseline
            .folders
            .iter()
            .filter(|f| !declared.iter().any(|d| d.name == f.name))
            .count();
        debug!(
            entity = %changes.entity,
            operations = changes.len(),
            new_folders = delta.to_add.len(),
            untouched_folders = untouched,
            "reconciled replication group"
        );
        Ok(changes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{GlobList, Topology};
    use crate::operation::Attribute;

    fn names(items: &[&str]) -> Vec<Name> {
        items.iter().map(|n| Name::from(*n)).collect()
    }

    fn folder_state(name: &str) -> ReplicatedFolderState {
        ReplicatedFolderState {
            name: Name::from(name),
            content_path: format!(r"C:\DFS\{name}"),
            description: None,
            dfsn_path: None,
            exclude_files: GlobList::default(),
            exclude_dirs: GlobList::default(),
        }
    }

    fn current(members: &[&str], folders: &[&str]) -> ReplicationGroupState {
        let mut state = ReplicationGroupState::empty(
            Name::from("dfsr"),
            Topology::Mesh,
            None,
            4096,
            4096,
        );
        state.members = names(members);
        state.folders = folders.iter().map(|f| folder_state(f)).collect();
        state
    }

    fn reconcile(
        desired: &ReplicationGroup,
        current: Option<&ReplicationGroupState>,
    ) -> Result<ChangeSet, CoreError> {
        ReplicationGroupReconciler::default().reconcile(desired, current)
    }

    #[test]
    fn member_changes_are_symmetric() {
        let desired = ReplicationGroup::new("dfsr").with_members(["A", "C", "D"]);
        let changes = reconcile(&desired, Some(&current(&["A", "B", "C"], &[]))).unwrap();
        assert_eq!(
            changes.operations,
            [
                Operation::RemoveMember {
                    group: Name::from("dfsr"),
                    member: Name::from("B"),
                    disconnect_from: names(&["A", "C"]),
                },
                Operation::AddMember {
                    group: Name::from("dfsr"),
                    member: Name::from("D"),
                    connect_to: names(&["A", "C"]),
                },
            ]
        );
    }

    #[test]
    fn new_group_creates_then_fans_out_mesh() {
        let desired = ReplicationGroup::new("dfsr").with_members(["m1", "m2"]);
        let changes = reconcile(&desired, None).unwrap();
        assert_eq!(
            changes.operations,
            [
                Operation::CreateGroup {
                    name: Name::from("dfsr"),
                    topology: Topology::Mesh,
                    description: None,
                    staging_quota: 4096,
                    conflict_and_deleted_quota: 4096,
                },
                Operation::AddMember {
                    group: Name::from("dfsr"),
                    member: Name::from("m1"),
                    connect_to: vec![],
                },
                Operation::AddMember {
                    group: Name::from("dfsr"),
                    member: Name::from("m2"),
                    connect_to: names(&["m1"]),
                },
            ]
        );
    }

    #[test]
    fn adding_to_n_member_mesh_connects_to_all_n() {
        let desired = ReplicationGroup::new("dfsr").with_members(["a", "b", "c", "d", "e"]);
        let changes = reconcile(&desired, Some(&current(&["a", "b", "c", "d"], &[]))).unwrap();
        let Some(Operation::AddMember { connect_to, .. }) = changes.operations.first() else {
            panic!("expected AddMember, got {:?}", changes.operations);
        };
        assert_eq!(connect_to.len(), 4);
    }

    #[test]
    fn undeclared_folders_are_never_removed() {
        let desired = ReplicationGroup::new("dfsr")
            .with_members(["a"])
            .with_folder(ReplicatedFolder::new("F1", r"C:\DFS\F1"));
        let changes = reconcile(&desired, Some(&current(&["a"], &["F1", "F2"]))).unwrap();
        assert!(changes.is_empty(), "unexpected: {:?}", changes.operations);
    }

    #[test]
    fn omitted_members_leave_membership_alone() {
        let desired = ReplicationGroup::new("dfsr");
        let changes = reconcile(&desired, Some(&current(&["a", "b"], &[]))).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn explicit_empty_members_remove_everyone() {
        let desired = ReplicationGroup::new("dfsr").with_members(Vec::<&str>::new());
        let changes = reconcile(&desired, Some(&current(&["a", "b"], &[]))).unwrap();
        assert_eq!(
            changes.operations,
            [
                Operation::RemoveMember {
                    group: Name::from("dfsr"),
                    member: Name::from("a"),
                    disconnect_from: names(&["b"]),
                },
                Operation::RemoveMember {
                    group: Name::from("dfsr"),
                    member: Name::from("b"),
                    disconnect_from: vec![],
                },
            ]
        );
    }

    #[test]
    fn new_folder_is_added_with_declared_settings() {
        let mut folder = ReplicatedFolder::new("data", r"C:\DFS\data");
        folder.exclude_files = Some(GlobList::parse("~*, *.tmp"));
        let desired = ReplicationGroup::new("dfsr").with_folder(folder);
        let changes = reconcile(&desired, Some(&current(&[], &[]))).unwrap();
        let Some(Operation::AddFolder { folder, .. }) = changes.operations.first() else {
            panic!("expected AddFolder, got {:?}", changes.operations);
        };
        assert_eq!(folder.content_path, r"C:\DFS\data");
        assert_eq!(folder.exclude_files, GlobList::parse("*.tmp,~*"));
    }

    #[test]
    fn existing_folder_updates_only_changed_fields() {
        let mut folder = ReplicatedFolder::new("data", r"C:\DFS\data");
        folder.description = Some("shared data".into());
        folder.exclude_dirs = Some(GlobList::default());
        let desired = ReplicationGroup::new("dfsr").with_folder(folder);
        let changes = reconcile(&desired, Some(&current(&[], &["data"]))).unwrap();
        assert_eq!(
            changes.operations,
            [Operation::UpdateFolder {
                group: Name::from("dfsr"),
                folder: Name::from("data"),
                update: FolderUpdate {
                    description: Some("shared data".into()),
                    ..FolderUpdate::default()
                },
            }]
        );
    }

    #[test]
    fn quota_and_description_changes() {
        let mut desired = ReplicationGroup::new("dfsr");
        desired.staging_quota = Some(8192);
        desired.description = Some("branch sync".into());
        let changes = reconcile(&desired, Some(&current(&[], &[]))).unwrap();
        assert_eq!(
            changes.operations,
            [
                Operation::SetAttribute {
                    entity: EntityRef::Group(Name::from("dfsr")),
                    attribute: Attribute::Description("branch sync".into()),
                },
                Operation::SetStagingQuota {
                    group: Name::from("dfsr"),
                    megabytes: 8192,
                },
            ]
        );
    }

    #[test]
    fn missing_content_path_fails_validation() {
        let mut folder = ReplicatedFolder::new("data", "");
        folder.content_path = None;
        let desired = ReplicationGroup::new("dfsr").with_folder(folder);
        let err = reconcile(&desired, None).unwrap_err();
        assert!(err.to_string().contains("requires content_path"), "{err}");
    }

    #[test]
    fn conflicting_content_paths_fail_validation() {
        let desired = ReplicationGroup::new("dfsr")
            .with_folder(ReplicatedFolder::new("data", r"C:\DFS\data"))
            .with_folder(ReplicatedFolder::new("DATA", r"D:\data"));
        let err = reconcile(&desired, None).unwrap_err();
        assert!(err.to_string().contains("conflicting content paths"), "{err}");
    }

    #[test]
    fn identical_duplicate_folders_collapse() {
        let desired = ReplicationGroup::new("dfsr")
            .with_folder(ReplicatedFolder::new("data", r"C:\DFS\data"))
            .with_folder(ReplicatedFolder::new("data", r"c:\dfs\data\"));
        let changes = reconcile(&desired, Some(&current(&[], &[]))).unwrap();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn absent_group() {
        let desired = ReplicationGroup::new("dfsr").with_state(GroupState::Absent);
        assert!(reconcile(&desired, None).unwrap().is_empty());
        let changes = reconcile(&desired, Some(&current(&["a"], &[]))).unwrap();
        assert_eq!(
            changes.operations,
            [Operation::DeleteGroup {
                name: Name::from("dfsr")
            }]
        );
    }
}
