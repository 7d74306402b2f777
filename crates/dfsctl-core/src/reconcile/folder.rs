use tracing::debug;

use super::{
    Declared, ReconcileDefaults, Reconciler, description_change, push_target_delta,
    referral_changes, resolve_referral, unique_targets, validate_namespace,
};
use crate::error::CoreError;
use crate::lifecycle::{LifecycleStateMachine, Observed, Transition};
use crate::model::{NamespaceFolder, NamespaceFolderState};
use crate::operation::{Attribute, ChangeSet, Operation};

/// Reconciles a namespace folder: targets, availability and referral tunables.
#[derive(Debug, Clone, Default)]
pub struct NamespaceFolderReconciler {
    defaults: ReconcileDefaults,
}

impl NamespaceFolderReconciler {
    pub fn new(defaults: ReconcileDefaults) -> Self {
        Self { defaults }
    }
}

impl Reconciler for NamespaceFolderReconciler {
    type Desired = NamespaceFolder;
    type Current = NamespaceFolderState;

    fn reconcile(
        &self,
        desired: &NamespaceFolder,
        current: Option<&NamespaceFolderState>,
    ) -> Result<ChangeSet, CoreError> {
        let entity = desired.entity();
        validate_namespace(
            &entity,
            &desired.path,
            desired.state,
            desired.targets.as_deref(),
            desired.ttl,
        )?;
        // \\server\root\folder at minimum
        if desired.path.components().count() < 3 {
            return Err(CoreError::validation(
                &entity,
                "folder path must lie below a namespace root",
            ));
        }

        let mut changes = ChangeSet::new(entity.clone());
        let settings = resolve_referral(
            desired.insite_referrals,
            desired.target_failback,
            desired.ttl,
            self.defaults.folder_ttl,
        );
        let targets = desired.targets.as_deref().unwrap_or_default();
        let observed = current.map_or(Observed::Missing, |c| Observed::Exists(Some(c.availability)));

        let current = match (LifecycleStateMachine::transition(desired.state, observed), current) {
            (Transition::Destroy, _) => {
                changes.push(Operation::Delete { entity });
                return Ok(changes);
            }
            (Transition::Create { availability }, _) => {
                changes.push(Operation::CreateFolder {
                    path: desired.path.clone(),
                    targets: unique_targets(targets),
                    description: desired.description.clone(),
                    settings,
                });
                if let Some(availability) = availability {
                    changes.push(Operation::SetAvailability {
                        entity,
                        availability,
                    });
                }
                return Ok(changes);
            }
            (Transition::SetAvailability(availability), Some(current)) => {
                changes.push(Operation::SetAvailability {
                    entity,
                    availability,
                });
                current
            }
            (Transition::Unchanged, Some(current)) => current,
            (_, None) => return Ok(changes),
        };

        let mut attributes: Vec<Attribute> = description_change(
            desired.description.as_deref(),
            current.description.as_deref(),
        )
        .into_iter()
        .collect();
        attributes.extend(referral_changes(&settings, &current.settings));
        for attribute in attributes {
            changes.push(Operation::SetAttribute {
                entity: changes.entity.clone(),
                attribute,
            });
        }

        push_target_delta(
            &mut changes,
            NamespaceFolder::TARGETS_POLICY,
            targets,
            &current.targets,
        );

        debug!(entity = %changes.entity, operations = changes.len(), "reconciled namespace folder");
        Ok(changes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Availability, LifecycleState, ReferralSettings, UncPath};
    use crate::operation::EntityRef;

    const PATH: &str = r"\\d\dfs\data";

    fn entity() -> EntityRef {
        EntityRef::Folder(UncPath::from(PATH))
    }

    fn current(targets: &[&str]) -> NamespaceFolderState {
        NamespaceFolderState {
            path: UncPath::from(PATH),
            targets: targets.iter().map(|t| UncPath::from(*t)).collect(),
            description: Some("data".into()),
            availability: Availability::Online,
            settings: ReferralSettings {
                insite_referrals: false,
                target_failback: false,
                ttl: 1800,
            },
        }
    }

    fn reconcile(
        desired: &NamespaceFolder,
        current: Option<&NamespaceFolderState>,
    ) -> Result<ChangeSet, CoreError> {
        NamespaceFolderReconciler::default().reconcile(desired, current)
    }

    #[test]
    fn converged_folder_yields_nothing() {
        let desired = NamespaceFolder::new(PATH).with_targets([r"\\s1\data", r"\\s2\data"]);
        let changes = reconcile(&desired, Some(&current(&[r"\\S2\DATA", r"\\s1\data"]))).unwrap();
        assert!(changes.is_empty(), "unexpected: {:?}", changes.operations);
    }

    #[test]
    fn folder_ttl_defaults_to_1800() {
        let desired = NamespaceFolder::new(PATH).with_targets([r"\\s1\data"]);
        let changes = reconcile(&desired, None).unwrap();
        let Some(Operation::CreateFolder { settings, .. }) = changes.operations.first() else {
            panic!("expected CreateFolder, got {:?}", changes.operations);
        };
        assert_eq!(settings.ttl, 1800);
    }

    #[test]
    fn undeclared_targets_are_pruned() {
        let desired = NamespaceFolder::new(PATH).with_targets([r"\\s1\data"]);
        let changes = reconcile(&desired, Some(&current(&[r"\\s1\data", r"\\s2\data"]))).unwrap();
        assert_eq!(
            changes.operations,
            [Operation::RemoveTarget {
                entity: entity(),
                target: UncPath::from(r"\\s2\data"),
            }]
        );
    }

    #[test]
    fn offline_existing_folder_sets_availability_then_attributes() {
        let mut desired = NamespaceFolder::new(PATH)
            .with_state(LifecycleState::Offline)
            .with_targets([r"\\s1\data"]);
        desired.target_failback = Some(true);
        let changes = reconcile(&desired, Some(&current(&[r"\\s1\data"]))).unwrap();
        assert_eq!(
            changes.operations,
            [
                Operation::SetAvailability {
                    entity: entity(),
                    availability: Availability::Offline,
                },
                Operation::SetAttribute {
                    entity: entity(),
                    attribute: Attribute::TargetFailback(true),
                },
            ]
        );
    }

    #[test]
    fn create_carries_each_target_once() {
        let desired = NamespaceFolder::new(PATH).with_targets([r"\\s1\data", r"\\S1\Data"]);
        let changes = reconcile(&desired, None).unwrap();
        assert_eq!(
            changes.operations,
            [Operation::CreateFolder {
                path: UncPath::from(PATH),
                targets: vec![UncPath::from(r"\\s1\data")],
                description: None,
                settings: ReferralSettings {
                    insite_referrals: false,
                    target_failback: false,
                    ttl: 1800,
                },
            }]
        );
    }

    #[test]
    fn folder_directly_on_server_is_rejected() {
        let desired = NamespaceFolder::new(r"\\d\dfs").with_targets([r"\\s1\data"]);
        assert!(matches!(
            reconcile(&desired, None),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn missing_targets_rejected_even_when_current_exists() {
        let desired = NamespaceFolder::new(PATH);
        let err = reconcile(&desired, Some(&current(&[r"\\s1\data"]))).unwrap_err();
        assert!(err.to_string().contains("targets are required"));
    }
}
