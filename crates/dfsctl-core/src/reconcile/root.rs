use tracing::debug;

use super::{
    Declared, ReconcileDefaults, Reconciler, description_change, push_target_delta,
    referral_changes, resolve_referral, unique_targets, validate_namespace,
};
use crate::error::CoreError;
use crate::lifecycle::{LifecycleStateMachine, Observed, Transition};
use crate::model::{LifecycleState, NamespaceRoot, NamespaceRootState, RootSettings};
use crate::operation::{Attribute, ChangeSet, Operation};

/// Reconciles a namespace root: type, targets, availability and tunables.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRootReconciler {
    defaults: ReconcileDefaults,
}

impl NamespaceRootReconciler {
    pub fn new(defaults: ReconcileDefaults) -> Self {
        Self { defaults }
    }

    fn settings(&self, desired: &NamespaceRoot) -> RootSettings {
        RootSettings {
            referral: resolve_referral(
                desired.insite_referrals,
                desired.target_failback,
                desired.ttl,
                self.defaults.root_ttl,
            ),
            access_based_enumeration: desired.access_based_enumeration.unwrap_or(false),
            root_scalability: desired.root_scalability.unwrap_or(false),
            site_costing: desired.site_costing.unwrap_or(false),
        }
    }
}

impl Reconciler for NamespaceRootReconciler {
    type Desired = NamespaceRoot;
    type Current = NamespaceRootState;

    fn reconcile(
        &self,
        desired: &NamespaceRoot,
        current: Option<&NamespaceRootState>,
    ) -> Result<ChangeSet, CoreError> {
        let entity = desired.entity();
        validate_namespace(
            &entity,
            &desired.path,
            desired.state,
            desired.targets.as_deref(),
            desired.ttl,
        )?;
        if desired.path.components().count() != 2 {
            return Err(CoreError::validation(
                &entity,
                "namespace root path must be \\\\server\\namespace",
            ));
        }

        let namespace_type = desired.namespace_type.unwrap_or(self.defaults.namespace_type);
        if let Some(current) = current {
            if desired.state != LifecycleState::Absent && current.namespace_type != namespace_type
            {
                return Err(CoreError::ImmutableAttribute {
                    entity,
                    attribute: "type",
                    current: current.namespace_type.to_string(),
                    desired: namespace_type.to_string(),
                });
            }
        }

        let mut changes = ChangeSet::new(entity.clone());
        let settings = self.settings(desired);
        let targets = desired.targets.as_deref().unwrap_or_default();
        let observed = current.map_or(Observed::Missing, |c| Observed::Exists(Some(c.availability)));

        let current = match (LifecycleStateMachine::transition(desired.state, observed), current) {
            (Transition::Destroy, _) => {
                changes.push(Operation::Delete { entity });
                return Ok(changes);
            }
            (Transition::Create { availability }, _) => {
                changes.push(Operation::CreateRoot {
                    path: desired.path.clone(),
                    namespace_type,
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
        attributes.extend(referral_changes(&settings.referral, &current.settings.referral));
        if settings.access_based_enumeration != current.settings.access_based_enumeration {
            attributes.push(Attribute::AccessBasedEnumeration(
                settings.access_based_enumeration,
            ));
        }
        if settings.root_scalability != current.settings.root_scalability {
            attributes.push(Attribute::RootScalability(settings.root_scalability));
        }
        if settings.site_costing != current.settings.site_costing {
            attributes.push(Attribute::SiteCosting(settings.site_costing));
        }
        for attribute in attributes {
            changes.push(Operation::SetAttribute {
                entity: changes.entity.clone(),
                attribute,
            });
        }

        push_target_delta(
            &mut changes,
            NamespaceRoot::TARGETS_POLICY,
            targets,
            &current.targets,
        );

        debug!(entity = %changes.entity, operations = changes.len(), "reconciled namespace root");
        Ok(changes)
    }
}
