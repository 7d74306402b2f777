// ── Reconcilers ──
//
// One concrete reconciler per entity kind behind a shared trait. Only
// the pure helpers below are shared; each reconciler owns its own
// ordering and policy.

mod folder;
mod group;
mod root;

pub use folder::NamespaceFolderReconciler;
pub use group::ReplicationGroupReconciler;
pub use root::NamespaceRootReconciler;

use crate::diff::{self, CollectionPolicy};
use crate::error::CoreError;
use crate::model::{
    DEFAULT_QUOTA_MB, LifecycleState, NamespaceFolder, NamespaceRoot, NamespaceType,
    ReferralSettings, ReplicationGroup, UncPath,
};
use crate::operation::{Attribute, ChangeSet, EntityRef, Operation};

/// Computes the operations that turn `current` into `desired`.
///
/// Implementations are pure: the same inputs always produce the same
/// change set, and nothing is remembered between calls.
pub trait Reconciler {
    type Desired: Declared;
    type Current;

    fn reconcile(
        &self,
        desired: &Self::Desired,
        current: Option<&Self::Current>,
    ) -> Result<ChangeSet, CoreError>;
}

/// A declared entity that knows its own identity.
pub trait Declared {
    fn entity(&self) -> EntityRef;
}

impl Declared for NamespaceRoot {
    fn entity(&self) -> EntityRef {
        EntityRef::Root(self.path.clone())
    }
}

impl Declared for NamespaceFolder {
    fn entity(&self) -> EntityRef {
        EntityRef::Folder(self.path.clone())
    }
}

impl Declared for ReplicationGroup {
    fn entity(&self) -> EntityRef {
        EntityRef::Group(self.name.clone())
    }
}

// ── Defaults ────────────────────────────────────────────────────────

/// Values used for tunables a declaration leaves unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileDefaults {
    pub root_ttl: u32,
    pub folder_ttl: u32,
    pub namespace_type: NamespaceType,
    pub staging_quota_mb: u32,
    pub conflict_quota_mb: u32,
}

impl ReconcileDefaults {
    pub const ROOT_TTL: u32 = 300;
    pub const FOLDER_TTL: u32 = 1800;
}

impl Default for ReconcileDefaults {
    fn default() -> Self {
        Self {
            root_ttl: Self::ROOT_TTL,
            folder_ttl: Self::FOLDER_TTL,
            namespace_type: NamespaceType::DomainV2,
            staging_quota_mb: DEFAULT_QUOTA_MB,
            conflict_quota_mb: DEFAULT_QUOTA_MB,
        }
    }
}

// ── Shared namespace helpers ────────────────────────────────────────

/// Checks shared by roots and folders. Runs before anything is emitted.
fn validate_namespace(
    entity: &EntityRef,
    path: &UncPath,
    state: LifecycleState,
    targets: Option<&[UncPath]>,
    ttl: Option<u32>,
) -> Result<(), CoreError> {
    if !path.is_well_formed() {
        return Err(CoreError::validation(
            entity,
            format!("path '{path}' is not a UNC path (expected \\\\server\\share)"),
        ));
    }
    if state == LifecycleState::Absent {
        return Ok(());
    }

    let targets = match targets {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Err(CoreError::validation(
                entity,
                format!("targets are required when state is '{state}'"),
            ));
        }
    };
    if let Some(bad) = targets.iter().find(|t| !t.is_well_formed()) {
        return Err(CoreError::validation(
            entity,
            format!("target '{bad}' is not a UNC path"),
        ));
    }
    if ttl == Some(0) {
        return Err(CoreError::validation(entity, "ttl must be a positive number of seconds"));
    }
    Ok(())
}

fn resolve_referral(
    insite_referrals: Option<bool>,
    target_failback: Option<bool>,
    ttl: Option<u32>,
    default_ttl: u32,
) -> ReferralSettings {
    ReferralSettings {
        insite_referrals: insite_referrals.unwrap_or(false),
        target_failback: target_failback.unwrap_or(false),
        ttl: ttl.unwrap_or(default_ttl),
    }
}

/// An undeclared description leaves the current one alone.
fn description_change(desired: Option<&str>, current: Option<&str>) -> Option<Attribute> {
    let desired = desired?;
    (desired != current.unwrap_or_default()).then(|| Attribute::Description(desired.to_owned()))
}

fn referral_changes(desired: &ReferralSettings, current: &ReferralSettings) -> Vec<Attribute> {
    let mut changes = Vec::new();
    if desired.insite_referrals != current.insite_referrals {
        changes.push(Attribute::InsiteReferrals(desired.insite_referrals));
    }
    if desired.target_failback != current.target_failback {
        changes.push(Attribute::TargetFailback(desired.target_failback));
    }
    if desired.ttl != current.ttl {
        changes.push(Attribute::Ttl(desired.ttl));
    }
    changes
}

/// Declared targets with duplicate keys collapsed, first spelling kept.
fn unique_targets(targets: &[UncPath]) -> Vec<UncPath> {
    diff::diff(targets.iter().cloned(), std::iter::empty()).to_add
}

/// Removals (current order) followed by additions (declaration order).
fn push_target_delta(
    changes: &mut ChangeSet,
    policy: CollectionPolicy,
    desired: &[UncPath],
    current: &[UncPath],
) {
    let delta = diff::diff(desired.iter().cloned(), current.iter().cloned()).with_policy(policy);
    let entity = changes.entity.clone();
    for target in delta.to_remove {
        changes.push(Operation::RemoveTarget {
            entity: entity.clone(),
            target,
        });
    }
    for target in delta.to_add {
        changes.push(Operation::AddTarget {
            entity: entity.clone(),
            target,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> EntityRef {
        EntityRef::Root(UncPath::from(r"\\d\dfs"))
    }

    #[test]
    fn description_change_ignores_undeclared() {
        assert_eq!(description_change(None, Some("x")), None);
        assert_eq!(description_change(Some("x"), Some("x")), None);
        assert_eq!(
            description_change(Some("y"), None),
            Some(Attribute::Description("y".into()))
        );
        assert_eq!(description_change(Some(""), None), None);
    }

    #[test]
    fn unique_targets_collapse_case_and_trailing_separator() {
        let declared = [
            UncPath::from(r"\\t1\dfs"),
            UncPath::from(r"\\T1\DFS\"),
            UncPath::from(r"\\t2\dfs"),
        ];
        let unique = unique_targets(&declared);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].as_str(), r"\\t1\dfs");
        assert_eq!(unique[1].as_str(), r"\\t2\dfs");
    }

    #[test]
    fn referral_changes_only_report_differences() {
        let current = ReferralSettings {
            insite_referrals: false,
            target_failback: true,
            ttl: 300,
        };
        let desired = ReferralSettings {
            ttl: 600,
            ..current
        };
        assert_eq!(referral_changes(&desired, &current), [Attribute::Ttl(600)]);
    }

    #[test]
    fn validate_rejects_missing_targets_unless_absent() {
        let path = UncPath::from(r"\\d\dfs");
        assert!(validate_namespace(&root(), &path, LifecycleState::Online, None, None).is_err());
        assert!(
            validate_namespace(&root(), &path, LifecycleState::Present, Some(&[]), None).is_err()
        );
        assert!(validate_namespace(&root(), &path, LifecycleState::Absent, None, None).is_ok());
    }

    #[test]
    fn validate_rejects_zero_ttl_and_malformed_targets() {
        let path = UncPath::from(r"\\d\dfs");
        let good = [UncPath::from(r"\\s1\dfs")];
        let bad = [UncPath::from(r"s1\dfs")];
        assert!(
            validate_namespace(&root(), &path, LifecycleState::Present, Some(&good), Some(0))
                .is_err()
        );
        assert!(
            validate_namespace(&root(), &path, LifecycleState::Present, Some(&bad), None).is_err()
        );
        assert!(
            validate_namespace(&root(), &path, LifecycleState::Present, Some(&good), Some(60))
                .is_ok()
        );
    }
}
