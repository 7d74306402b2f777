// ── Namespace root / folder domain types ──
//
// Declared types (`NamespaceRoot`, `NamespaceFolder`) come from the
// manifest and leave every tunable optional; unset tunables resolve
// against `ReconcileDefaults`. Observed types (`*State`) are what a
// state reader reports and carry concrete values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::{Availability, LifecycleState};
use super::ident::UncPath;
use crate::diff::CollectionPolicy;

/// Namespace flavour. Fixed at creation time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum NamespaceType {
    /// Stand-alone namespace hosted on a single server.
    Standalone,
    /// Windows 2000 Server mode domain namespace.
    DomainV1,
    /// Windows Server 2008 mode domain namespace.
    #[default]
    DomainV2,
}

/// Referral tunables shared by roots and folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralSettings {
    pub insite_referrals: bool,
    pub target_failback: bool,
    /// Seconds clients cache a referral.
    pub ttl: u32,
}

/// Root tunables: referral settings plus the root-only switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RootSettings {
    #[serde(flatten)]
    pub referral: ReferralSettings,
    pub access_based_enumeration: bool,
    pub root_scalability: bool,
    pub site_costing: bool,
}

// ── Declared ────────────────────────────────────────────────────────

/// Declared state of a namespace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRoot {
    pub path: UncPath,
    #[serde(default)]
    pub state: LifecycleState,
    pub targets: Option<Vec<UncPath>>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub namespace_type: Option<NamespaceType>,
    pub insite_referrals: Option<bool>,
    pub target_failback: Option<bool>,
    pub ttl: Option<u32>,
    pub access_based_enumeration: Option<bool>,
    pub root_scalability: Option<bool>,
    pub site_costing: Option<bool>,
}

impl NamespaceRoot {
    pub const TARGETS_POLICY: CollectionPolicy = CollectionPolicy::PruneOnReconcile;

    /// A `present` root with no targets and every tunable unset.
    pub fn new(path: impl Into<UncPath>) -> Self {
        Self {
            path: path.into(),
            state: LifecycleState::Present,
            targets: None,
            description: None,
            namespace_type: None,
            insite_referrals: None,
            target_failback: None,
            ttl: None,
            access_based_enumeration: None,
            root_scalability: None,
            site_costing: None,
        }
    }

    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = state;
        self
    }

    pub fn with_targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<UncPath>,
    {
        self.targets = Some(targets.into_iter().map(Into::into).collect());
        self
    }
}

/// Declared state of a namespace folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceFolder {
    pub path: UncPath,
    #[serde(default)]
    pub state: LifecycleState,
    pub targets: Option<Vec<UncPath>>,
    pub description: Option<String>,
    pub insite_referrals: Option<bool>,
    pub target_failback: Option<bool>,
    pub ttl: Option<u32>,
}

impl NamespaceFolder {
    pub const TARGETS_POLICY: CollectionPolicy = CollectionPolicy::PruneOnReconcile;

    pub fn new(path: impl Into<UncPath>) -> Self {
        Self {
            path: path.into(),
            state: LifecycleState::Present,
            targets: None,
            description: None,
            insite_referrals: None,
            target_failback: None,
            ttl: None,
        }
    }

    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = state;
        self
    }

    pub fn with_targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<UncPath>,
    {
        self.targets = Some(targets.into_iter().map(Into::into).collect());
        self
    }
}

// ── Observed ────────────────────────────────────────────────────────

/// Live state of a namespace root as reported by a state reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRootState {
    pub path: UncPath,
    #[serde(rename = "type")]
    pub namespace_type: NamespaceType,
    #[serde(default)]
    pub targets: Vec<UncPath>,
    pub description: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(flatten)]
    pub settings: RootSettings,
}

/// Live state of a namespace folder as reported by a state reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceFolderState {
    pub path: UncPath,
    #[serde(default)]
    pub targets: Vec<UncPath>,
    pub description: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(flatten)]
    pub settings: ReferralSettings,
}
