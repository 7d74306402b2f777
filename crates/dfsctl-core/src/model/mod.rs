// ── Domain model ──
//
// Declared and observed shapes for the three managed entity kinds,
// plus the case-insensitive identity types they are keyed by.

pub mod common;
pub mod ident;
pub mod namespace;
pub mod replication;

pub use common::{Availability, GroupState, LifecycleState};
pub use ident::{Name, UncPath};
pub use namespace::{
    NamespaceFolder, NamespaceFolderState, NamespaceRoot, NamespaceRootState, NamespaceType,
    ReferralSettings, RootSettings,
};
pub use replication::{
    Connection, DEFAULT_QUOTA_MB, GlobList, ReplicatedFolder, ReplicatedFolderState,
    ReplicationGroup, ReplicationGroupState, Topology,
};
