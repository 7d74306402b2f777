//! Declarative reconciliation engine for DFS namespaces and DFS
//! replication groups.
//!
//! Callers describe the desired end state of an entity and hand it to a
//! reconciler together with a snapshot of what currently exists. The
//! reconciler answers with an ordered [`ChangeSet`] of primitive
//! operations; applying them brings the system to the declared state, and
//! running the reconciler again yields nothing.
//!
//! - **[`Reconciler`]** — one implementation per entity kind:
//!   [`NamespaceRootReconciler`], [`NamespaceFolderReconciler`] and
//!   [`ReplicationGroupReconciler`]. Reconcilers are pure; they never
//!   touch a host.
//!
//! - **[`StateReader`] / [`Executor`]** — the seams to the managed system.
//!   [`converge`] fetches, reconciles and applies in one call and reports
//!   a [`ChangeLog`] of what it did, including the partial log when an
//!   operation fails midway.
//!
//! - **[`Inventory`]** — a serializable in-memory system implementing both
//!   seams, used by the CLI and by idempotence tests.
//!
//! - **Domain model** ([`model`]) — declared and observed entity shapes
//!   keyed by case-insensitive [`UncPath`] and [`Name`] identities.

pub mod changelog;
pub mod converge;
pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod operation;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use changelog::ChangeLog;
pub use converge::{Executor, StateReader, apply_change_set, converge, plan};
pub use diff::{CollectionPolicy, Delta, diff};
pub use error::{CoreError, ExecutionError};
pub use lifecycle::{LifecycleStateMachine, Observed, Transition};
pub use operation::{Attribute, ChangeSet, EntityRef, FolderUpdate, Operation};
pub use reconcile::{
    Declared, NamespaceFolderReconciler, NamespaceRootReconciler, ReconcileDefaults, Reconciler,
    ReplicationGroupReconciler,
};
pub use store::Inventory;

pub use model::{
    Availability, Connection, GlobList, GroupState, LifecycleState, Name, NamespaceFolder,
    NamespaceFolderState, NamespaceRoot, NamespaceRootState, NamespaceType, ReferralSettings,
    ReplicatedFolder, ReplicatedFolderState, ReplicationGroup, ReplicationGroupState,
    RootSettings, Topology, UncPath,
};
