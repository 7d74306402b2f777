// ── Set differ ──
//
// Pure set comparison with stable ordering. Additions come out in
// declaration order and removals in current-state order, so the same
// inputs always yield the same operation sequence.

use std::hash::Hash;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// How a declared collection treats items present only in current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPolicy {
    /// Undeclared current items are removed.
    PruneOnReconcile,
    /// Undeclared current items are left untouched.
    AdditiveOnly,
}

/// Result of comparing a desired set against a current set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<T> {
    pub to_add: Vec<T>,
    pub to_remove: Vec<T>,
}

impl<T> Delta<T> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Drop the removals when the collection is additive-only.
    pub fn with_policy(mut self, policy: CollectionPolicy) -> Self {
        if policy == CollectionPolicy::AdditiveOnly {
            self.to_remove.clear();
        }
        self
    }
}

/// `to_add = desired − current`, `to_remove = current − desired`.
///
/// Duplicates on either side collapse to a single entry; equality is
/// whatever `T`'s `Eq`/`Hash` consider the identifying key.
pub fn diff<T, D, C>(desired: D, current: C) -> Delta<T>
where
    T: Eq + Hash + Clone,
    D: IntoIterator<Item = T>,
    C: IntoIterator<Item = T>,
{
    let desired: IndexSet<T> = desired.into_iter().collect();
    let current: IndexSet<T> = current.into_iter().collect();

    let to_add = desired.difference(&current).cloned().collect();
    let to_remove = current.difference(&desired).cloned().collect();

    Delta { to_add, to_remove }
}
