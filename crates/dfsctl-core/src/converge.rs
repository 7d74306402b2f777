// ── Collaborator seams and the converge driver ──
//
// The engine never talks to a managed host itself. A `StateReader`
// supplies snapshots and an `Executor` applies primitives; `converge`
// strings them together around a pure `Reconciler`.

use tracing::{debug, info, warn};

use crate::changelog::ChangeLog;
use crate::error::{CoreError, ExecutionError};
use crate::operation::{ChangeSet, EntityRef, Operation};
use crate::reconcile::{Declared, Reconciler};

/// Reads the live state of one entity kind.
pub trait StateReader<S> {
    /// `Ok(None)` when the entity does not exist.
    fn fetch_current(&self, entity: &EntityRef) -> Result<Option<S>, ExecutionError>;
}

/// Applies primitive operations to the managed system.
pub trait Executor {
    fn apply(&mut self, operation: &Operation) -> Result<(), ExecutionError>;
}

/// Compute the change set for `desired` without applying it.
pub fn plan<R, S>(
    reconciler: &R,
    desired: &R::Desired,
    reader: &S,
) -> Result<ChangeSet, CoreError>
where
    R: Reconciler,
    S: StateReader<R::Current>,
{
    let entity = desired.entity();
    let current = reader
        .fetch_current(&entity)
        .map_err(|source| CoreError::Execution {
            entity: entity.clone(),
            source,
            applied: ChangeLog::new(),
        })?;
    reconciler.reconcile(desired, current.as_ref())
}

/// Apply every operation in order, stopping at the first failure.
///
/// On failure the error carries the log of what was applied before it.
pub fn apply_change_set<E: Executor>(
    changes: &ChangeSet,
    executor: &mut E,
) -> Result<ChangeLog, CoreError> {
    let mut applied = ChangeLog::new();
    for operation in changes {
        if let Err(source) = executor.apply(operation) {
            warn!(entity = %changes.entity, error = %source, applied = applied.len(), "operation failed");
            return Err(CoreError::Execution {
                entity: changes.entity.clone(),
                source,
                applied,
            });
        }
        debug!(entity = %changes.entity, op = operation.verb(), "applied operation");
        applied.push(operation.to_string());
    }
    Ok(applied)
}

/// Fetch, reconcile and apply for one entity. Returns the change log;
/// an empty log means the entity was already converged.
pub fn converge<R, S>(
    reconciler: &R,
    desired: &R::Desired,
    system: &mut S,
) -> Result<ChangeLog, CoreError>
where
    R: Reconciler,
    S: StateReader<R::Current> + Executor,
{
    let changes = plan(reconciler, desired, system)?;
    let log = apply_change_set(&changes, system)?;
    if log.is_empty() {
        debug!(entity = %changes.entity, "already converged");
    } else {
        info!(entity = %changes.entity, changes = log.len(), "converged");
    }
    Ok(log)
}
