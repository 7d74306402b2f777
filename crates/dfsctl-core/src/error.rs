// ── Core error types ──
//
// Every error is terminal for the reconciliation call that raised it.
// The engine keeps no state between calls, so nothing needs cleanup.

use thiserror::Error;

use crate::changelog::ChangeLog;
use crate::operation::EntityRef;

/// A collaborator failed to read state or apply a primitive operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation}: {message}")]
pub struct ExecutionError {
    /// What was being attempted, e.g. the operation's change-log line.
    pub operation: String,
    pub message: String,
}

impl ExecutionError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or incomplete declared state. Nothing was emitted.
    #[error("Invalid {entity}: {message}")]
    Validation { entity: EntityRef, message: String },

    /// A structurally immutable attribute differs. Nothing was emitted.
    #[error("Cannot change {attribute} of {entity} from {current} to {desired}")]
    ImmutableAttribute {
        entity: EntityRef,
        attribute: &'static str,
        current: String,
        desired: String,
    },

    /// Applying an operation failed; `applied` lists what succeeded first.
    #[error("Failed to converge {entity}: {source}")]
    Execution {
        entity: EntityRef,
        #[source]
        source: ExecutionError,
        applied: ChangeLog,
    },
}

impl CoreError {
    pub(crate) fn validation(entity: &EntityRef, message: impl Into<String>) -> Self {
        Self::Validation {
            entity: entity.clone(),
            message: message.into(),
        }
    }

    pub fn entity(&self) -> &EntityRef {
        match self {
            Self::Validation { entity, .. }
            | Self::ImmutableAttribute { entity, .. }
            | Self::Execution { entity, .. } => entity,
        }
    }

    /// Changes applied before the failure; `None` unless `Execution`.
    pub fn applied(&self) -> Option<&ChangeLog> {
        match self {
            Self::Execution { applied, .. } => Some(applied),
            Self::Validation { .. } | Self::ImmutableAttribute { .. } => None,
        }
    }
}
