// ── Lifecycle state machine ──
//
// Decides the structural/availability step for one entity from its
// declared state and what was observed. Holds no memory between runs.

use crate::model::{Availability, LifecycleState};

/// What the state reader saw for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Missing,
    /// Exists, with its availability if the entity kind has one.
    Exists(Option<Availability>),
}

impl Observed {
    pub fn exists(self) -> bool {
        matches!(self, Self::Exists(_))
    }
}

/// Lifecycle step to emit before any attribute or collection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Destroy,
    /// Create, then force `availability` if the declared state names one.
    Create { availability: Option<Availability> },
    SetAvailability(Availability),
}

pub struct LifecycleStateMachine;

impl LifecycleStateMachine {
    pub fn transition(desired: LifecycleState, observed: Observed) -> Transition {
        match (desired, observed) {
            (LifecycleState::Absent, Observed::Missing) => Transition::Unchanged,
            (LifecycleState::Absent, Observed::Exists(_)) => Transition::Destroy,
            (state, Observed::Missing) => Transition::Create {
                availability: state.availability(),
            },
            // `present` never forces availability on an existing entity.
            (LifecycleState::Present, Observed::Exists(_)) => Transition::Unchanged,
            (state, Observed::Exists(current)) => match state.availability() {
                Some(wanted) if current != Some(wanted) => Transition::SetAvailability(wanted),
                _ => Transition::Unchanged,
            },
        }
    }
}
