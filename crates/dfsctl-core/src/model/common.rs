// ── Shared lifecycle types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Declared lifecycle state of a namespace root or folder.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LifecycleState {
    /// Exists; availability is left as the system has it.
    #[default]
    Present,
    Absent,
    Online,
    Offline,
}

impl LifecycleState {
    /// The availability this state forces, if any.
    pub fn availability(self) -> Option<Availability> {
        match self {
            Self::Online => Some(Availability::Online),
            Self::Offline => Some(Availability::Offline),
            Self::Present | Self::Absent => None,
        }
    }
}

/// Observed availability of an existing namespace entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Availability {
    #[default]
    Online,
    Offline,
}

/// Declared lifecycle state of a replication group.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GroupState {
    #[default]
    Present,
    Absent,
}

impl From<GroupState> for LifecycleState {
    fn from(state: GroupState) -> Self {
        match state {
            GroupState::Present => Self::Present,
            GroupState::Absent => Self::Absent,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_state_parses_case_insensitively() {
        assert_eq!("Offline".parse::<LifecycleState>().unwrap(), LifecycleState::Offline);
        assert_eq!(LifecycleState::Online.to_string(), "online");
    }

    #[test]
    fn only_online_and_offline_force_availability() {
        assert_eq!(LifecycleState::Present.availability(), None);
        assert_eq!(LifecycleState::Absent.availability(), None);
        assert_eq!(
            LifecycleState::Offline.availability(),
            Some(Availability::Offline)
        );
    }
}
