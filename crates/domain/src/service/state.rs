//! Service workflow state and its transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a [`Service`](super::Service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    #[default]
    Pending,
    Review,
    Ready,
    /// Reviewed, no solution found.
    Without,
    /// Sent to the manufacturer under warranty.
    Warranty,
    Delivered,
}

/// Every declared `(from, to)` pair. Anything else is rejected.
const TRANSITIONS: &[(ServiceState, ServiceState)] = &[
    (ServiceState::Pending, ServiceState::Review),
    (ServiceState::Review, ServiceState::Ready),
    (ServiceState::Review, ServiceState::Without),
    (ServiceState::Review, ServiceState::Warranty),
    (ServiceState::Ready, ServiceState::Delivered),
    (ServiceState::Without, ServiceState::Delivered),
    (ServiceState::Warranty, ServiceState::Delivered),
];

impl ServiceState {
    /// States reachable through a workflow action, in button order.
    pub const ACTIONS: [Self; 5] = [
        Self::Review,
        Self::Ready,
        Self::Without,
        Self::Warranty,
        Self::Delivered,
    ];

    /// The declared transition table.
    #[must_use]
    pub fn transitions() -> &'static [(Self, Self)] {
        TRANSITIONS
    }

    /// Whether `(self, to)` is a declared transition.
    #[must_use]
    pub fn allows(self, to: Self) -> bool {
        TRANSITIONS.contains(&(self, to))
    }

    /// `delivered` has no outgoing transition.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// The service header may still be edited.
    #[must_use]
    pub fn is_header_editable(self) -> bool {
        !self.is_terminal()
    }

    /// The service itself may be deleted.
    #[must_use]
    pub fn is_deletable(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// New lines may be attached.
    #[must_use]
    pub fn accepts_new_lines(self) -> bool {
        matches!(self, Self::Pending | Self::Review)
    }

    /// Existing lines may be edited or removed.
    #[must_use]
    pub fn are_lines_editable(self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Review => "review",
            Self::Ready => "ready",
            Self::Without => "without",
            Self::Warranty => "warranty",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service state \"{0}\"")]
pub struct UnknownState(pub String);

impl FromStr for ServiceState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "review" => Ok(Self::Review),
            "ready" => Ok(Self::Ready),
            "without" => Ok(Self::Without),
            "warranty" => Ok(Self::Warranty),
            "delivered" => Ok(Self::Delivered),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_pending() {
        assert_eq!(ServiceState::default(), ServiceState::Pending);
    }

    #[test]
    fn should_allow_declared_transitions_only() {
        assert!(ServiceState::Pending.allows(ServiceState::Review));
        assert!(ServiceState::Review.allows(ServiceState::Warranty));
        assert!(ServiceState::Without.allows(ServiceState::Delivered));
        assert!(!ServiceState::Review.allows(ServiceState::Delivered));
        assert!(!ServiceState::Pending.allows(ServiceState::Ready));
        assert!(!ServiceState::Ready.allows(ServiceState::Review));
    }

    #[test]
    fn should_not_leave_delivered() {
        for to in ServiceState::ACTIONS {
            assert!(!ServiceState::Delivered.allows(to));
        }
        assert!(ServiceState::Delivered.is_terminal());
    }

    #[test]
    fn should_accept_new_lines_while_pending_or_in_review() {
        assert!(ServiceState::Pending.accepts_new_lines());
        assert!(ServiceState::Review.accepts_new_lines());
        assert!(!ServiceState::Warranty.accepts_new_lines());
        assert!(!ServiceState::Delivered.accepts_new_lines());
    }

    #[test]
    fn should_lock_existing_lines_after_pending() {
        assert!(ServiceState::Pending.are_lines_editable());
        assert!(!ServiceState::Review.are_lines_editable());
        assert!(!ServiceState::Ready.are_lines_editable());
    }

    #[test]
    fn should_parse_every_displayed_name() {
        for state in [
            ServiceState::Pending,
            ServiceState::Review,
            ServiceState::Ready,
            ServiceState::Without,
            ServiceState::Warranty,
            ServiceState::Delivered,
        ] {
            assert_eq!(state.to_string().parse::<ServiceState>().unwrap(), state);
        }
        assert!("cancelled".parse::<ServiceState>().is_err());
    }

    #[test]
    fn should_serialize_lowercase() {
        let json = serde_json::to_string(&ServiceState::Without).unwrap();
        assert_eq!(json, "\"without\"");
    }
}
