//! Contract lifecycle state machine
//!
//! A contract moves forward through a fixed approval pipeline:
//!
//! ```text
//! created -> approved -> sent -> signed -> locked
//!    |          |         |
//!    +----------+---------+--> revoked
//! ```
//!
//! `locked` and `revoked` are terminal. There is deliberately no
//! `signed -> revoked` edge: once signed, the only move is to lock.
//!
//! All operations here are pure functions over the state enum; persistence
//! and transport live elsewhere. Callers parse incoming state strings with
//! `FromStr` before they ever reach the table, so the table itself is total
//! over the six states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a contract. Closed set, serialized as lowercase strings.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContractState {
    #[default]
    Created,
    Approved,
    Sent,
    Signed,
    Locked,
    Revoked,
}

impl ContractState {
    /// All six states, in pipeline order.
    pub const ALL: [ContractState; 6] = [
        ContractState::Created,
        ContractState::Approved,
        ContractState::Sent,
        ContractState::Signed,
        ContractState::Locked,
        ContractState::Revoked,
    ];

    /// The allowed-to set for this state. Empty for terminal states.
    pub fn next_states(self) -> &'static [ContractState] {
        match self {
            ContractState::Created => &[ContractState::Approved, ContractState::Revoked],
            ContractState::Approved => &[ContractState::Sent, ContractState::Revoked],
            ContractState::Sent => &[ContractState::Signed, ContractState::Revoked],
            ContractState::Signed => &[ContractState::Locked],
            ContractState::Locked => &[],
            ContractState::Revoked => &[],
        }
    }

    /// Whether a move from this state to `to` is allowed by the table.
    pub fn can_transition(self, to: ContractState) -> bool {
        self.next_states().contains(&to)
    }

    /// Terminal states have an empty allowed-to set.
    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    /// Field values may only be mutated while the contract is editable.
    /// Derived from state, never stored.
    pub fn is_editable(self) -> bool {
        !matches!(self, ContractState::Locked | ContractState::Revoked)
    }

    /// Lowercase wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            ContractState::Created => "created",
            ContractState::Approved => "approved",
            ContractState::Sent => "sent",
            ContractState::Signed => "signed",
            ContractState::Locked => "locked",
            ContractState::Revoked => "revoked",
        }
    }
}

impl fmt::Display for ContractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ContractState::Created),
            "approved" => Ok(ContractState::Approved),
            "sent" => Ok(ContractState::Sent),
            "signed" => Ok(ContractState::Signed),
            "locked" => Ok(ContractState::Locked),
            "revoked" => Ok(ContractState::Revoked),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// A state string that is not one of the six lifecycle states.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown contract state '{0}'")]
pub struct UnknownState(pub String);

/// Requested state change is not in the allowed-to set for the current state.
/// Recoverable; the contract is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid state transition from {from} to {to}")]
pub struct TransitionError {
    pub from: ContractState,
    pub to: ContractState,
}

/// Field mutation attempted while the contract is not editable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot edit contract in {state} state")]
pub struct EditabilityError {
    pub state: ContractState,
}

/// User-visible list groupings over `state`. Not part of the state machine,
/// but the filters the dashboard exposes must match these sets exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFilter {
    /// created or approved
    Active,
    /// sent, awaiting signature
    Pending,
    /// signed or locked
    Signed,
}

impl ContractFilter {
    pub fn states(self) -> &'static [ContractState] {
        match self {
            ContractFilter::Active => &[ContractState::Created, ContractState::Approved],
            ContractFilter::Pending => &[ContractState::Sent],
            ContractFilter::Signed => &[ContractState::Signed, ContractState::Locked],
        }
    }
}

impl FromStr for ContractFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ContractFilter::Active),
            "pending" => Ok(ContractFilter::Pending),
            "signed" => Ok(ContractFilter::Signed),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContractState::*;

    #[test]
    fn test_transition_table_exact() {
        assert_eq!(Created.next_states(), &[Approved, Revoked]);
        assert_eq!(Approved.next_states(), &[Sent, Revoked]);
        assert_eq!(Sent.next_states(), &[Signed, Revoked]);
        assert_eq!(Signed.next_states(), &[Locked]);
        assert_eq!(Locked.next_states(), &[] as &[ContractState]);
        assert_eq!(Revoked.next_states(), &[] as &[ContractState]);
    }

    #[test]
    fn test_can_transition_iff_in_next_states() {
        for from in ContractState::ALL {
            for to in ContractState::ALL {
                assert_eq!(
                    from.can_transition(to),
                    from.next_states().contains(&to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_self_transition_always_rejected() {
        for state in ContractState::ALL {
            assert!(!state.can_transition(state), "{state} -> {state} must fail");
        }
    }

    #[test]
    fn test_signed_offers_only_locked() {
        // No revocation path once signed.
        assert_eq!(Signed.next_states(), &[Locked]);
        assert!(!Signed.can_transition(Revoked));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Locked.is_terminal());
        assert!(Revoked.is_terminal());
        for state in [Created, Approved, Sent, Signed] {
            assert!(!state.is_terminal(), "{state} is not terminal");
        }
    }

    #[test]
    fn test_editable_iff_not_locked_or_revoked() {
        for state in ContractState::ALL {
            let expected = !matches!(state, Locked | Revoked);
            assert_eq!(state.is_editable(), expected, "{state}");
        }
    }

    #[test]
    fn test_state_string_round_trip() {
        for state in ContractState::ALL {
            let parsed: ContractState = state.as_str().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("pending".parse::<ContractState>().is_err());
        assert!("".parse::<ContractState>().is_err());
        // Case sensitive, like the original API
        assert!("Created".parse::<ContractState>().is_err());
    }

    #[test]
    fn test_state_serde_lowercase() {
        let json = serde_json::to_string(&Approved).unwrap();
        assert_eq!(json, r#""approved""#);
        let back: ContractState = serde_json::from_str(r#""revoked""#).unwrap();
        assert_eq!(back, Revoked);
        assert!(serde_json::from_str::<ContractState>(r#""archived""#).is_err());
    }

    #[test]
    fn test_filter_groupings() {
        assert_eq!(ContractFilter::Active.states(), &[Created, Approved]);
        assert_eq!(ContractFilter::Pending.states(), &[Sent]);
        assert_eq!(ContractFilter::Signed.states(), &[Signed, Locked]);
        assert_eq!("active".parse::<ContractFilter>(), Ok(ContractFilter::Active));
        assert!("everything".parse::<ContractFilter>().is_err());
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = TransitionError { from: Approved, to: Signed };
        let msg = err.to_string();
        assert!(msg.contains("approved"));
        assert!(msg.contains("signed"));
    }

    #[test]
    fn test_editability_error_names_blocking_state() {
        let err = EditabilityError { state: Locked };
        assert!(err.to_string().contains("locked"));
    }
}
