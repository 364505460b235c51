//! Participant-side transaction states
//!
//! Participants expose their per-transaction state through the state query,
//! so the label is part of the shared vocabulary. The transition table lives
//! here as well; the participant engine consults it before every write.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of one transaction as recorded by a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParticipantState {
    /// Request seen, no vote recorded (also the answer for unseen transactions)
    Init,
    /// Voted YES to PREPARE and waiting for the decision (2PC)
    Ready,
    /// Acknowledged PRE_COMMIT (3PC)
    #[serde(rename = "PRECOMMITTED")]
    PreCommitted,
    Committed,
    Aborted,
}

impl ParticipantState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Ready => "READY",
            Self::PreCommitted => "PRECOMMITTED",
            Self::Committed => "COMMITTED",
            Self::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    /// Whether moving from `self` to `next` is a forward step
    ///
    /// Re-entering the current state is not a transition; callers treat it as
    /// a redelivery.
    pub fn can_transition_to(&self, next: ParticipantState) -> bool {
        use ParticipantState::*;

        matches!(
            (self, next),
            (Init, Ready | PreCommitted | Committed | Aborted)
                | (Ready, Committed | Aborted)
                | (PreCommitted, Committed | Aborted)
        )
    }
}

impl FromStr for ParticipantState {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INIT" => Ok(Self::Init),
            "READY" => Ok(Self::Ready),
            "PRECOMMITTED" => Ok(Self::PreCommitted),
            "COMMITTED" => Ok(Self::Committed),
            "ABORTED" => Ok(Self::Aborted),
            _ => Err(CommonError::UnknownState(s.to_string())),
        }
    }
}

impl fmt::Display for ParticipantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParticipantState::*;

    #[test]
    fn test_terminal_states_are_final() {
        for next in [Init, Ready, PreCommitted, Committed, Aborted] {
            assert!(!Committed.can_transition_to(next));
            assert!(!Aborted.can_transition_to(next));
        }
    }

    #[test]
    fn test_two_phase_path() {
        assert!(Init.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Committed));
        assert!(Ready.can_transition_to(Aborted));
        assert!(!Ready.can_transition_to(PreCommitted));
        assert!(!Ready.can_transition_to(Init));
    }

    #[test]
    fn test_three_phase_path() {
        assert!(Init.can_transition_to(PreCommitted));
        assert!(PreCommitted.can_transition_to(Committed));
        assert!(PreCommitted.can_transition_to(Aborted));
        assert!(!PreCommitted.can_transition_to(Ready));
    }

    #[test]
    fn test_wire_label() {
        assert_eq!(
            serde_json::to_string(&PreCommitted).unwrap(),
            "\"PRECOMMITTED\""
        );
        assert_eq!("READY".parse::<ParticipantState>().unwrap(), Ready);
    }
}
