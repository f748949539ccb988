//! Candidate progression — the single state machine consulted by every stage
//! route. No route decides pass/fail on its own; they all call `advance` with
//! the stage's threshold verdict and persist whatever comes back.

pub mod handlers;
pub mod recorder;

use crate::errors::AppError;

/// Where a candidate stands in the hiring process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Applied,
    InRound(u32),
    RoundPassed(u32),
    RoundFailed(u32),
    Shortlisted,
    Rejected,
    Hired,
}

impl CandidateState {
    /// True for states that admit no further scoring.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CandidateState::Shortlisted | CandidateState::Rejected | CandidateState::Hired
        )
    }

    /// Serializes the state for the `candidates.state` text column.
    pub fn encode(&self) -> String {
        match self {
            CandidateState::Applied => "applied".to_string(),
            CandidateState::InRound(n) => format!("in_round:{n}"),
            CandidateState::RoundPassed(n) => format!("round_passed:{n}"),
            CandidateState::RoundFailed(n) => format!("round_failed:{n}"),
            CandidateState::Shortlisted => "shortlisted".to_string(),
            CandidateState::Rejected => "rejected".to_string(),
            CandidateState::Hired => "hired".to_string(),
        }
    }

    pub fn decode(raw: &str) -> Option<CandidateState> {
        match raw {
            "applied" => return Some(CandidateState::Applied),
            "shortlisted" => return Some(CandidateState::Shortlisted),
            "rejected" => return Some(CandidateState::Rejected),
            "hired" => return Some(CandidateState::Hired),
            _ => {}
        }
        let (tag, n) = raw.split_once(':')?;
        let n: u32 = n.parse().ok()?;
        match tag {
            "in_round" => Some(CandidateState::InRound(n)),
            "round_passed" => Some(CandidateState::RoundPassed(n)),
            "round_failed" => Some(CandidateState::RoundFailed(n)),
            _ => None,
        }
    }
}

/// Marks the candidate as actively in a round (interview token issued,
/// coding attempt opened). Idempotent for the same round.
pub fn begin_round(state: CandidateState, round: u32) -> Result<CandidateState, AppError> {
    match state {
        CandidateState::Applied => Ok(CandidateState::InRound(round)),
        CandidateState::InRound(n) if n <= round => Ok(CandidateState::InRound(round)),
        CandidateState::RoundPassed(n) if n < round => Ok(CandidateState::InRound(round)),
        _ => Err(AppError::Validation(format!(
            "candidate in state '{}' cannot begin round {round}",
            state.encode()
        ))),
    }
}

/// Applies a scored round through the transition function.
///
/// Passing the final round shortlists the candidate; passing an earlier
/// round moves to RoundPassed(n); failing moves to RoundFailed(n). Terminal
/// states and already-failed candidates reject further scoring.
pub fn advance(
    state: CandidateState,
    round: u32,
    passed: bool,
    total_rounds: u32,
) -> Result<CandidateState, AppError> {
    if state.is_terminal() || matches!(state, CandidateState::RoundFailed(_)) {
        return Err(AppError::Validation(format!(
            "candidate in state '{}' cannot be scored for round {round}",
            state.encode()
        )));
    }
    if passed {
        if round >= total_rounds {
            Ok(CandidateState::Shortlisted)
        } else {
            Ok(CandidateState::RoundPassed(round))
        }
    } else {
        Ok(CandidateState::RoundFailed(round))
    }
}

/// Job policy applied after a failed round. Single-elimination: a failed
/// round rejects the candidate outright.
pub fn apply_rejection_policy(state: CandidateState) -> CandidateState {
    match state {
        CandidateState::RoundFailed(_) => CandidateState::Rejected,
        other => other,
    }
}

/// Shortlisted → Hired, by explicit HR decision only.
pub fn hire(state: CandidateState) -> Result<CandidateState, AppError> {
    match state {
        CandidateState::Shortlisted => Ok(CandidateState::Hired),
        _ => Err(AppError::Validation(format!(
            "only shortlisted candidates can be hired (state: '{}')",
            state.encode()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let states = [
            CandidateState::Applied,
            CandidateState::InRound(2),
            CandidateState::RoundPassed(3),
            CandidateState::RoundFailed(1),
            CandidateState::Shortlisted,
            CandidateState::Rejected,
            CandidateState::Hired,
        ];
        for s in states {
            assert_eq!(CandidateState::decode(&s.encode()), Some(s));
        }
    }

    #[test]
    fn test_decode_garbage_returns_none() {
        assert_eq!(CandidateState::decode("limbo"), None);
        assert_eq!(CandidateState::decode("in_round:x"), None);
        assert_eq!(CandidateState::decode("in_round"), None);
    }

    #[test]
    fn test_pass_intermediate_round() {
        let next = advance(CandidateState::InRound(1), 1, true, 3).unwrap();
        assert_eq!(next, CandidateState::RoundPassed(1));
    }

    #[test]
    fn test_pass_final_round_shortlists() {
        let next = advance(CandidateState::InRound(3), 3, true, 3).unwrap();
        assert_eq!(next, CandidateState::Shortlisted);
    }

    #[test]
    fn test_fail_then_rejection_policy() {
        let next = advance(CandidateState::Applied, 1, false, 3).unwrap();
        assert_eq!(next, CandidateState::RoundFailed(1));
        assert_eq!(apply_rejection_policy(next), CandidateState::Rejected);
    }

    #[test]
    fn test_rejection_policy_leaves_other_states_alone() {
        assert_eq!(
            apply_rejection_policy(CandidateState::RoundPassed(2)),
            CandidateState::RoundPassed(2)
        );
    }

    #[test]
    fn test_terminal_states_cannot_be_scored() {
        for s in [
            CandidateState::Shortlisted,
            CandidateState::Rejected,
            CandidateState::Hired,
            CandidateState::RoundFailed(1),
        ] {
            assert!(advance(s, 2, true, 3).is_err(), "{s:?} should not score");
        }
    }

    #[test]
    fn test_begin_round_from_applied_and_passed() {
        assert_eq!(
            begin_round(CandidateState::Applied, 1).unwrap(),
            CandidateState::InRound(1)
        );
        assert_eq!(
            begin_round(CandidateState::RoundPassed(1), 2).unwrap(),
            CandidateState::InRound(2)
        );
    }

    #[test]
    fn test_begin_round_idempotent() {
        assert_eq!(
            begin_round(CandidateState::InRound(2), 2).unwrap(),
            CandidateState::InRound(2)
        );
    }

    #[test]
    fn test_begin_round_rejects_backward_and_terminal() {
        assert!(begin_round(CandidateState::RoundPassed(3), 2).is_err());
        assert!(begin_round(CandidateState::Rejected, 1).is_err());
    }

    #[test]
    fn test_hire_only_from_shortlisted() {
        assert_eq!(
            hire(CandidateState::Shortlisted).unwrap(),
            CandidateState::Hired
        );
        assert!(hire(CandidateState::Applied).is_err());
        assert!(hire(CandidateState::Hired).is_err());
    }
}
