//! Status transition rules
//!
//! ```text
//! open        -> in_progress | blocked | closed(reason)
//! in_progress -> open | blocked | closed(reason)
//! blocked     -> open | in_progress | closed(reason)
//! closed      -> open
//! ```

use crate::models::{StateReason, Status};

/// Why a transition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Transition from {from} to {to} is not allowed")]
    NotAllowed { from: Status, to: Status },

    #[error("Closing from {from} requires a state_reason")]
    ReasonRequired { from: Status },
}

/// Pure state machine over [`Status`]
pub struct TransitionValidator;

impl TransitionValidator {
    /// Targets reachable from `from`
    pub fn allowed_targets(from: Status) -> &'static [Status] {
        match from {
            Status::Open => &[Status::InProgress, Status::Blocked, Status::Closed],
            Status::InProgress => &[Status::Open, Status::Blocked, Status::Closed],
            Status::Blocked => &[Status::Open, Status::InProgress, Status::Closed],
            Status::Closed => &[Status::Open],
        }
    }

    pub fn validate(
        from: Status,
        to: Status,
        reason: Option<StateReason>,
    ) -> Result<(), TransitionError> {
        if to == Status::Closed && reason.is_none() {
            return Err(TransitionError::ReasonRequired { from });
        }
        if !Self::allowed_targets(from).contains(&to) {
            return Err(TransitionError::NotAllowed { from, to });
        }
        Ok(())
    }

    pub fn can_transition(from: Status, to: Status, reason: Option<StateReason>) -> bool {
        Self::validate(from, to, reason).is_ok()
    }

    /// A reason passed for a target other than `closed` is ignored
    pub fn is_reason_misuse(to: Status, reason: Option<StateReason>) -> bool {
        to != Status::Closed && reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons() -> impl Iterator<Item = Option<StateReason>> {
        std::iter::once(None).chain(StateReason::ALL.into_iter().map(Some))
    }

    #[test]
    fn test_table() {
        use Status::*;
        let with_reason = Some(StateReason::Completed);

        assert!(TransitionValidator::can_transition(Open, InProgress, None));
        assert!(TransitionValidator::can_transition(Open, Blocked, None));
        assert!(TransitionValidator::can_transition(Open, Closed, with_reason));
        assert!(TransitionValidator::can_transition(InProgress, Open, None));
        assert!(TransitionValidator::can_transition(InProgress, Blocked, None));
        assert!(TransitionValidator::can_transition(InProgress, Closed, with_reason));
        assert!(TransitionValidator::can_transition(Blocked, Open, None));
        assert!(TransitionValidator::can_transition(Blocked, InProgress, None));
        assert!(TransitionValidator::can_transition(Blocked, Closed, with_reason));
        assert!(TransitionValidator::can_transition(Closed, Open, None));

        assert!(!TransitionValidator::can_transition(Closed, InProgress, None));
        assert!(!TransitionValidator::can_transition(Closed, Blocked, None));
        assert!(!TransitionValidator::can_transition(Closed, Closed, with_reason));
    }

    #[test]
    fn test_self_transitions_rejected() {
        for status in Status::ALL {
            for reason in reasons() {
                assert!(!TransitionValidator::can_transition(status, status, reason));
            }
        }
    }

    #[test]
    fn test_closing_requires_reason_from_every_state() {
        for from in Status::ALL {
            assert_eq!(
                TransitionValidator::validate(from, Status::Closed, None),
                Err(TransitionError::ReasonRequired { from })
            );
        }
    }

    #[test]
    fn test_reason_does_not_matter_for_other_targets() {
        for from in Status::ALL {
            for to in [Status::Open, Status::InProgress, Status::Blocked] {
                let expected = TransitionValidator::can_transition(from, to, None);
                for reason in reasons() {
                    assert_eq!(TransitionValidator::can_transition(from, to, reason), expected);
                }
            }
        }
    }

    #[test]
    fn test_reason_misuse() {
        assert!(TransitionValidator::is_reason_misuse(
            Status::Open,
            Some(StateReason::Cancelled)
        ));
        assert!(!TransitionValidator::is_reason_misuse(Status::Open, None));
        assert!(!TransitionValidator::is_reason_misuse(
            Status::Closed,
            Some(StateReason::Cancelled)
        ));
    }
}
