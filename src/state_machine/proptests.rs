//! Property-based tests for the turn state machine

use super::*;
use proptest::prelude::*;

fn arb_phase() -> impl Strategy<Value = TurnPhase> {
    prop_oneof![
        Just(TurnPhase::Idle),
        Just(TurnPhase::Submitting),
        Just(TurnPhase::Completed),
        Just(TurnPhase::Failed),
    ]
}

fn arb_event() -> impl Strategy<Value = TurnEvent> {
    prop_oneof![
        Just(TurnEvent::Submit),
        Just(TurnEvent::BackendReplied),
        Just(TurnEvent::BackendFailed),
        Just(TurnEvent::Settle),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Only an idle conversation accepts a new submission
    #[test]
    fn prop_in_flight_rejects_submit(phase in arb_phase()) {
        let result = transition(phase, TurnEvent::Submit);
        if phase.is_in_flight() {
            prop_assert_eq!(result, Err(TransitionError::AgentBusy));
        } else {
            prop_assert_eq!(result, Ok(TurnPhase::Submitting));
        }
    }

    /// Settle always returns to idle
    #[test]
    fn prop_settle_always_releases(phase in arb_phase()) {
        prop_assert_eq!(transition(phase, TurnEvent::Settle), Ok(TurnPhase::Idle));
    }

    /// Applying arbitrary events (ignoring rejected ones) never leaves the
    /// machine stuck: a Settle always brings it back to Idle
    #[test]
    fn prop_no_stuck_states(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut phase = TurnPhase::Idle;
        for event in events {
            if let Ok(next) = transition(phase, event) {
                phase = next;
            }
        }
        prop_assert_eq!(transition(phase, TurnEvent::Settle), Ok(TurnPhase::Idle));
    }

    /// Completed and Failed are only reachable from Submitting
    #[test]
    fn prop_outcomes_require_submitting(phase in arb_phase(), event in arb_event()) {
        if let Ok(next) = transition(phase, event) {
            if matches!(next, TurnPhase::Completed | TurnPhase::Failed) {
                prop_assert_eq!(phase, TurnPhase::Submitting);
            }
        }
    }
}
