//! Supervisor state machine states and the admissible-transition table.

/// Top-level supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BootState {
    /// Waiting for a session to start or a launch request.
    #[default]
    Idle,
    /// Transfer session in progress; DATA packets are being written.
    DfuActive,
    /// Transfer closed; the written image is being validated.
    DfuVerify,
    /// Validation passed; control is handed to the application.
    RunningApp,
    /// Quarantine: only diagnostic traffic is honoured until the hold expires.
    EmergencyRecovery,
    /// Fault hold; self-heals back to idle after the error hold.
    Error,
}

/// Number of supervisor states.
pub const BOOT_STATE_COUNT: usize = 6;

/// Admissible transitions, one row per originating state.
///
/// `Idle` additionally admits `DfuVerify`: a launch request validates the
/// resident image through the verify state before `RunningApp` is entered.
pub const ADMISSIBLE_TRANSITIONS: [(BootState, &[BootState]); BOOT_STATE_COUNT] = [
    (
        BootState::Idle,
        &[
            BootState::DfuActive,
            BootState::DfuVerify,
            BootState::RunningApp,
            BootState::EmergencyRecovery,
            BootState::Error,
        ],
    ),
    (
        BootState::DfuActive,
        &[
            BootState::DfuVerify,
            BootState::Idle,
            BootState::EmergencyRecovery,
            BootState::Error,
        ],
    ),
    (
        BootState::DfuVerify,
        &[
            BootState::RunningApp,
            BootState::Idle,
            BootState::EmergencyRecovery,
            BootState::Error,
        ],
    ),
    (
        BootState::RunningApp,
        &[
            BootState::Idle,
            BootState::EmergencyRecovery,
            BootState::Error,
        ],
    ),
    (
        BootState::EmergencyRecovery,
        &[BootState::Idle, BootState::Error],
    ),
    (BootState::Error, &[BootState::Idle, BootState::EmergencyRecovery]),
];

const _: () = assert_transition_table_shape();

const fn assert_transition_table_shape() {
    assert!(
        ADMISSIBLE_TRANSITIONS.len() == BOOT_STATE_COUNT,
        "transition table must carry one row per state"
    );

    let mut row = 0;
    while row < ADMISSIBLE_TRANSITIONS.len() {
        let (from, targets) = ADMISSIBLE_TRANSITIONS[row];
        assert!(!targets.is_empty(), "every state must have an exit");

        let mut index = 0;
        while index < targets.len() {
            assert!(
                !state_eq(targets[index], from),
                "no state may list itself as a target"
            );
            index += 1;
        }
        row += 1;
    }
}

const fn state_eq(a: BootState, b: BootState) -> bool {
    a as u8 == b as u8
}

impl BootState {
    /// Returns `true` when a session is carried in this state.
    #[must_use]
    pub const fn is_session_bearing(self) -> bool {
        matches!(self, Self::DfuActive | Self::DfuVerify)
    }

    /// Returns the admissible targets when leaving this state.
    #[must_use]
    pub const fn admissible_targets(self) -> &'static [Self] {
        let mut row = 0;
        while row < ADMISSIBLE_TRANSITIONS.len() {
            let (from, targets) = ADMISSIBLE_TRANSITIONS[row];
            if state_eq(from, self) {
                return targets;
            }
            row += 1;
        }
        &[]
    }
}

/// Returns `true` when the machine may move from `from` to `to`.
#[must_use]
pub const fn transition_allowed(from: BootState, to: BootState) -> bool {
    let targets = from.admissible_targets();
    let mut index = 0;
    while index < targets.len() {
        if state_eq(targets[index], to) {
            return true;
        }
        index += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{transition_allowed, BootState, ADMISSIBLE_TRANSITIONS, BOOT_STATE_COUNT};

    const ALL_STATES: [BootState; BOOT_STATE_COUNT] = [
        BootState::Idle,
        BootState::DfuActive,
        BootState::DfuVerify,
        BootState::RunningApp,
        BootState::EmergencyRecovery,
        BootState::Error,
    ];

    #[test]
    fn default_state_is_idle() {
        assert_eq!(BootState::default(), BootState::Idle);
    }

    #[test]
    fn lookup_agrees_with_the_table_for_every_pair() {
        for from in ALL_STATES {
            let row = ADMISSIBLE_TRANSITIONS
                .iter()
                .find(|(state, _)| *state == from)
                .expect("table row per state");
            for to in ALL_STATES {
                assert_eq!(transition_allowed(from, to), row.1.contains(&to));
            }
        }
    }

    #[test]
    fn every_other_state_can_enter_error() {
        for from in ALL_STATES {
            if from == BootState::Error {
                continue;
            }
            assert!(
                transition_allowed(from, BootState::Error),
                "{from:?} must admit the error state"
            );
        }
    }

    #[test]
    fn self_transitions_are_never_admissible() {
        for state in ALL_STATES {
            assert!(!transition_allowed(state, state));
        }
    }

    #[test]
    fn quarantine_only_exits_to_idle_or_error() {
        assert!(transition_allowed(
            BootState::EmergencyRecovery,
            BootState::Idle
        ));
        assert!(transition_allowed(
            BootState::EmergencyRecovery,
            BootState::Error
        ));
        assert!(!transition_allowed(
            BootState::EmergencyRecovery,
            BootState::DfuActive
        ));
        assert!(!transition_allowed(
            BootState::EmergencyRecovery,
            BootState::RunningApp
        ));
    }

    #[test]
    fn session_bearing_states_are_exactly_the_transfer_states() {
        assert!(BootState::DfuActive.is_session_bearing());
        assert!(BootState::DfuVerify.is_session_bearing());
        assert!(!BootState::Idle.is_session_bearing());
        assert!(!BootState::RunningApp.is_session_bearing());
        assert!(!BootState::EmergencyRecovery.is_session_bearing());
        assert!(!BootState::Error.is_session_bearing());
    }
}
