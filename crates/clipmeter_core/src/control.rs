/// Run state of the change monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Running,
    Paused,
}

/// Discrete control input understood by the change monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Toggle,
}

impl ControlState {
    pub fn is_paused(self) -> bool {
        self == ControlState::Paused
    }

    /// Applies one signal and returns the next state.
    pub fn apply(self, signal: ControlSignal) -> ControlState {
        match (self, signal) {
            (ControlState::Running, ControlSignal::Toggle) => ControlState::Paused,
            (ControlState::Paused, ControlSignal::Toggle) => ControlState::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlSignal, ControlState};

    #[test]
    fn toggle_alternates_between_states() {
        let state = ControlState::default();
        assert_eq!(state, ControlState::Running);

        let state = state.apply(ControlSignal::Toggle);
        assert!(state.is_paused());

        let state = state.apply(ControlSignal::Toggle);
        assert_eq!(state, ControlState::Running);
    }
}
