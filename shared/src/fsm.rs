use rust_fsm::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Expire,
    WordsExhausted,
    Restart,
}

impl StateMachineImpl for SessionState {
    type Input = SessionEvent;
    type State = SessionState;
    type Output = ();

    const INITIAL_STATE: Self::State = SessionState::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (SessionState::Idle, SessionEvent::Start) => Some(SessionState::Running),
            (SessionState::Running, SessionEvent::Expire) => Some(SessionState::Finished),
            (SessionState::Running, SessionEvent::WordsExhausted) => Some(SessionState::Finished),
            // Restart is accepted from anywhere and always lands in Idle.
            (_, SessionEvent::Restart) => Some(SessionState::Idle),
            _ => None,
        }
    }

    fn output(_state: &Self::State, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Finished => "finished",
        };
        f.write_str(name)
    }
}
