use thiserror::Error;

use crate::fsm::SessionState;

/// Errors surfaced by the session engine. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while session is {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: SessionState,
    },

    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}
