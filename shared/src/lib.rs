//! Typing-test engine shared by the server and the browser front end.

pub mod classify;
pub mod clock;
pub mod error;
pub mod fsm;
pub mod leaderboard;
pub mod protocol;
pub mod session;
pub mod stats;
pub mod words;

pub use classify::{Correctness, TypedCharacterRecord};
pub use clock::{Countdown, ManualScheduler, Scheduler, Tick};
pub use error::SessionError;
pub use fsm::SessionState;
pub use session::{Session, SessionConfig, TickOutcome};
pub use stats::ResultSummary;
pub use words::{RandomWords, TargetWord, WordList, WordSource};
