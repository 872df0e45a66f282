//! The typing-test session engine.
//!
//! A [`Session`] owns the history of every keystroke, the buffer for the word
//! being typed and the countdown. Hosts feed it keystrokes in arrival order and
//! forward scheduler firings to [`Session::on_tick`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{classify_next, word_cursor, Correctness, TypedCharacterRecord};
use crate::clock::{Countdown, Scheduler, Tick};
use crate::error::SessionError;
use crate::fsm::{SessionEvent, SessionState};
use crate::stats::{summarize, ResultSummary};
use crate::words::{TargetWord, WordSource};
use rust_fsm::StateMachineImpl;

pub const TIME_PRESETS_MS: [u64; 4] = [15_000, 30_000, 60_000, 120_000];
pub const DEFAULT_DURATION_MS: u64 = 30_000;

/// Words fetched ahead of the cursor so a host can render what comes next.
pub const LOOKAHEAD_WORDS: usize = 40;

/// Recorded as the expected character of an accepted word boundary.
pub const WORD_SEPARATOR: char = ' ';

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub duration_ms: u64,
    /// Let the first keystroke in `Idle` start the session.
    pub start_on_first_keystroke: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            start_on_first_keystroke: true,
        }
    }
}

impl SessionConfig {
    pub fn with_duration_ms(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.duration_ms == 0 {
            return Err(SessionError::InvalidConfig(
                "duration_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Remaining(u64),
    Expired(ResultSummary),
    Ignored,
}

pub struct Session<S: Scheduler> {
    config: SessionConfig,
    state: SessionState,
    countdown: Countdown<S>,
    source: Box<dyn WordSource>,
    words: Vec<TargetWord>,
    word_index: usize,
    buffer: Vec<TypedCharacterRecord>,
    history: Vec<TypedCharacterRecord>,
    started_at_ms: Option<u64>,
    result: Option<ResultSummary>,
}

impl<S: Scheduler> Session<S> {
    pub fn new(
        config: SessionConfig,
        scheduler: S,
        source: Box<dyn WordSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let mut session = Self {
            countdown: Countdown::new(scheduler, config.duration_ms),
            config,
            state: SessionState::default(),
            source,
            words: Vec::new(),
            word_index: 0,
            buffer: Vec::new(),
            history: Vec::new(),
            started_at_ms: None,
            result: None,
        };
        session.fill_lookahead();
        Ok(session)
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.apply(SessionEvent::Start, "start")?;
        self.clear_progress();
        self.countdown.start();
        self.started_at_ms = Some(self.countdown.now_ms());
        info!(
            "session_started duration_ms = {} words_ready = {}",
            self.config.duration_ms,
            self.words.len()
        );

        if self.words.is_empty() {
            self.finish(SessionEvent::WordsExhausted);
        }
        Ok(())
    }

    /// Feed one keystroke. Every accepted keystroke appends exactly one record
    /// to the history; rejected ones change nothing.
    pub fn submit_character(&mut self, ch: char) -> Result<Correctness, SessionError> {
        if self.state == SessionState::Idle && self.config.start_on_first_keystroke {
            self.start()?;
        }
        let Some(word) = self.current_word().filter(|_| self.state == SessionState::Running)
        else {
            debug!("keystroke_rejected state = {}", self.state);
            return Err(SessionError::InvalidStateTransition {
                action: "submit a character",
                state: self.state,
            });
        };

        let word_len = word.len();
        if ch.is_whitespace() && word_cursor(&self.buffer) >= word_len {
            self.history.push(TypedCharacterRecord {
                typed: ch,
                expected: Some(WORD_SEPARATOR),
                correctness: Correctness::Matched,
            });
            self.advance_word();
            return Ok(Correctness::Matched);
        }

        let record = classify_next(word, &self.buffer, ch);
        self.buffer.push(record);
        self.history.push(record);

        let word_complete =
            record.correctness != Correctness::Extra && word_cursor(&self.buffer) == word_len;
        if word_complete && !self.has_next_word() && self.buffer_has_no_mismatch() {
            self.finish(SessionEvent::WordsExhausted);
        }
        Ok(record.correctness)
    }

    /// Backspace within the current word. Never reaches back into a finished
    /// word; on an empty buffer this returns `Ok(None)`. The history is left
    /// untouched.
    pub fn delete_last_character(&mut self) -> Result<Option<TypedCharacterRecord>, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::InvalidStateTransition {
                action: "delete a character",
                state: self.state,
            });
        }
        Ok(self.buffer.pop())
    }

    /// Forward one scheduler firing.
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.state != SessionState::Running {
            return TickOutcome::Ignored;
        }
        match self.countdown.on_tick() {
            Tick::Remaining(secs) => TickOutcome::Remaining(secs),
            Tick::Expired => match self.finish(SessionEvent::Expire) {
                Some(summary) => TickOutcome::Expired(summary),
                None => TickOutcome::Ignored,
            },
            Tick::Ignored => TickOutcome::Ignored,
        }
    }

    /// Back to `Idle` from any state.
    pub fn restart(&mut self) {
        if let Some(next) = SessionState::transition(&self.state, &SessionEvent::Restart) {
            debug!("session_transition {} -> {}", self.state, next);
            self.state = next;
        }
        self.countdown.reset();
        self.source.rewind();
        self.words.clear();
        self.clear_progress();
        self.fill_lookahead();
    }

    /// Pick a new duration; the session restarts.
    pub fn set_duration(&mut self, duration_ms: u64) -> Result<(), SessionError> {
        let config = SessionConfig {
            duration_ms,
            ..self.config.clone()
        };
        config.validate()?;
        self.countdown.set_duration_ms(duration_ms);
        self.config = config;
        self.restart();
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &[TypedCharacterRecord] {
        &self.history
    }

    pub fn buffer(&self) -> &[TypedCharacterRecord] {
        &self.buffer
    }

    pub fn words(&self) -> &[TargetWord] {
        &self.words
    }

    pub fn current_word_index(&self) -> usize {
        self.word_index
    }

    pub fn current_word(&self) -> Option<&TargetWord> {
        self.words.get(self.word_index)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    pub fn result(&self) -> Option<&ResultSummary> {
        self.result.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        self.countdown.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.countdown.scheduler_mut()
    }

    fn apply(&mut self, event: SessionEvent, action: &'static str) -> Result<(), SessionError> {
        match SessionState::transition(&self.state, &event) {
            Some(next) => {
                debug!("session_transition {} -> {} on {:?}", self.state, next, event);
                self.state = next;
                Ok(())
            }
            None => Err(SessionError::InvalidStateTransition {
                action,
                state: self.state,
            }),
        }
    }

    fn finish(&mut self, event: SessionEvent) -> Option<ResultSummary> {
        self.apply(event, "finish").ok()?;
        self.countdown.stop();

        // the clock counts whole seconds, so a partial second runs to the end
        let counted_ms = self.countdown.duration_secs().saturating_mul(1000);
        let elapsed_ms = match event {
            SessionEvent::Expire => counted_ms,
            _ => {
                let started = self.started_at_ms.unwrap_or_else(|| self.countdown.now_ms());
                self.countdown
                    .now_ms()
                    .saturating_sub(started)
                    .min(counted_ms)
            }
        };
        let summary = summarize(&self.history, elapsed_ms);
        info!(
            "session_finished reason = {:?} wpm = {:.1} accuracy = {:.1} chars = {}",
            event, summary.wpm, summary.accuracy, summary.total_characters
        );
        self.result = Some(summary);
        Some(summary)
    }

    fn advance_word(&mut self) {
        self.word_index += 1;
        self.buffer.clear();
        self.fill_lookahead();
        if self.current_word().is_none() {
            self.finish(SessionEvent::WordsExhausted);
        }
    }

    fn has_next_word(&self) -> bool {
        self.word_index + 1 < self.words.len()
    }

    fn buffer_has_no_mismatch(&self) -> bool {
        self.buffer
            .iter()
            .all(|r| r.correctness != Correctness::Mismatched)
    }

    fn fill_lookahead(&mut self) {
        while self.words.len() < self.word_index + LOOKAHEAD_WORDS {
            match self.source.next() {
                Some(word) => self.words.push(word),
                None => break,
            }
        }
    }

    fn clear_progress(&mut self) {
        self.history.clear();
        self.buffer.clear();
        self.word_index = 0;
        self.started_at_ms = None;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualScheduler;
    use crate::words::WordList;

    fn session(text: &str, duration_ms: u64) -> Session<ManualScheduler> {
        Session::new(
            SessionConfig::with_duration_ms(duration_ms),
            ManualScheduler::new(),
            Box::new(WordList::from_text(text)),
        )
        .unwrap()
    }

    fn type_str(session: &mut Session<ManualScheduler>, text: &str) {
        for ch in text.chars() {
            session.submit_character(ch).unwrap();
        }
    }

    #[test]
    fn test_first_keystroke_starts() {
        let mut s = session("alpha beta", 30_000);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.submit_character('a'), Ok(Correctness::Matched));
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.scheduler().active_timers(), 1);
    }

    #[test]
    fn test_idle_rejects_without_auto_start() {
        let config = SessionConfig {
            duration_ms: 30_000,
            start_on_first_keystroke: false,
        };
        let mut s = Session::new(
            config,
            ManualScheduler::new(),
            Box::new(WordList::from_text("alpha")),
        )
        .unwrap();
        assert!(matches!(
            s.submit_character('a'),
            Err(SessionError::InvalidStateTransition {
                state: SessionState::Idle,
                ..
            })
        ));
        assert!(s.history().is_empty());
        assert!(s.delete_last_character().is_err());
    }

    fn count(s: &Session<ManualScheduler>, kind: Correctness) -> usize {
        s.history().iter().filter(|r| r.correctness == kind).count()
    }

    #[test]
    fn test_hello_with_doubled_letter() {
        let mut s = session("hello world", 10_000);
        type_str(&mut s, "helllo");
        assert_eq!(s.history().len(), 6);
        assert_eq!(count(&s, Correctness::Matched), 5);
        assert_eq!(count(&s, Correctness::Extra), 1);
        assert_eq!(s.history()[4].correctness, Correctness::Extra);
        assert_eq!(s.current_word_index(), 0);

        for _ in 0..10 {
            s.on_tick();
        }
        let summary = s.result().unwrap();
        assert!((summary.accuracy - 83.333).abs() < 0.01);
        assert!((summary.error_rate - 16.667).abs() < 0.01);
    }

    #[test]
    fn test_doubled_letter_still_advances() {
        let mut s = session("hello world", 30_000);
        type_str(&mut s, "helllo ");
        assert_eq!(s.current_word_index(), 1);
        assert_eq!(s.current_word(), Some(&TargetWord::new("world")));
    }

    #[test]
    fn test_doubled_letter_finishes_last_word() {
        let mut s = session("hello", 30_000);
        type_str(&mut s, "helllo");
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(s.result().unwrap().total_characters, 6);
    }

    #[test]
    fn test_extra_after_word_counts_against_accuracy() {
        let mut s = session("hello world", 10_000);
        type_str(&mut s, "helloo");
        assert_eq!(s.history()[5].correctness, Correctness::Extra);
        for _ in 0..10 {
            s.on_tick();
        }
        assert!((s.result().unwrap().accuracy - 83.333).abs() < 0.01);
    }

    #[test]
    fn test_space_advances_only_after_word_length() {
        let mut s = session("cat dog", 30_000);
        type_str(&mut s, "ca");
        assert_eq!(s.submit_character(' '), Ok(Correctness::Mismatched));
        assert_eq!(s.current_word_index(), 0);
        assert_eq!(s.buffer().len(), 3);

        assert_eq!(s.submit_character(' '), Ok(Correctness::Matched));
        assert_eq!(s.current_word_index(), 1);
        assert!(s.buffer().is_empty());
        assert_eq!(s.history().len(), 4);
        assert_eq!(s.current_word(), Some(&TargetWord::new("dog")));
    }

    #[test]
    fn test_backspace_stays_in_word() {
        let mut s = session("cat dog", 30_000);
        type_str(&mut s, "cat ");
        assert_eq!(s.delete_last_character(), Ok(None));
        assert_eq!(s.current_word_index(), 1);

        type_str(&mut s, "dx");
        let removed = s.delete_last_character().unwrap().unwrap();
        assert_eq!(removed.typed, 'x');
        assert_eq!(s.buffer().len(), 1);
        // history is append-only
        assert_eq!(s.history().len(), 6);

        assert_eq!(s.submit_character('o'), Ok(Correctness::Matched));
    }

    #[test]
    fn test_expiry_finishes_with_configured_duration() {
        let mut s = session("a b c d e f g h", 3_000);
        type_str(&mut s, "a b");
        assert_eq!(s.on_tick(), TickOutcome::Remaining(2));
        assert_eq!(s.on_tick(), TickOutcome::Remaining(1));
        let TickOutcome::Expired(summary) = s.on_tick() else {
            panic!("expected expiry");
        };
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(summary.total_time_ms, 3_000);
        assert_eq!(summary.total_characters, 3);
        assert_eq!(s.result(), Some(&summary));
        assert_eq!(s.on_tick(), TickOutcome::Ignored);
        assert!(s.submit_character('c').is_err());
        assert!(s.delete_last_character().is_err());
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn test_partial_second_reports_counted_time() {
        let mut s = session("a b c", 1_500);
        type_str(&mut s, "a");
        assert_eq!(s.on_tick(), TickOutcome::Remaining(1));
        let TickOutcome::Expired(summary) = s.on_tick() else {
            panic!("expected expiry");
        };
        assert_eq!(summary.total_time_ms, 2_000);
    }

    #[test]
    fn test_backspace_then_retype_finishes_last_word() {
        let mut s = session("hi", 60_000);
        type_str(&mut s, "hx");
        assert_eq!(s.state(), SessionState::Running);
        s.delete_last_character().unwrap();
        assert_eq!(s.submit_character('i'), Ok(Correctness::Matched));
        assert_eq!(s.state(), SessionState::Finished);
        // the backspaced key still counts
        assert_eq!(s.result().unwrap().total_characters, 3);
        assert_eq!(s.scheduler().active_timers(), 0);
    }

    #[test]
    fn test_finishing_last_word_ends_session() {
        let mut s = session("hi yo", 60_000);
        s.start().unwrap();
        s.scheduler_mut().advance(2_000);
        type_str(&mut s, "hi yo");
        assert_eq!(s.state(), SessionState::Finished);
        let summary = s.result().copied().unwrap();
        assert_eq!(summary.total_time_ms, 2_000);
        assert_eq!(summary.total_characters, 5);
        assert_eq!(summary.accuracy, 100.0);
        assert_eq!(s.scheduler().active_timers(), 0);
    }

    #[test]
    fn test_wrong_last_word_needs_boundary() {
        let mut s = session("hi", 60_000);
        type_str(&mut s, "hx");
        assert_eq!(s.state(), SessionState::Running);
        s.submit_character(' ').unwrap();
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(s.result().unwrap().total_characters, 3);
    }

    #[test]
    fn test_empty_source_finishes_on_start() {
        let mut s = session("   ", 30_000);
        s.start().unwrap();
        assert_eq!(s.state(), SessionState::Finished);
        let summary = s.result().unwrap();
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.wpm, 0.0);
    }

    #[test]
    fn test_restart_from_every_state() {
        let mut s = session("one two three", 10_000);
        s.restart();
        assert_eq!(s.state(), SessionState::Idle);

        type_str(&mut s, "one t");
        s.restart();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.history().is_empty());
        assert_eq!(s.current_word_index(), 0);
        assert_eq!(s.scheduler().active_timers(), 0);

        type_str(&mut s, "o");
        for _ in 0..10 {
            s.on_tick();
        }
        assert_eq!(s.state(), SessionState::Finished);
        s.restart();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.result().is_none());
        assert_eq!(s.remaining_secs(), 10);
        assert_eq!(s.current_word(), Some(&TargetWord::new("one")));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut s = session("one", 10_000);
        s.start().unwrap();
        assert!(s.start().is_err());
        assert_eq!(s.scheduler().active_timers(), 1);
    }

    #[test]
    fn test_set_duration() {
        let mut s = session("one two", 30_000);
        type_str(&mut s, "on");
        s.set_duration(60_000).unwrap();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.remaining_secs(), 60);
        assert!(s.set_duration(0).is_err());
        assert_eq!(s.config().duration_ms, 60_000);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = Session::new(
            SessionConfig::with_duration_ms(0),
            ManualScheduler::new(),
            Box::new(WordList::from_text("a")),
        );
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"duration_ms": 15000}"#).unwrap();
        assert_eq!(config.duration_ms, 15_000);
        assert!(config.start_on_first_keystroke);
    }
}
