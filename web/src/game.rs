//! Wraps a [`Session`] with what the page needs to draw it: the typed buffer
//! of every word already left behind, and a plain snapshot of the session
//! that can live in a signal.

use shared::{
    Correctness, ResultSummary, Scheduler, Session, SessionError, SessionState, TickOutcome,
    TypedCharacterRecord,
};

/// Upcoming words rendered after the cursor.
const VISIBLE_AHEAD: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Untyped,
    Correct,
    Incorrect,
    Extra,
}

impl CharClass {
    pub fn css(self) -> &'static str {
        match self {
            CharClass::Untyped => "char-untyped",
            CharClass::Correct => "char-correct",
            CharClass::Incorrect => "char-incorrect",
            CharClass::Extra => "char-extra",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CharView {
    pub ch: char,
    pub class: CharClass,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WordView {
    pub chars: Vec<CharView>,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub words: Vec<WordView>,
    pub remaining_secs: u64,
    pub duration_ms: u64,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub result: Option<ResultSummary>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            words: Vec::new(),
            remaining_secs: 0,
            duration_ms: 0,
            correct_chars: 0,
            incorrect_chars: 0,
            result: None,
        }
    }
}

pub struct Game<S: Scheduler> {
    session: Session<S>,
    completed: Vec<Vec<TypedCharacterRecord>>,
}

impl<S: Scheduler> Game<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            completed: Vec::new(),
        }
    }

    pub fn submit(&mut self, ch: char) -> Result<Correctness, SessionError> {
        if self.session.state() == SessionState::Idle {
            self.completed.clear();
        }
        let index = self.session.current_word_index();
        let buffer = self.session.buffer().to_vec();
        let outcome = self.session.submit_character(ch)?;
        if self.session.current_word_index() > index {
            self.completed.push(buffer);
        }
        Ok(outcome)
    }

    pub fn backspace(&mut self) -> Result<(), SessionError> {
        self.session.delete_last_character().map(|_| ())
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.session.on_tick()
    }

    pub fn restart(&mut self) {
        self.session.restart();
        self.completed.clear();
    }

    pub fn set_duration(&mut self, duration_ms: u64) -> Result<(), SessionError> {
        self.session.set_duration(duration_ms)?;
        self.completed.clear();
        Ok(())
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn snapshot(&self) -> SessionView {
        let session = &self.session;
        let index = session.current_word_index();
        let words = session
            .words()
            .iter()
            .enumerate()
            .take(index + VISIBLE_AHEAD)
            .map(|(i, word)| {
                let typed: &[TypedCharacterRecord] = match i.cmp(&index) {
                    std::cmp::Ordering::Less => {
                        self.completed.get(i).map(Vec::as_slice).unwrap_or_default()
                    }
                    std::cmp::Ordering::Equal => session.buffer(),
                    std::cmp::Ordering::Greater => &[],
                };
                word_view(word.chars(), typed, i == index)
            })
            .collect();

        let correct_chars = session
            .history()
            .iter()
            .filter(|r| r.correctness == Correctness::Matched)
            .count();

        SessionView {
            state: session.state(),
            words,
            remaining_secs: session.remaining_secs(),
            duration_ms: session.config().duration_ms,
            correct_chars,
            incorrect_chars: session.history().len() - correct_chars,
            result: session.result().copied(),
        }
    }
}

fn word_view(target: &[char], typed: &[TypedCharacterRecord], active: bool) -> WordView {
    let mut chars = Vec::with_capacity(target.len().max(typed.len()));
    let mut pos = 0;
    for record in typed {
        if record.correctness == Correctness::Extra {
            chars.push(CharView {
                ch: record.typed,
                class: CharClass::Extra,
            });
            continue;
        }
        if let Some(&ch) = target.get(pos) {
            let class = if record.correctness == Correctness::Matched {
                CharClass::Correct
            } else {
                CharClass::Incorrect
            };
            chars.push(CharView { ch, class });
        }
        pos += 1;
    }
    chars.extend(target.iter().skip(pos).map(|&ch| CharView {
        ch,
        class: CharClass::Untyped,
    }));
    WordView { chars, active }
}

/// `MM:SS`
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
