use serde::{Deserialize, Serialize};

use crate::classify::{Correctness, TypedCharacterRecord};
use crate::protocol::ResultPayload;

/// Standard word length for WPM.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Final numbers for a finished session. Built once and never touched again.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub error_rate: f64,
    pub total_time_ms: u64,
    pub total_characters: usize,
}

impl ResultSummary {
    pub fn to_payload(&self) -> ResultPayload {
        ResultPayload {
            wpm: self.wpm.round(),
            cpm: self.cpm.round(),
            accuracy: self.accuracy.round(),
            error: self.error_rate.round(),
            total_time: self.total_time_ms,
            total_characters: self.total_characters as u64,
        }
    }
}

/// Characters per minute
pub fn cpm(chars: usize, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    chars as f64 / (elapsed_ms as f64 / 60_000.0)
}

/// Words per minute, CPM over five
pub fn wpm(chars: usize, elapsed_ms: u64) -> f64 {
    cpm(chars, elapsed_ms) / CHARS_PER_WORD
}

/// Calculate accuracy percentage. Nothing typed scores zero.
pub fn accuracy(correct_chars: usize, total_chars: usize) -> f64 {
    if total_chars == 0 {
        return 0.0;
    }
    (correct_chars as f64 / total_chars as f64) * 100.0
}

pub fn summarize(history: &[TypedCharacterRecord], elapsed_ms: u64) -> ResultSummary {
    let total_characters = history.len();
    let correct = history
        .iter()
        .filter(|r| r.correctness == Correctness::Matched)
        .count();
    let accuracy = accuracy(correct, total_characters);
    // Derived from accuracy so the two always sum to 100.
    let error_rate = if total_characters == 0 {
        0.0
    } else {
        100.0 - accuracy
    };

    ResultSummary {
        wpm: wpm(total_characters, elapsed_ms),
        cpm: cpm(total_characters, elapsed_ms),
        accuracy,
        error_rate,
        total_time_ms: elapsed_ms,
        total_characters,
    }
}
