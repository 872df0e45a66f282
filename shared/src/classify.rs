use serde::{Deserialize, Serialize};

use crate::words::TargetWord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Correctness {
    Matched,
    Mismatched,
    /// Typed past the end of the target word, or a single inserted key.
    Extra,
}

impl Correctness {
    pub fn is_error(self) -> bool {
        !matches!(self, Correctness::Matched)
    }
}

/// One keystroke as it landed in the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedCharacterRecord {
    pub typed: char,
    pub expected: Option<char>,
    pub correctness: Correctness,
}

/// Exact, case-sensitive code point comparison. `None` means the cursor is
/// already beyond the target word.
pub fn classify(expected: Option<char>, typed: char) -> Correctness {
    match expected {
        Some(e) if e == typed => Correctness::Matched,
        Some(_) => Correctness::Mismatched,
        None => Correctness::Extra,
    }
}

/// Classify `typed` against the character of `word` at `pos`.
pub fn classify_at(word: &TargetWord, pos: usize, typed: char) -> TypedCharacterRecord {
    let expected = word.char_at(pos);
    TypedCharacterRecord {
        typed,
        expected,
        correctness: classify(expected, typed),
    }
}

/// Position in the target word the next keystroke is compared against.
/// `Extra` records do not occupy a position.
pub fn word_cursor(buffer: &[TypedCharacterRecord]) -> usize {
    buffer
        .iter()
        .filter(|r| r.correctness != Correctness::Extra)
        .count()
}

/// Classify the next keystroke of a word given the records already in its
/// buffer. A key that repeats the character just matched, where the word
/// expects something else, is a single insertion: it becomes `Extra` and the
/// cursor stays put, so "helllo" still lines up with "hello".
pub fn classify_next(
    word: &TargetWord,
    buffer: &[TypedCharacterRecord],
    typed: char,
) -> TypedCharacterRecord {
    let record = classify_at(word, word_cursor(buffer), typed);
    let repeated = matches!(
        buffer.last(),
        Some(prev) if prev.correctness == Correctness::Matched && prev.typed == typed
    );
    if record.correctness == Correctness::Mismatched && repeated {
        return TypedCharacterRecord {
            typed,
            expected: None,
            correctness: Correctness::Extra,
        };
    }
    record
}
