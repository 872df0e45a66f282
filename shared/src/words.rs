use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Word bank used when no custom list is supplied.
pub const WORDS: &[&str] = &[
    "the", "be", "of", "and", "a", "to", "in", "he", "have", "it", "that", "for", "they",
    "with", "as", "not", "on", "she", "at", "by", "this", "we", "you", "do", "but", "from",
    "or", "which", "one", "would", "all", "will", "there", "say", "who", "make", "when",
    "can", "more", "if", "no", "man", "out", "other", "so", "what", "time", "up", "go",
    "about", "than", "into", "could", "state", "only", "new", "year", "some", "take",
    "come", "these", "know", "see", "use", "get", "like", "then", "first", "any", "work",
    "now", "may", "such", "give", "over", "think", "most", "even", "find", "day", "also",
    "after", "way", "many", "must", "look", "before", "great", "back", "through", "long",
    "where", "much", "should", "well", "people", "down", "own", "just", "because", "good",
    "each", "those", "feel", "seem", "how", "high", "too", "place", "little", "world",
    "very", "still", "nation", "hand", "old", "life", "tell", "write", "become", "here",
    "show", "house", "both", "between", "need", "mean", "call", "develop", "under", "last",
    "right", "move", "thing", "general", "school", "never", "same", "another", "begin",
    "while", "number", "part", "turn", "real", "leave", "might", "want", "point", "form",
    "off", "child", "few", "small", "since", "against", "ask", "late", "home", "interest",
    "large", "person", "end", "open", "public", "follow", "during", "present", "without",
    "again", "hold", "govern", "around", "possible", "head", "consider", "word", "program",
    "problem", "however", "lead", "system", "set", "order", "eye", "plan", "run", "keep",
    "face", "fact", "group", "play", "stand", "increase", "early", "course", "change",
    "help", "line",
];

/// A word the user is expected to type. Immutable once handed to a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWord {
    chars: Vec<char>,
}

impl TargetWord {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl std::fmt::Display for TargetWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// Supplies target words to a session, in order.
pub trait WordSource {
    fn next(&mut self) -> Option<TargetWord>;

    fn has_more(&self) -> bool;

    /// Go back to the beginning for a fresh session.
    fn rewind(&mut self) {}
}

/// A finite list served in the order given.
#[derive(Clone, Debug)]
pub struct WordList {
    words: Vec<TargetWord>,
    cursor: usize,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| TargetWord::new(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words, cursor: 0 }
    }

    /// Split free text on whitespace.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split_whitespace())
    }
}

impl WordSource for WordList {
    fn next(&mut self) -> Option<TargetWord> {
        let word = self.words.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(word)
    }

    fn has_more(&self) -> bool {
        self.cursor < self.words.len()
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }
}

/// Endless random draws from a word bank.
#[derive(Clone, Debug)]
pub struct RandomWords {
    bank: &'static [&'static str],
    seed: u64,
    rng: SmallRng,
}

impl RandomWords {
    pub fn new(seed: u64) -> Self {
        Self::with_bank(WORDS, seed)
    }

    pub fn with_bank(bank: &'static [&'static str], seed: u64) -> Self {
        Self {
            bank,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl WordSource for RandomWords {
    fn next(&mut self) -> Option<TargetWord> {
        self.bank.choose(&mut self.rng).map(|w| TargetWord::new(w))
    }

    fn has_more(&self) -> bool {
        !self.bank.is_empty()
    }

    fn rewind(&mut self) {
        // Move on to a different sequence rather than replaying the last one.
        self.seed = self.seed.wrapping_add(1);
        self.rng = SmallRng::seed_from_u64(self.seed);
    }
}
