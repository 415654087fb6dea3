//! Word tables and the weighted spawn pool.

use rand::Rng;

use crate::config::ConfigError;

// Short, kid-friendly words (2-4 letters). Duplicates are intentional: "bee"
// appears twice and so is drawn twice as often.
pub const BASE_WORDS: &[&str] = &[
    "cat", "dog", "sun", "cup", "car", "hat", "ball", "bee", "egg", "pig", "cow", "fox", "bat",
    "bee", "ant", "tree", "fish", "book", "star", "cake",
];

/// Words that should show up more often. Higher weight => higher frequency.
pub const WEIGHTED_WORDS: &[(&str, u32)] = &[
    ("apple", 12),
    ("pie", 10),
    ("apple pie", 18),
    ("mangoes", 10),
    ("peach", 10),
    ("jeshvik", 8),
    ("aarav", 8),
    ("sigma", 6),
    ("rizz", 6),
];

/// Immutable sampling set: every word is repeated according to its weight and
/// `select` draws uniformly, which approximates weighted sampling in O(1).
#[derive(Clone, Debug)]
pub struct WeightedWordPool {
    words: Vec<String>,
}

impl WeightedWordPool {
    pub fn new<S: AsRef<str>>(
        base: &[S],
        base_repeat: u32,
        weighted: &[(S, u32)],
    ) -> Result<Self, ConfigError> {
        let mut words = Vec::new();
        for w in base {
            for _ in 0..base_repeat {
                words.push(w.as_ref().to_string());
            }
        }
        for (w, weight) in weighted {
            if *weight == 0 {
                return Err(ConfigError::ZeroWeight(w.as_ref().to_string()));
            }
            for _ in 0..*weight {
                words.push(w.as_ref().to_string());
            }
        }
        // Words with no characters can never be completed.
        if words.iter().any(|w| w.is_empty()) {
            words.retain(|w| !w.is_empty());
        }
        if words.is_empty() {
            return Err(ConfigError::EmptyWordPool);
        }
        Ok(Self { words })
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.words[rng.gen_range(0..self.words.len())]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of pool entries for `word` (its effective weight).
    pub fn count(&self, word: &str) -> usize {
        self.words.iter().filter(|w| w.as_str() == word).count()
    }
}
