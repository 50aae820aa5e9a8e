use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use bomb_types::GameError;

/// Dictionary bundled into the crate, used when no external list is loaded.
const BUILT_IN_WORDS: &str = include_str!("../words/common.txt");

/// Checks submissions against the turn prompt, the used-word set and the
/// active dictionary. Pure: validation never mutates game state, and the
/// coordinator runs it inside the same boundary that applies the mutation,
/// so a client can never bypass it.
pub struct WordValidator {
    words: HashSet<String>,
}

impl WordValidator {
    /// Build a validator from a flat word list, one word per line.
    /// Blank lines and `#` comments are ignored; words shorter than the
    /// minimum playable length are dropped up front.
    pub fn from_word_list(word_list: &str) -> Self {
        let words = word_list
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty() && !word.starts_with('#'))
            .filter(|word| word.len() >= MIN_WORD_LENGTH)
            .collect();

        Self { words }
    }

    /// Validator backed by the bundled common-word list.
    pub fn built_in() -> Self {
        Self::from_word_list(BUILT_IN_WORDS)
    }

    /// Load an external word list, replacing the bundled dictionary wholesale.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read word list {}", path.as_ref().display()))?;
        Ok(Self::from_word_list(&contents))
    }

    /// Small fixed dictionary for tests that need predictable contents.
    pub fn with_test_words() -> Self {
        Self::from_word_list("star\nstart\nease\nenter\ntaste\nthing\nplant\nwater\nstone")
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Check a submission in rule order: length, prompt containment,
    /// uniqueness, dictionary membership. Returns the normalized word the
    /// game should record.
    pub fn validate(
        &self,
        word: &str,
        required_letters: &str,
        used_words: &HashSet<String>,
    ) -> Result<String, GameError> {
        let normalized = word.trim().to_lowercase();

        if normalized.len() < MIN_WORD_LENGTH {
            return Err(GameError::WordTooShort);
        }

        let required = required_letters.to_lowercase();
        if !normalized.contains(&required) {
            return Err(GameError::MissingLetters {
                letters: required_letters.to_uppercase(),
            });
        }

        if used_words.contains(&normalized) {
            return Err(GameError::WordAlreadyUsed {
                word: normalized.clone(),
            });
        }

        if !self.words.contains(&normalized) {
            return Err(GameError::NotInDictionary {
                word: normalized.clone(),
            });
        }

        Ok(normalized)
    }
}

/// Shortest playable word.
pub const MIN_WORD_LENGTH: usize = 3;
