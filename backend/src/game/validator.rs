use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dictionary::DictionaryLookup;

/// Why a submitted word was not scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("Word already used")]
    Duplicate,
    #[error("Invalid letters")]
    InvalidLetters,
    #[error("Not a recognized word")]
    NotRecognized,
}

/// Normalized form used for history and comparisons
pub fn normalize(word: &str) -> String {
    word.to_ascii_uppercase()
}

#[derive(Clone)]
pub struct WordValidator {
    dictionary: Arc<dyn DictionaryLookup>,
}

impl WordValidator {
    pub fn new(dictionary: Arc<dyn DictionaryLookup>) -> Self {
        Self { dictionary }
    }

    /// Run all three checks in order
    #[allow(dead_code)]
    pub async fn validate(
        &self,
        word: &str,
        letters: &[char],
        history: &[String],
    ) -> Result<(), Rejection> {
        Self::check_local(word, letters, history)?;
        self.check_dictionary(word).await
    }

    /// The synchronous part of validation: history first, then letters
    pub fn check_local(word: &str, letters: &[char], history: &[String]) -> Result<(), Rejection> {
        if Self::is_used(word, history) {
            return Err(Rejection::Duplicate);
        }
        if !Self::uses_available_letters(word, letters) {
            return Err(Rejection::InvalidLetters);
        }
        Ok(())
    }

    /// Check the word against the dictionary. Lookup failures count as "not a word".
    pub async fn check_dictionary(&self, word: &str) -> Result<(), Rejection> {
        match self.dictionary.lookup(word).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Rejection::NotRecognized),
            Err(e) => {
                tracing::warn!("Dictionary lookup for '{}' failed: {}", word, e);
                Err(Rejection::NotRecognized)
            }
        }
    }

    pub fn is_used(word: &str, history: &[String]) -> bool {
        let normalized = normalize(word);
        history.iter().any(|used| *used == normalized)
    }

    /// Every character of the word must claim a distinct tile.
    /// An empty word claims nothing and is rejected.
    pub fn uses_available_letters(word: &str, letters: &[char]) -> bool {
        if word.is_empty() {
            return false;
        }

        let mut remaining: Vec<char> = letters.iter().map(|c| c.to_ascii_uppercase()).collect();
        for ch in word.chars() {
            let ch = ch.to_ascii_uppercase();
            match remaining.iter().position(|&tile| tile == ch) {
                Some(idx) => {
                    remaining.swap_remove(idx);
                }
                None => return false,
            }
        }

        true
    }
}
