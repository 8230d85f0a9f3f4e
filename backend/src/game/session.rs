use std::{collections::HashMap, num::NonZeroUsize, sync::Arc};

use uuid::Uuid;

use super::{
    letters::LetterGenerator,
    validator::{normalize, Rejection, WordValidator},
};
use crate::store::HighScoreStore;

/// Tag for one in-flight dictionary lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub session_id: Uuid,
    pub seq: u64,
    /// Normalized word the lookup was issued for
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { word: String, score: u32 },
    Rejected { word: String, reason: Rejection },
    /// The session moved on or a newer lookup for the same word superseded this one
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub final_score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
}

/// One player's play-through: letters, input, scored words, and the
/// bookkeeping needed to apply dictionary results in a safe order
pub struct GameSession {
    session_id: Uuid,
    letters_per_game: NonZeroUsize,
    letters: Vec<char>,
    input: String,
    scored_words: Vec<String>,
    /// Latest lookup sequence number per normalized word
    pending: HashMap<String, u64>,
    next_seq: u64,
    known_high_score: u32,
    validator: WordValidator,
    high_scores: Arc<dyn HighScoreStore>,
}

impl GameSession {
    pub fn new(
        letters_per_game: NonZeroUsize,
        validator: WordValidator,
        high_scores: Arc<dyn HighScoreStore>,
    ) -> Self {
        let letters = LetterGenerator::generate(letters_per_game);
        Self::with_letters(letters, validator, high_scores)
    }

    /// Start a session on a fixed letter set. Later sessions keep its size.
    pub fn with_letters(
        letters: Vec<char>,
        validator: WordValidator,
        high_scores: Arc<dyn HighScoreStore>,
    ) -> Self {
        let letters_per_game = NonZeroUsize::new(letters.len()).unwrap_or(NonZeroUsize::MIN);
        let letters: Vec<char> = letters.iter().map(|c| c.to_ascii_uppercase()).collect();
        let session_id = Uuid::new_v4();
        tracing::info!("Started session {} with letters {:?}", session_id, letters);

        Self {
            session_id,
            letters_per_game,
            letters,
            input: String::new(),
            scored_words: Vec::new(),
            pending: HashMap::new(),
            next_seq: 0,
            known_high_score: 0,
            validator,
            high_scores,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn scored_words(&self) -> &[String] {
        &self.scored_words
    }

    pub fn score(&self) -> u32 {
        self.scored_words.len() as u32
    }

    /// Last high score read from or written to the store
    pub fn high_score(&self) -> u32 {
        self.known_high_score
    }

    pub fn validator(&self) -> &WordValidator {
        &self.validator
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub async fn refresh_high_score(&mut self) -> u32 {
        match self.high_scores.get().await {
            Ok(value) => self.known_high_score = value,
            Err(e) => tracing::error!("Failed to read high score: {}", e),
        }
        self.known_high_score
    }

    /// Record the submission and run the local checks. On success the caller
    /// must run the dictionary check and hand the result to [`Self::complete_submit`].
    pub fn begin_submit(&mut self, word: &str) -> Result<LookupTicket, Rejection> {
        self.input = word.to_string();
        WordValidator::check_local(word, &self.letters, &self.scored_words)?;

        self.next_seq += 1;
        let normalized = normalize(word);
        self.pending.insert(normalized.clone(), self.next_seq);

        Ok(LookupTicket {
            session_id: self.session_id,
            seq: self.next_seq,
            word: normalized,
        })
    }

    /// Apply a dictionary result to the session it was issued for
    pub fn complete_submit(
        &mut self,
        ticket: LookupTicket,
        lookup: Result<(), Rejection>,
    ) -> SubmitOutcome {
        if ticket.session_id != self.session_id {
            tracing::debug!(
                "Dropping lookup for '{}' from ended session {}",
                ticket.word,
                ticket.session_id
            );
            return SubmitOutcome::Stale;
        }
        if self.pending.get(&ticket.word) != Some(&ticket.seq) {
            tracing::debug!("Dropping superseded lookup #{} for '{}'", ticket.seq, ticket.word);
            return SubmitOutcome::Stale;
        }
        self.pending.remove(&ticket.word);

        if let Err(reason) = lookup {
            return SubmitOutcome::Rejected {
                word: ticket.word,
                reason,
            };
        }
        if WordValidator::is_used(&ticket.word, &self.scored_words) {
            return SubmitOutcome::Rejected {
                word: ticket.word,
                reason: Rejection::Duplicate,
            };
        }

        self.scored_words.push(ticket.word.clone());
        self.input.clear();
        tracing::info!(
            "Session {} scored '{}' (score {})",
            self.session_id,
            ticket.word,
            self.score()
        );

        SubmitOutcome::Accepted {
            word: ticket.word,
            score: self.score(),
        }
    }

    /// Validate a word end to end, waiting for the dictionary in between.
    /// The connection loop uses the split form so lookups can overlap.
    #[allow(dead_code)]
    pub async fn submit(&mut self, word: &str) -> SubmitOutcome {
        let ticket = match self.begin_submit(word) {
            Ok(ticket) => ticket,
            Err(reason) => {
                return SubmitOutcome::Rejected {
                    word: normalize(word),
                    reason,
                }
            }
        };

        let lookup = self.validator.check_dictionary(&ticket.word).await;
        self.complete_submit(ticket, lookup)
    }

    /// Persist the score if it is a new best, then start over
    pub async fn end_session(&mut self) -> SessionSummary {
        let final_score = self.score();

        let (high_score, new_high_score) = match self.high_scores.record_if_higher(final_score).await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Failed to record high score {}: {}", final_score, e);
                (self.known_high_score, false)
            }
        };
        self.known_high_score = high_score;

        tracing::info!(
            "Session {} ended with score {} (high score {})",
            self.session_id,
            final_score,
            high_score
        );
        self.reset();

        SessionSummary {
            final_score,
            high_score,
            new_high_score,
        }
    }

    fn reset(&mut self) {
        self.session_id = Uuid::new_v4();
        self.letters = LetterGenerator::generate(self.letters_per_game);
        self.input.clear();
        self.scored_words.clear();
        self.pending.clear();
        tracing::info!("Started session {} with letters {:?}", self.session_id, self.letters);
    }
}
