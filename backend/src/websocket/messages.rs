use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::Rejection;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    UpdateInput {
        text: String,
    },
    SubmitWord {
        word: String,
    },
    GiveUp,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionState {
        session_id: Uuid,
        letters: Vec<char>,
        input: String,
        scored_words: Vec<String>,
        score: u32,
        high_score: u32,
        feedback: Option<String>,
    },
    WordAccepted {
        word: String,
        score: u32,
    },
    WordRejected {
        word: String,
        reason: Rejection,
    },
    Feedback {
        message: String,
    },
    FeedbackCleared,
    SessionEnded {
        final_score: u32,
        high_score: u32,
        new_high_score: bool,
    },
    Error {
        message: String,
    },
}
