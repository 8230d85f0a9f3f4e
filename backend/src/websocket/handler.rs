use crate::{
    game::{
        validator::normalize, FeedbackExpiry, FeedbackPresenter, GameSession, LookupTicket,
        Rejection, SubmitOutcome, WordValidator,
    },
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::mpsc,
    task::{self, JoinError, JoinSet},
};

pub const ACCEPTED_FEEDBACK: &str = "Word accepted!";

/// WebSocket upgrade handler
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one player's game for the lifetime of the connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);
    let (expiry_tx, mut expiry_rx) = mpsc::channel::<FeedbackExpiry>(8);

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    let session = GameSession::new(
        state.config.game.letters_per_game,
        WordValidator::new(state.dictionary.clone()),
        state.high_scores.clone(),
    );
    let mut conn = Connection {
        session,
        feedback: FeedbackPresenter::new(state.config.feedback_duration(), expiry_tx),
        lookups: JoinSet::new(),
        in_flight: HashMap::new(),
        tx,
    };

    tracing::info!("WebSocket connection established for session {}", conn.session.session_id());
    conn.session.refresh_high_score().await;
    conn.send_state().await;

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => conn.handle_client_message(client_msg).await,
                        Err(e) => {
                            tracing::error!("Failed to parse message: {}", e);
                            conn.send(ServerMessage::Error {
                                message: format!("Invalid message format: {}", e),
                            })
                            .await;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::warn!("WebSocket receive error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
            Some(joined) = conn.lookups.join_next_with_id() => conn.handle_joined(joined).await,
            Some(expiry) = expiry_rx.recv() => conn.handle_expiry(expiry).await,
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    tracing::info!("WebSocket connection closed for session {}", conn.session.session_id());
}

/// Per-connection state; only the connection loop touches it
struct Connection {
    session: GameSession,
    feedback: FeedbackPresenter,
    /// In-flight dictionary lookups, aborted when the connection goes away
    lookups: JoinSet<Result<(), Rejection>>,
    /// Ticket for each lookup task, kept outside the task so a panic cannot lose it
    in_flight: HashMap<task::Id, LookupTicket>,
    tx: mpsc::Sender<ServerMessage>,
}

impl Connection {
    async fn handle_client_message(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::UpdateInput { text } => {
                self.session.update_input(text);
            }
            ClientMessage::SubmitWord { word } => {
                tracing::debug!("Session {} submitting '{}'", self.session.session_id(), word);
                match self.session.begin_submit(&word) {
                    Ok(ticket) => {
                        let validator = self.session.validator().clone();
                        let lookup_word = ticket.word.clone();
                        let handle = self.lookups.spawn(async move {
                            validator.check_dictionary(&lookup_word).await
                        });
                        self.in_flight.insert(handle.id(), ticket);
                    }
                    Err(reason) => self.reject(normalize(&word), reason).await,
                }
            }
            ClientMessage::GiveUp => {
                let summary = self.session.end_session().await;
                self.send(ServerMessage::SessionEnded {
                    final_score: summary.final_score,
                    high_score: summary.high_score,
                    new_high_score: summary.new_high_score,
                })
                .await;
                self.send_state().await;
            }
        }
    }

    /// A lookup task that died fails closed, like a network error
    async fn handle_joined(
        &mut self,
        joined: Result<(task::Id, Result<(), Rejection>), JoinError>,
    ) {
        let (id, lookup) = match joined {
            Ok(done) => done,
            Err(e) => {
                tracing::error!("Dictionary lookup task failed: {}", e);
                (e.id(), Err(Rejection::NotRecognized))
            }
        };

        if let Some(ticket) = self.in_flight.remove(&id) {
            self.handle_lookup(ticket, lookup).await;
        }
    }

    async fn handle_lookup(&mut self, ticket: LookupTicket, lookup: Result<(), Rejection>) {
        match self.session.complete_submit(ticket, lookup) {
            SubmitOutcome::Accepted { word, score } => {
                self.send(ServerMessage::WordAccepted { word, score }).await;
                self.show_feedback(ACCEPTED_FEEDBACK).await;
            }
            SubmitOutcome::Rejected { word, reason } => self.reject(word, reason).await,
            SubmitOutcome::Stale => {}
        }
    }

    async fn handle_expiry(&mut self, expiry: FeedbackExpiry) {
        if self.feedback.expire(expiry) {
            self.send(ServerMessage::FeedbackCleared).await;
        }
    }

    async fn reject(&mut self, word: String, reason: Rejection) {
        tracing::debug!("Rejected '{}': {}", word, reason);
        self.send(ServerMessage::WordRejected { word, reason }).await;
        self.show_feedback(&reason.to_string()).await;
    }

    async fn show_feedback(&mut self, message: &str) {
        self.feedback.show(message);
        self.send(ServerMessage::Feedback {
            message: message.to_string(),
        })
        .await;
    }

    async fn send_state(&self) {
        self.send(ServerMessage::SessionState {
            session_id: self.session.session_id(),
            letters: self.session.letters().to_vec(),
            input: self.session.input().to_string(),
            scored_words: self.session.scored_words().to_vec(),
            score: self.session.score(),
            high_score: self.session.high_score(),
            feedback: self.feedback.message().map(str::to_string),
        })
        .await;
    }

    async fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg).await;
    }
}
