use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HighScoreResponse {
    pub high_score: u32,
}

/// Current persisted high score
pub async fn get_high_score(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HighScoreResponse>, StatusCode> {
    let high_score = state.high_scores.get().await.map_err(|e| {
        tracing::error!("Failed to read high score: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(HighScoreResponse { high_score }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        dictionary::{DictionaryError, DictionaryLookup},
        routes::create_routes,
        store::{HighScoreStore, MemoryHighScoreStore, StoreError},
    };
    use async_trait::async_trait;

    struct NoWords;

    #[async_trait]
    impl DictionaryLookup for NoWords {
        async fn lookup(&self, _word: &str) -> Result<bool, DictionaryError> {
            Ok(false)
        }
    }

    struct UnreadableStore;

    #[async_trait]
    impl HighScoreStore for UnreadableStore {
        async fn get(&self) -> Result<u32, StoreError> {
            Err(StoreError::Io(std::io::Error::other("unreadable")))
        }

        async fn set(&self, _score: u32) -> Result<(), StoreError> {
            Ok(())
        }
    }

    async fn serve(high_scores: Arc<dyn HighScoreStore>) -> String {
        let state = Arc::new(AppState {
            config: Config::default(),
            dictionary: Arc::new(NoWords),
            high_scores,
        });
        let app = create_routes().with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_high_score_endpoint() {
        let base = serve(Arc::new(MemoryHighScoreStore::new(7))).await;

        let response = reqwest::get(format!("{}/api/high-score", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: HighScoreResponse = response.json().await.unwrap();
        assert_eq!(body.high_score, 7);
    }

    #[tokio::test]
    async fn test_high_score_endpoint_store_failure() {
        let base = serve(Arc::new(UnreadableStore)).await;

        let response = reqwest::get(format!("{}/api/high-score", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let base = serve(Arc::new(MemoryHighScoreStore::default())).await;

        let body: serde_json::Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "letter-dash-backend");
    }
}
