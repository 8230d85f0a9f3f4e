use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Something that can tell whether a word exists in the target dictionary.
///
/// `Ok(false)` is a definite "not a word"; `Err` means the answer could not be
/// obtained at all.
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    async fn lookup(&self, word: &str) -> Result<bool, DictionaryError>;
}

/// One entry of the dictionary API response; every other field is ignored
#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    word: Option<String>,
}

/// Dictionary backed by a remote HTTP API
pub struct HttpDictionary {
    http_client: reqwest::Client,
    url_template: String,
}

impl HttpDictionary {
    pub fn new(http_client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            http_client,
            url_template: url_template.into(),
        }
    }

    fn url_for(&self, word: &str) -> String {
        self.url_template.replace("{word}", &word.to_lowercase())
    }
}

#[async_trait]
impl DictionaryLookup for HttpDictionary {
    async fn lookup(&self, word: &str) -> Result<bool, DictionaryError> {
        let url = self.url_for(word);
        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            tracing::debug!("Dictionary returned {} for '{}'", response.status(), word);
            return Ok(false);
        }

        // The body is read as text first so that an unexpected shape counts as
        // "not a word" rather than a transport failure
        let body = response.text().await?;
        Ok(entries_confirm_word(&body))
    }
}

fn entries_confirm_word(body: &str) -> bool {
    match serde_json::from_str::<Vec<DictionaryEntry>>(body) {
        Ok(entries) => {
            !entries.is_empty()
                && entries
                    .iter()
                    .all(|entry| entry.word.as_deref().is_some_and(|w| !w.is_empty()))
        }
        Err(e) => {
            tracing::debug!("Unrecognized dictionary response body: {}", e);
            false
        }
    }
}
