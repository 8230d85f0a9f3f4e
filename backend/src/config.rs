use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::game::feedback::DEFAULT_FEEDBACK_DURATION;

pub const DEFAULT_DICTIONARY_API_URL: &str =
    "https://api.dictionaryapi.dev/api/v2/entries/en/{word}";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub dictionary: DictionaryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub letters_per_game: NonZeroUsize,
    pub feedback_duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryConfig {
    /// Endpoint template; `{word}` is replaced with the candidate word
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub high_score_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_dir: env::var("FRONTEND_DIR")
                .unwrap_or_else(|_| "../frontend".to_string()),
        };

        let game = GameConfig {
            letters_per_game: env::var("LETTERS_PER_GAME")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("LETTERS_PER_GAME must be a number of at least 1")?,
            feedback_duration_ms: env::var("FEEDBACK_DURATION_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("FEEDBACK_DURATION_MS must be a number")?,
        };

        let dictionary = DictionaryConfig {
            api_url: env::var("DICTIONARY_API_URL")
                .unwrap_or_else(|_| DEFAULT_DICTIONARY_API_URL.to_string()),
            timeout_secs: env::var("DICTIONARY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DICTIONARY_TIMEOUT_SECS must be a number")?,
        };

        if !dictionary.api_url.contains("{word}") {
            anyhow::bail!("DICTIONARY_API_URL must contain a {{word}} placeholder");
        }

        let storage = StorageConfig {
            high_score_path: env::var("HIGH_SCORE_PATH")
                .unwrap_or_else(|_| "./high_score.json".to_string())
                .into(),
        };

        Ok(Config {
            server,
            game,
            dictionary,
            storage,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.game.feedback_duration_ms)
    }

    pub fn dictionary_timeout(&self) -> Duration {
        Duration::from_secs(self.dictionary.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                frontend_dir: "../frontend".to_string(),
            },
            game: GameConfig {
                letters_per_game: NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN),
                feedback_duration_ms: DEFAULT_FEEDBACK_DURATION.as_millis() as u64,
            },
            dictionary: DictionaryConfig {
                api_url: DEFAULT_DICTIONARY_API_URL.to_string(),
                timeout_secs: 10,
            },
            storage: StorageConfig {
                high_score_path: "./high_score.json".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.game.letters_per_game.get(), 5);
        assert_eq!(config.feedback_duration(), Duration::from_millis(2000));
        assert!(config.dictionary.api_url.contains("{word}"));
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_letters_per_game_rejects_zero() {
        assert!("0".parse::<NonZeroUsize>().is_err());
        assert_eq!("7".parse::<NonZeroUsize>().map(|n| n.get()).ok(), Some(7));
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        // Both cases share one test since the environment is process-wide
        env::set_var("LETTERS_PER_GAME", "0");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("LETTERS_PER_GAME"));

        env::set_var("LETTERS_PER_GAME", "6");
        env::set_var("DICTIONARY_API_URL", "http://dict.test/no-placeholder");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("{word}"));

        env::set_var("DICTIONARY_API_URL", "http://dict.test/en/{word}");
        let config = Config::from_env().unwrap();
        assert_eq!(config.game.letters_per_game.get(), 6);
        assert_eq!(config.dictionary.api_url, "http://dict.test/en/{word}");

        env::remove_var("LETTERS_PER_GAME");
        env::remove_var("DICTIONARY_API_URL");
    }
}
