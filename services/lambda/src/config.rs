//! Application Configuration Module
//!
//! Loads the Lambda function's settings from environment variables once, at
//! cold start, into a single struct that `main` wires into the clients.

use std::env;
use std::path::PathBuf;
use tracing::Level;

/// Where the chat API key is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SecretBackend {
    DynamoDb,
    Env,
}

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_backend: SecretBackend,
    pub dynamodb_region: Option<String>,
    pub dynamodb_table: Option<String>,
    pub chat_model: String,
    pub max_tokens: u32,
    pub openai_base_url: String,
    pub system_prompt_path: Option<PathBuf>,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// *   `SECRET_BACKEND`: "dynamodb" or "env". Defaults to "dynamodb".
    /// *   `DYNAMODB_PERSISTENCE_REGION`: Region of the secrets table. Required for "dynamodb".
    /// *   `DYNAMODB_PERSISTENCE_TABLE_NAME`: Table holding `{id, value}` items. Required for "dynamodb".
    /// *   `CHAT_MODEL`: (Optional) Chat model. Defaults to "gpt-3.5-turbo".
    /// *   `CHAT_MAX_TOKENS`: (Optional) Cap on generated tokens. Defaults to 500.
    /// *   `OPENAI_BASE_URL`: (Optional) API base URL. Defaults to "https://api.openai.com/v1".
    /// *   `SYSTEM_PROMPT_PATH`: (Optional) File replacing the built-in system prompt.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_backend = match lookup("SECRET_BACKEND")
            .unwrap_or_else(|| "dynamodb".to_string())
            .to_lowercase()
            .as_str()
        {
            "dynamodb" => SecretBackend::DynamoDb,
            "env" => SecretBackend::Env,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SECRET_BACKEND".to_string(),
                    format!("'{}' is not one of 'dynamodb' or 'env'", other),
                ));
            }
        };

        let dynamodb_region = lookup("DYNAMODB_PERSISTENCE_REGION");
        let dynamodb_table = lookup("DYNAMODB_PERSISTENCE_TABLE_NAME");

        // Provide a default for non-critical variables.
        let chat_model = lookup("CHAT_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string());
        let openai_base_url =
            lookup("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        let system_prompt_path = lookup("SYSTEM_PROMPT_PATH").map(PathBuf::from);

        let max_tokens = match lookup("CHAT_MAX_TOKENS") {
            Some(value) => value.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("CHAT_MAX_TOKENS".to_string(), e.to_string())
            })?,
            None => 500,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let config = Self {
            secret_backend,
            dynamodb_region,
            dynamodb_table,
            chat_model,
            max_tokens,
            openai_base_url,
            system_prompt_path,
            log_level,
        };

        // The DynamoDB backend cannot work without its table coordinates.
        if config.secret_backend == SecretBackend::DynamoDb {
            if config.dynamodb_region.is_none() {
                return Err(ConfigError::MissingVar(
                    "DYNAMODB_PERSISTENCE_REGION must be set for dynamodb backend".to_string(),
                ));
            }
            if config.dynamodb_table.is_none() {
                return Err(ConfigError::MissingVar(
                    "DYNAMODB_PERSISTENCE_TABLE_NAME must be set for dynamodb backend".to_string(),
                ));
            }
        }

        Ok(config)
    }
}
