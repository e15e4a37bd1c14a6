use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;

/// Secret under which the chat-completion API key is stored.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("no secret stored under key '{0}'")]
    NotFound(String),
    #[error("secret store lookup for '{key}' failed: {message}")]
    Backend { key: String, message: String },
}

/// A point lookup of a named secret in some persistent store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<SecretString, SecretError>;
}

/// Reads secrets from process environment variables, for local development.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        // A `.env` file is optional; missing files are ignored.
        dotenvy::dotenv().ok();
        Self
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_value(&self, key: &str) -> Result<SecretString, SecretError> {
        match std::env::var(key) {
            Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
            _ => Err(SecretError::NotFound(key.to_string())),
        }
    }
}
