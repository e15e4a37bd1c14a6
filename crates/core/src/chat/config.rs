use super::consts;
use crate::secrets::OPENAI_API_KEY;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    base_url: String,
    model: String,
    max_tokens: u32,
    secret_key: String,
}

pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl Default for ChatConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ChatConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Key under which the API credential is looked up in the secret store.
    pub fn with_secret_key(mut self, secret_key: &str) -> Self {
        self.config.secret_key = secret_key.to_string();
        self
    }

    pub fn build(self) -> ChatConfig {
        self.config
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: consts::BASE_URL.to_string(),
            model: consts::DEFAULT_MODEL.to_string(),
            max_tokens: consts::DEFAULT_MAX_TOKENS,
            secret_key: OPENAI_API_KEY.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn completions_url(&self) -> String {
        format!("{}{}", self.base_url, consts::COMPLETIONS_PATH)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_openai_with_cheap_model() {
        let config = ChatConfig::default();

        assert_eq!(
            config.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(config.model(), "gpt-3.5-turbo");
        assert_eq!(config.max_tokens(), 500);
        assert_eq!(config.secret_key(), "OPENAI_API_KEY");
    }

    #[test]
    fn builder_strips_trailing_slash_from_base_url() {
        let config = ChatConfig::builder()
            .with_base_url("http://localhost:8080/v1/")
            .with_model("gpt-4o-mini")
            .with_max_tokens(128)
            .build();

        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.max_tokens(), 128);
    }
}
