pub const BASE_URL: &str = "https://api.openai.com/v1";
pub const COMPLETIONS_PATH: &str = "/chat/completions";

// gpt-4 is too slow for a spoken reply, so the cheaper model is the default.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Reply length the system prompt asks the model to stay under.
pub const MAX_SPOKEN_CHARS: usize = 200;
