use alexa_gpt_types::{Attributes, ChatMessage, MessageRole, RequestEnvelope};
use anyhow::{Context, Result};

/// Session attribute that holds the conversation so far.
pub const MESSAGES_KEY: &str = "messages";

/// Session-scoped attributes as an explicit value.
///
/// Handlers receive the attributes the request arrived with and hand back the
/// attributes the platform should return on the next turn. Keys other than
/// `messages` are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionAttributes {
    attributes: Attributes,
}

impl SessionAttributes {
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    pub fn from_envelope(envelope: &RequestEnvelope) -> Self {
        Self::new(envelope.session_attributes())
    }

    /// Conversation turns stored so far; empty when the attribute is absent.
    pub fn messages(&self) -> Result<Vec<ChatMessage>> {
        match self.attributes.get(MESSAGES_KEY) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .context("Session attribute 'messages' is not a list of chat messages"),
        }
    }

    pub fn with_messages(mut self, messages: &[ChatMessage]) -> Result<Self> {
        let value = serde_json::to_value(messages).context("Failed to serialize chat messages")?;
        self.attributes.insert(MESSAGES_KEY.to_string(), value);
        Ok(self)
    }

    pub fn as_map(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_inner(self) -> Attributes {
        self.attributes
    }
}

/// The chat history of one voice session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    history: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(history: Vec<ChatMessage>) -> Self {
        Self { history }
    }

    pub fn from_attributes(attributes: &SessionAttributes) -> Result<Self> {
        Ok(Self::new(attributes.messages()?))
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Message list for the next completion: one system message, the prior
    /// turns in their original order, then the new user prompt.
    ///
    /// Stray system entries in the stored history are skipped so the list
    /// never carries more than one.
    pub fn request_messages(&self, system_prompt: &str, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(
            self.history
                .iter()
                .filter(|message| message.role != MessageRole::System)
                .cloned(),
        );
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Appends a completed exchange.
    pub fn with_turn(mut self, prompt: &str, reply: &str) -> Self {
        self.history.push(ChatMessage::user(prompt));
        self.history.push(ChatMessage::assistant(reply));
        self
    }

    pub fn into_attributes(self, attributes: SessionAttributes) -> Result<SessionAttributes> {
        attributes.with_messages(&self.history)
    }
}
