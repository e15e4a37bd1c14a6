//! Wire types of the voice platform and of the chat-completion API.

pub mod message;
pub mod request;
pub mod response;

pub use message::{ChatMessage, MessageRole};
pub use request::{
    Intent, IntentRequest, LaunchRequest, Request, RequestEnvelope, RequestType, Session,
    SessionEndedRequest, Slot,
};
pub use response::{OutputSpeech, Reprompt, Response, ResponseEnvelope};

/// Attribute map carried in `session.attributes` and `sessionAttributes`.
pub type Attributes = serde_json::Map<String, serde_json::Value>;
