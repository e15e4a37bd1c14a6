//! The skill's request handlers and the order they are registered in.

use crate::chat::ChatCompletion;
use crate::dispatcher::{Dispatcher, ErrorHandler, HandlerOutcome, RequestHandler};
use crate::error::SkillError;
use crate::session_state::{Conversation, SessionAttributes};
use crate::speech::{self, speak};
use alexa_gpt_types::{RequestEnvelope, RequestType, Response};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const GPT_INTENT: &str = "GPTIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";

/// Slot carrying the user's free-form utterance for `GPTIntent`.
pub const PROMPT_SLOT: &str = "any";

fn is_intent(envelope: &RequestEnvelope, name: &str) -> bool {
    envelope.request_type() == RequestType::Intent && envelope.intent_name() == Some(name)
}

/// Builds the skill's dispatcher.
///
/// Order matters: the reflector accepts every intent request, so it must stay
/// last or it would shadow the specific intents above it.
pub fn skill_dispatcher(chat: Arc<dyn ChatCompletion>, system_prompt: &str) -> Dispatcher {
    Dispatcher::builder()
        .add_request_handler(LaunchRequestHandler)
        .add_request_handler(GptIntentHandler::new(chat, system_prompt))
        .add_request_handler(HelpIntentHandler)
        .add_request_handler(CancelAndStopIntentHandler)
        .add_request_handler(FallbackIntentHandler)
        .add_request_handler(SessionEndedRequestHandler)
        .add_request_handler(IntentReflectorHandler)
        .with_error_handler(ApologyErrorHandler)
        .build()
}

pub struct LaunchRequestHandler;

#[async_trait]
impl RequestHandler for LaunchRequestHandler {
    fn name(&self) -> &'static str {
        "LaunchRequestHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        envelope.request_type() == RequestType::Launch
    }

    async fn handle(
        &self,
        _envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        Ok(HandlerOutcome::new(speak(speech::GREETING, true), attributes))
    }
}

/// Forwards the user's utterance to the chat model and speaks the reply,
/// keeping the exchange in the session's history.
pub struct GptIntentHandler {
    chat: Arc<dyn ChatCompletion>,
    system_prompt: String,
}

impl GptIntentHandler {
    pub fn new(chat: Arc<dyn ChatCompletion>, system_prompt: &str) -> Self {
        Self {
            chat,
            system_prompt: system_prompt.to_string(),
        }
    }
}

#[async_trait]
impl RequestHandler for GptIntentHandler {
    fn name(&self) -> &'static str {
        "GPTIntentHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        is_intent(envelope, GPT_INTENT)
    }

    async fn handle(
        &self,
        envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        let prompt = envelope
            .slot_value(PROMPT_SLOT)
            .with_context(|| format!("{GPT_INTENT} request has no '{PROMPT_SLOT}' slot value"))?;
        tracing::info!("prompt: {}", prompt);

        let conversation = Conversation::from_attributes(&attributes)?;
        tracing::debug!("previous messages: {:?}", conversation.history());

        let output = self
            .chat
            .ask(conversation.request_messages(&self.system_prompt, prompt))
            .await
            .context("Chat completion failed")?;

        let conversation = conversation.with_turn(prompt, &output);
        tracing::debug!("saved messages: {:?}", conversation.history());
        let attributes = conversation.into_attributes(attributes)?;

        Ok(HandlerOutcome::new(speak(&output, true), attributes))
    }
}

pub struct HelpIntentHandler;

#[async_trait]
impl RequestHandler for HelpIntentHandler {
    fn name(&self) -> &'static str {
        "HelpIntentHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        is_intent(envelope, HELP_INTENT)
    }

    async fn handle(
        &self,
        _envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        Ok(HandlerOutcome::new(speak(speech::HELP, true), attributes))
    }
}

pub struct CancelAndStopIntentHandler;

#[async_trait]
impl RequestHandler for CancelAndStopIntentHandler {
    fn name(&self) -> &'static str {
        "CancelAndStopIntentHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        is_intent(envelope, CANCEL_INTENT) || is_intent(envelope, STOP_INTENT)
    }

    async fn handle(
        &self,
        _envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        Ok(HandlerOutcome::new(speak(speech::FAREWELL, false), attributes))
    }
}

/// Triggered when an utterance maps to no intent of the interaction model.
pub struct FallbackIntentHandler;

#[async_trait]
impl RequestHandler for FallbackIntentHandler {
    fn name(&self) -> &'static str {
        "FallbackIntentHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        is_intent(envelope, FALLBACK_INTENT)
    }

    async fn handle(
        &self,
        _envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        Ok(HandlerOutcome::new(
            speak(speech::NOT_UNDERSTOOD, true),
            attributes,
        ))
    }
}

/// The platform reports a closed session (user exit, silence, or an error).
/// Nothing may be spoken in reply.
pub struct SessionEndedRequestHandler;

#[async_trait]
impl RequestHandler for SessionEndedRequestHandler {
    fn name(&self) -> &'static str {
        "SessionEndedRequestHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        envelope.request_type() == RequestType::SessionEnded
    }

    async fn handle(
        &self,
        envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        tracing::info!(
            "~~~~ Session ended: {}",
            serde_json::to_string(envelope).unwrap_or_default()
        );
        Ok(HandlerOutcome::new(Response::empty(), attributes))
    }
}

/// Repeats the name of any intent that reached it. Used to exercise the
/// interaction model while developing new intents.
pub struct IntentReflectorHandler;

#[async_trait]
impl RequestHandler for IntentReflectorHandler {
    fn name(&self) -> &'static str {
        "IntentReflectorHandler"
    }

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool {
        envelope.request_type() == RequestType::Intent
    }

    async fn handle(
        &self,
        envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome> {
        let intent_name = envelope.intent_name().unwrap_or_default();
        let output = format!("You just triggered {intent_name}");
        Ok(HandlerOutcome::new(speak(&output, false), attributes))
    }
}

/// Answers every failure with the same apology and keeps the session open.
pub struct ApologyErrorHandler;

impl ErrorHandler for ApologyErrorHandler {
    fn handle(&self, _envelope: &RequestEnvelope, _error: &SkillError) -> Response {
        speak(speech::NOT_UNDERSTOOD, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, MockChatCompletion};
    use crate::secrets::SecretError;
    use alexa_gpt_types::{Attributes, ChatMessage, Intent, Request, Session};
    use serde_json::json;

    const SYSTEM: &str = "system rules";

    fn dispatcher_with(chat: MockChatCompletion) -> Dispatcher {
        skill_dispatcher(Arc::new(chat), SYSTEM)
    }

    /// A dispatcher whose chat client must never be called.
    fn dispatcher_without_chat() -> Dispatcher {
        let mut chat = MockChatCompletion::new();
        chat.expect_ask().never();
        dispatcher_with(chat)
    }

    fn launch() -> RequestEnvelope {
        RequestEnvelope::new(Request::launch("r-launch")).with_session(Session::new("s-1"))
    }

    fn intent(intent: Intent) -> RequestEnvelope {
        RequestEnvelope::new(Request::intent("r-intent", intent)).with_session(Session::new("s-1"))
    }

    fn gpt_turn(prompt: &str, attributes: Attributes) -> RequestEnvelope {
        RequestEnvelope::new(Request::intent(
            "r-gpt",
            Intent::new(GPT_INTENT).with_slot(PROMPT_SLOT, prompt),
        ))
        .with_session(Session::new("s-1").with_attributes(attributes))
    }

    #[test]
    fn handlers_are_registered_most_specific_first() {
        let dispatcher = dispatcher_without_chat();
        assert_eq!(
            dispatcher.handler_names(),
            vec![
                "LaunchRequestHandler",
                "GPTIntentHandler",
                "HelpIntentHandler",
                "CancelAndStopIntentHandler",
                "FallbackIntentHandler",
                "SessionEndedRequestHandler",
                "IntentReflectorHandler",
            ]
        );
    }

    #[tokio::test]
    async fn launch_greets_and_keeps_session_open() {
        let reply = dispatcher_without_chat().dispatch(&launch()).await;

        assert_eq!(reply.response.spoken_text(), Some(speech::GREETING));
        assert_eq!(reply.response.reprompt_text(), Some(speech::GREETING));
        assert!(reply.response.session_open());
    }

    #[tokio::test]
    async fn repeated_launch_is_idempotent() {
        let dispatcher = dispatcher_without_chat();

        let first = dispatcher.dispatch(&launch()).await;
        let second = dispatcher.dispatch(&launch()).await;

        assert_eq!(first, second);
        assert!(first.session_attributes.is_empty());
    }

    #[tokio::test]
    async fn fixed_intents_ignore_slot_contents() {
        let dispatcher = dispatcher_without_chat();
        let cases = [
            (HELP_INTENT, speech::HELP, true),
            (CANCEL_INTENT, speech::FAREWELL, false),
            (STOP_INTENT, speech::FAREWELL, false),
            (FALLBACK_INTENT, speech::NOT_UNDERSTOOD, true),
        ];

        for (name, text, reprompt) in cases {
            for envelope in [
                intent(Intent::new(name)),
                intent(Intent::new(name).with_slot("any", "関係ない言葉")),
            ] {
                let reply = dispatcher.dispatch(&envelope).await;
                assert_eq!(reply.response.spoken_text(), Some(text), "{name}");
                assert_eq!(reply.response.session_open(), reprompt, "{name}");
                assert_eq!(
                    reply.response.reprompt_text().is_some(),
                    reprompt,
                    "{name}"
                );
            }
        }
    }

    #[tokio::test]
    async fn unknown_intents_fall_through_to_reflector() {
        let reply = dispatcher_without_chat()
            .dispatch(&intent(Intent::new("WeatherIntent")))
            .await;

        assert_eq!(
            reply.response.spoken_text(),
            Some("You just triggered WeatherIntent")
        );
        assert_eq!(reply.response.reprompt_text(), None);
    }

    #[tokio::test]
    async fn session_ended_replies_with_nothing() {
        let envelope = RequestEnvelope::new(Request::session_ended("r-end", "USER_INITIATED"));
        let reply = dispatcher_without_chat().dispatch(&envelope).await;

        assert_eq!(reply.response, Response::empty());
    }

    #[tokio::test]
    async fn first_gpt_turn_sends_system_and_user_and_stores_both_turns() {
        let mut chat = MockChatCompletion::new();
        chat.expect_ask()
            .withf(|messages| {
                messages == &vec![ChatMessage::system(SYSTEM), ChatMessage::user("X")]
            })
            .returning(|_| Ok("A".to_string()))
            .once();

        let reply = dispatcher_with(chat)
            .dispatch(&gpt_turn("X", Attributes::new()))
            .await;

        assert_eq!(reply.response.spoken_text(), Some("A"));
        assert_eq!(reply.response.reprompt_text(), Some("A"));
        assert!(reply.response.session_open());
        assert_eq!(
            reply.session_attributes.get("messages"),
            Some(&json!([
                { "role": "user", "content": "X" },
                { "role": "assistant", "content": "A" }
            ]))
        );
    }

    #[tokio::test]
    async fn second_gpt_turn_sends_full_history_in_order() {
        let mut chat = MockChatCompletion::new();
        chat.expect_ask()
            .withf(|messages| {
                messages
                    == &vec![
                        ChatMessage::system(SYSTEM),
                        ChatMessage::user("X"),
                        ChatMessage::assistant("A"),
                        ChatMessage::user("Y"),
                    ]
            })
            .returning(|_| Ok("B".to_string()))
            .once();

        let dispatcher = dispatcher_with(chat);
        let mut attributes = Attributes::new();
        attributes.insert(
            "messages".to_string(),
            json!([
                { "role": "user", "content": "X" },
                { "role": "assistant", "content": "A" }
            ]),
        );

        let reply = dispatcher.dispatch(&gpt_turn("Y", attributes)).await;

        assert_eq!(reply.response.spoken_text(), Some("B"));
        assert_eq!(
            reply.session_attributes.get("messages"),
            Some(&json!([
                { "role": "user", "content": "X" },
                { "role": "assistant", "content": "A" },
                { "role": "user", "content": "Y" },
                { "role": "assistant", "content": "B" }
            ]))
        );
    }

    #[tokio::test]
    async fn missing_secret_yields_apology_and_keeps_history() {
        let mut chat = MockChatCompletion::new();
        chat.expect_ask()
            .returning(|_| {
                Err(ChatError::CredentialUnavailable(SecretError::NotFound(
                    "OPENAI_API_KEY".to_string(),
                )))
            })
            .once();

        let mut attributes = Attributes::new();
        attributes.insert(
            "messages".to_string(),
            json!([
                { "role": "user", "content": "X" },
                { "role": "assistant", "content": "A" }
            ]),
        );

        let reply = dispatcher_with(chat)
            .dispatch(&gpt_turn("Y", attributes.clone()))
            .await;

        assert_eq!(reply.response.spoken_text(), Some(speech::NOT_UNDERSTOOD));
        assert!(reply.response.session_open());
        assert_eq!(reply.session_attributes, attributes);
    }

    #[tokio::test]
    async fn upstream_failure_yields_apology() {
        let mut chat = MockChatCompletion::new();
        chat.expect_ask()
            .returning(|_| Err(ChatError::UpstreamFailure("503".to_string())))
            .once();

        let reply = dispatcher_with(chat)
            .dispatch(&gpt_turn("X", Attributes::new()))
            .await;

        assert_eq!(reply.response.spoken_text(), Some(speech::NOT_UNDERSTOOD));
        assert!(reply.session_attributes.is_empty());
    }

    #[tokio::test]
    async fn gpt_intent_without_prompt_slot_yields_apology() {
        let reply = dispatcher_without_chat()
            .dispatch(&intent(Intent::new(GPT_INTENT)))
            .await;

        assert_eq!(reply.response.spoken_text(), Some(speech::NOT_UNDERSTOOD));
    }
}
