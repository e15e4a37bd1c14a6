use crate::error::SkillError;
use crate::handlers::ApologyErrorHandler;
use crate::session_state::SessionAttributes;
use alexa_gpt_types::{RequestEnvelope, Response, ResponseEnvelope};
use anyhow::Result;
use async_trait::async_trait;

/// What a handler produces: the reply and the session attributes the
/// platform should carry into the next turn.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub response: Response,
    pub attributes: SessionAttributes,
}

impl HandlerOutcome {
    pub fn new(response: Response, attributes: SessionAttributes) -> Self {
        Self {
            response,
            attributes,
        }
    }
}

/// A predicate/action pair in the dispatch table.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Used in logs and in `SkillError::HandlerFault`.
    fn name(&self) -> &'static str;

    fn can_handle(&self, envelope: &RequestEnvelope) -> bool;

    async fn handle(
        &self,
        envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome>;
}

/// Produces the reply for any request whose handling failed.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, envelope: &RequestEnvelope, error: &SkillError) -> Response;
}

/// Routes each request to the first registered handler that accepts it.
///
/// Handlers are checked strictly in registration order, so specific intents
/// must be registered before any catch-all.
pub struct Dispatcher {
    handlers: Vec<Box<dyn RequestHandler>>,
    error_handler: Box<dyn ErrorHandler>,
}

pub struct DispatcherBuilder {
    handlers: Vec<Box<dyn RequestHandler>>,
    error_handler: Option<Box<dyn ErrorHandler>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            error_handler: None,
        }
    }

    pub fn add_request_handler(mut self, handler: impl RequestHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn with_error_handler(mut self, error_handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Box::new(error_handler));
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            handlers: self.handlers,
            error_handler: self
                .error_handler
                .unwrap_or_else(|| Box::new(ApologyErrorHandler)),
        }
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Registered handler names, in priority order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    /// Handles one request. Never fails: any error becomes the error
    /// handler's reply, sent with the session attributes the request carried.
    pub async fn dispatch(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        let attributes = SessionAttributes::from_envelope(envelope);

        match self.try_dispatch(envelope, attributes.clone()).await {
            Ok(outcome) => ResponseEnvelope::new(outcome.response, outcome.attributes.into_inner()),
            Err(error) => {
                tracing::error!("~~~~ Error handled: {:?}", error);
                let response = self.error_handler.handle(envelope, &error);
                ResponseEnvelope::new(response, attributes.into_inner())
            }
        }
    }

    async fn try_dispatch(
        &self,
        envelope: &RequestEnvelope,
        attributes: SessionAttributes,
    ) -> Result<HandlerOutcome, SkillError> {
        let handler = self
            .handlers
            .iter()
            .find(|handler| handler.can_handle(envelope))
            .ok_or_else(|| SkillError::NoHandler {
                request_type: envelope.request_type(),
                intent: envelope.intent_name().map(str::to_string),
            })?;

        tracing::info!(
            "dispatching {:?} request (intent: {:?}) to {}",
            envelope.request_type(),
            envelope.intent_name(),
            handler.name()
        );

        handler
            .handle(envelope, attributes)
            .await
            .map_err(|source| SkillError::HandlerFault {
                handler: handler.name(),
                source,
            })
    }
}
