use alexa_gpt_types::RequestType;

/// Failures the dispatcher hands to the error handler.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("no request handler matched {request_type:?} request (intent: {intent:?})")]
    NoHandler {
        request_type: RequestType,
        intent: Option<String>,
    },
    #[error("handler '{handler}' failed")]
    HandlerFault {
        handler: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
