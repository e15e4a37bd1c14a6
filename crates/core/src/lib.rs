pub mod chat;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod secrets;
pub mod session_state;
pub mod speech;

pub use alexa_gpt_types as types;
pub use dispatcher::{Dispatcher, DispatcherBuilder, ErrorHandler, HandlerOutcome, RequestHandler};
pub use error::SkillError;
pub use handlers::skill_dispatcher;
