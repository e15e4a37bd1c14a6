use crate::Attributes;
use std::collections::HashMap;

/// The JSON body the voice platform delivers for every invocation.
///
/// Only the fields the skill consumes are modelled; everything else in the
/// platform schema (`context`, device and user details) is ignored on input.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct RequestEnvelope {
    #[serde(default = "default_version")]
    pub version: String,

    /// Absent for requests that arrive outside of a session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    pub request: Request,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl RequestEnvelope {
    pub fn new(request: Request) -> Self {
        Self {
            version: default_version(),
            session: None,
            request,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn request_type(&self) -> RequestType {
        self.request.request_type()
    }

    /// Name of the recognized intent; `None` unless this is an intent request.
    pub fn intent_name(&self) -> Option<&str> {
        match &self.request {
            Request::Intent(request) => Some(request.intent.name.as_str()),
            _ => None,
        }
    }

    /// Resolved value of the named slot, if the intent carries it.
    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        match &self.request {
            Request::Intent(request) => request.intent.slot_value(slot),
            _ => None,
        }
    }

    /// Session attributes as they arrived; empty when no session is attached.
    pub fn session_attributes(&self) -> Attributes {
        self.session
            .as_ref()
            .map(|session| session.attributes.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "new", default)]
    pub is_new: bool,

    pub session_id: String,

    #[serde(default)]
    pub attributes: Attributes,
}

impl Session {
    pub fn new(session_id: &str) -> Self {
        Self {
            is_new: true,
            session_id: session_id.to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.is_new = false;
        self.attributes = attributes;
        self
    }
}

/// Coarse request classification used by handler predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Launch,
    Intent,
    SessionEnded,
    Other,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "LaunchRequest")]
    Launch(LaunchRequest),
    #[serde(rename = "IntentRequest")]
    Intent(IntentRequest),
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded(SessionEndedRequest),
    /// Any request type this skill has no model for (display, audio player, ...).
    #[serde(other)]
    Other,
}

impl Request {
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::Launch(_) => RequestType::Launch,
            Request::Intent(_) => RequestType::Intent,
            Request::SessionEnded(_) => RequestType::SessionEnded,
            Request::Other => RequestType::Other,
        }
    }

    pub fn launch(request_id: &str) -> Self {
        Request::Launch(LaunchRequest {
            request_id: request_id.to_string(),
            timestamp: None,
            locale: None,
        })
    }

    pub fn intent(request_id: &str, intent: Intent) -> Self {
        Request::Intent(IntentRequest {
            request_id: request_id.to_string(),
            timestamp: None,
            locale: None,
            dialog_state: None,
            intent,
        })
    }

    pub fn session_ended(request_id: &str, reason: &str) -> Self {
        Request::SessionEnded(SessionEndedRequest {
            request_id: request_id.to_string(),
            timestamp: None,
            locale: None,
            reason: Some(reason.to_string()),
            error: None,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_state: Option<String>,
    pub intent: Intent,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// "USER_INITIATED", "ERROR" or "EXCEEDED_MAX_REPROMPTS".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            confirmation_status: None,
            slots: HashMap::new(),
        }
    }

    pub fn with_slot(mut self, name: &str, value: &str) -> Self {
        self.slots.insert(
            name.to_string(),
            Slot {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
        );
        self
    }

    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots.get(name).and_then(|slot| slot.value.as_deref())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Slot {
    pub name: String,
    /// Unfilled slots are sent without a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
