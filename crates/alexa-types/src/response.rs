use crate::Attributes;

/// The JSON body returned to the voice platform for every invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,

    /// Attributes the platform hands back on the next turn of this session.
    #[serde(default)]
    pub session_attributes: Attributes,

    pub response: Response,
}

impl ResponseEnvelope {
    pub fn new(response: Response, session_attributes: Attributes) -> Self {
        Self {
            version: "1.0".to_string(),
            session_attributes,
            response,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,

    /// Left unset unless a reprompt keeps the session open; the platform then
    /// applies its own default and closes the session after speaking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

impl Response {
    /// A response with no speech at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_speech(mut self, text: &str) -> Self {
        self.output_speech = Some(OutputSpeech::plain_text(text));
        self
    }

    /// Sets the prompt spoken again when the user stays silent. This keeps
    /// the session open.
    pub fn with_reprompt(mut self, text: &str) -> Self {
        self.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::plain_text(text),
        });
        self.should_end_session = Some(false);
        self
    }

    pub fn spoken_text(&self) -> Option<&str> {
        self.output_speech.as_ref().map(OutputSpeech::text)
    }

    pub fn reprompt_text(&self) -> Option<&str> {
        self.reprompt
            .as_ref()
            .map(|reprompt| reprompt.output_speech.text())
    }

    pub fn session_open(&self) -> bool {
        self.should_end_session == Some(false)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "PlainText")]
    PlainText { text: String },
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
}

impl OutputSpeech {
    pub fn plain_text(text: &str) -> Self {
        OutputSpeech::PlainText {
            text: text.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            OutputSpeech::PlainText { text } => text,
            OutputSpeech::Ssml { ssml } => ssml,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}
