//! Spoken replies and the fixed phrases the skill uses.

use alexa_gpt_types::Response;

pub const GREETING: &str = "こんにちは！何かご質問がありますか？";
pub const HELP: &str = "何か聞きたいことを話しかけてください。";
pub const FAREWELL: &str = "何か必要になった際は、いつでもお声がけください！";
pub const NOT_UNDERSTOOD: &str = "すみません、よくわかりませんでした。もう一度お願いします。";

/// Instructions sent as the first message of every chat completion.
pub const SYSTEM_PROMPT: &str = include_str!("../prompts/system.md");

/// Builds a response that speaks `text`.
///
/// With `reprompt` the same text is repeated if the user stays silent and the
/// session stays open. Without it the platform closes the session after
/// speaking.
pub fn speak(text: &str, reprompt: bool) -> Response {
    let response = Response::empty().with_speech(text);
    if reprompt {
        response.with_reprompt(text)
    } else {
        response
    }
}

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speak_with_reprompt_repeats_text_and_keeps_session_open() {
        let response = speak(GREETING, true);

        assert_eq!(response.spoken_text(), Some(GREETING));
        assert_eq!(response.reprompt_text(), Some(GREETING));
        assert!(response.session_open());
    }

    #[test]
    fn speak_without_reprompt_defers_to_platform_default() {
        let response = speak(FAREWELL, false);

        assert_eq!(response.spoken_text(), Some(FAREWELL));
        assert_eq!(response.reprompt_text(), None);
        assert_eq!(response.should_end_session, None);
    }

    #[test]
    fn system_prompt_is_trimmed_and_mentions_limit() {
        let prompt = system_prompt();

        assert!(prompt.starts_with("あなたはアレクサです。"));
        assert!(prompt.ends_with("遵守してください。"));
        assert!(prompt.contains("200文字以内"));
    }
}
