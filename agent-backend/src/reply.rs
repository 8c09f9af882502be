//! Reply drafting. Brevity is asked for in the prompt only; the text comes
//! back as the model wrote it, trimmed.

use crate::ai::{AiError, CompletionClient, CompletionRequest};

const REPLY_MAX_TOKENS: u32 = 150;
const REPLY_TEMPERATURE: f32 = 0.9;

/// How the cast reached us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyContext {
    pub is_reply: bool,
    pub is_mention: bool,
}

pub fn build_user_prompt(user_message: &str, username: &str, context: ReplyContext) -> String {
    let situation = if context.is_reply {
        "This is a reply to one of your casts."
    } else {
        "This is a mention of you."
    };

    format!(
        "@{username} said: \"{user_message}\"\n\n{situation}\n\nRespond as Rish trapped in @claudeagent. Keep it short and punchy for social media."
    )
}

pub async fn generate_response(
    client: &dyn CompletionClient,
    persona_prompt: &str,
    user_message: &str,
    username: &str,
    context: ReplyContext,
) -> Result<String, AiError> {
    let request = CompletionRequest::new(
        persona_prompt,
        build_user_prompt(user_message, username, context),
    )
    .max_completion_tokens(REPLY_MAX_TOKENS)
    .temperature(REPLY_TEMPERATURE);

    let text = client.complete(request).await?;
    Ok(text.trim().to_string())
}
