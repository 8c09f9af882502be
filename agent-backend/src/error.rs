use crate::ai::AiError;
use std::fmt;

/// Failures that abort a request. Expected outcomes (already following,
/// quota exhausted, unparsable model output) are decisions, not errors.
#[derive(Debug)]
pub enum AgentError {
    /// Completion API failure (auth, rate limit, network, bad body)
    Ai(AiError),
    /// Social-graph API failure
    SocialGraph(String),
    /// Cast signing or hub submission failure
    Posting(String),
    /// Inbound body that could not be decoded
    Payload(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Ai(e) => write!(f, "{}", e),
            AgentError::SocialGraph(msg) => write!(f, "{}", msg),
            AgentError::Posting(msg) => write!(f, "{}", msg),
            AgentError::Payload(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<AiError> for AgentError {
    fn from(e: AiError) -> Self {
        AgentError::Ai(e)
    }
}
