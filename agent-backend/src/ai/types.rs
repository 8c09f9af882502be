use std::fmt;

/// Error from a completion API call
#[derive(Debug, Clone)]
pub struct AiError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl AiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// 401/403 from the provider
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status_code, Some(401) | Some(403))
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code == Some(429)
    }
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AiError {}
