use super::{CastPoster, PostCastRequest, PostedCast};
use crate::error::AgentError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records posted casts and answers with a fixed hash
#[derive(Clone)]
pub struct MockCastPoster {
    hash: String,
    fail_with: Option<String>,
    posted: Arc<Mutex<Vec<PostCastRequest>>>,
}

impl MockCastPoster {
    pub fn new(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            fail_with: None,
            posted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new("")
        }
    }

    pub fn posted(&self) -> Vec<PostCastRequest> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CastPoster for MockCastPoster {
    async fn post_cast(&self, request: PostCastRequest) -> Result<PostedCast, AgentError> {
        self.posted.lock().unwrap().push(request);
        match &self.fail_with {
            Some(msg) => Err(AgentError::Posting(msg.clone())),
            None => Ok(PostedCast {
                hash: self.hash.clone(),
            }),
        }
    }
}
