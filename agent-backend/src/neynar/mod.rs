//! Neynar social-graph API client
//!
//! Read-only lookups used by the follow evaluator. Each call is a single GET
//! authenticated with the static `api_key` header; no retry, no pagination.

#[cfg(test)]
mod mock;
mod types;

#[cfg(test)]
pub use mock::MockSocialGraph;
pub use types::{FeedCast, User};

use crate::error::AgentError;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use types::{BulkUsersResponse, CastsResponse, UserResponse};

/// Social-graph lookups the agent depends on
#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn user_by_fid(&self, fid: u64) -> Result<Option<User>, AgentError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AgentError>;

    /// Most recent casts first, at most `limit`
    async fn user_casts(&self, fid: u64, limit: u32) -> Result<Vec<FeedCast>, AgentError>;

    /// Whether `viewer_fid` follows `target_fid`
    async fn is_following(&self, viewer_fid: u64, target_fid: u64) -> Result<bool, AgentError>;
}

#[derive(Clone)]
pub struct NeynarClient {
    client: Client,
    headers: header::HeaderMap,
    base_url: String,
}

impl NeynarClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let key_value = header::HeaderValue::from_str(api_key)
            .map_err(|e| format!("Invalid Neynar API key format: {}", e))?;
        headers.insert("api_key", key_value);

        Ok(Self {
            client: Client::new(),
            headers,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AgentError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("[NEYNAR] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| AgentError::SocialGraph(format!("Neynar request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::SocialGraph(format!("Failed to read Neynar response: {}", e)))?;

        if !status.is_success() {
            log::warn!("[NEYNAR] {} returned status {}", path, status);
        }

        parse_body(&body)
    }
}

/// Decode a response body; non-JSON bodies are an error carrying the body
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, AgentError> {
    serde_json::from_str(body)
        .map_err(|_| AgentError::SocialGraph(format!("Failed to parse response: {}", body)))
}

/// Strip the first `@` so both "alice" and "@alice" resolve
fn clean_username(username: &str) -> String {
    username.replacen('@', "", 1)
}

fn user_bulk_path(fid: u64) -> String {
    format!("/v2/farcaster/user/bulk?fids={}", fid)
}

fn user_by_username_path(username: &str) -> String {
    format!(
        "/v2/farcaster/user/by_username?username={}",
        urlencoding::encode(&clean_username(username))
    )
}

fn user_casts_path(fid: u64, limit: u32) -> String {
    format!("/v2/farcaster/feed/user/casts?fid={}&limit={}", fid, limit)
}

fn follow_state_path(viewer_fid: u64, target_fid: u64) -> String {
    format!(
        "/v2/farcaster/user/bulk?fids={}&viewer_fid={}",
        target_fid, viewer_fid
    )
}

#[async_trait]
impl SocialGraph for NeynarClient {
    async fn user_by_fid(&self, fid: u64) -> Result<Option<User>, AgentError> {
        let data: BulkUsersResponse = self.get(&user_bulk_path(fid)).await?;
        Ok(data.users.and_then(|users| users.into_iter().next()))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AgentError> {
        let data: UserResponse = self.get(&user_by_username_path(username)).await?;
        Ok(data.user)
    }

    async fn user_casts(&self, fid: u64, limit: u32) -> Result<Vec<FeedCast>, AgentError> {
        let data: CastsResponse = self.get(&user_casts_path(fid, limit)).await?;
        Ok(data.casts.unwrap_or_default())
    }

    async fn is_following(&self, viewer_fid: u64, target_fid: u64) -> Result<bool, AgentError> {
        let data: BulkUsersResponse = self.get(&follow_state_path(viewer_fid, target_fid)).await?;
        Ok(data
            .users
            .and_then(|users| users.into_iter().next())
            .map(|u| u.viewer_follows())
            .unwrap_or(false))
    }
}
