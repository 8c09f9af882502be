//! Cast posting
//!
//! The agent posts replies by signing a `CastAdd` with its delegated Ed25519
//! signer key and submitting it to a Farcaster hub over HTTP.

pub mod message;
#[cfg(test)]
mod mock;

#[cfg(test)]
pub use mock::MockCastPoster;

use crate::config::derive_address_from_private_key;
use crate::error::AgentError;
use async_trait::async_trait;
use message::{build_cast_add, farcaster_timestamp, parse_cast_hash, parse_signer_key, CastId};
use prost::Message as _;
use reqwest::{header, Client};

/// Credentials used to post on behalf of the agent
#[derive(Clone, Default)]
pub struct PostingCredentials {
    /// Hex secp256k1 key of the account that owns the agent fid
    pub custody_private_key: Option<String>,
    /// Hex Ed25519 key registered as a signer for the agent fid
    pub signer_private_key: Option<String>,
}

impl PostingCredentials {
    /// Address of the custody account, when a valid custody key is present
    pub fn custody_address(&self) -> Option<String> {
        self.custody_private_key
            .as_deref()
            .and_then(|pk| derive_address_from_private_key(pk).ok())
    }
}

/// The cast being replied to
#[derive(Debug, Clone, PartialEq)]
pub struct ParentCast {
    pub hash: String,
    pub fid: u64,
}

#[derive(Clone)]
pub struct PostCastRequest {
    pub credentials: PostingCredentials,
    pub fid: u64,
    pub text: String,
    pub parent: Option<ParentCast>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedCast {
    /// `0x`-prefixed hex hash of the new cast
    pub hash: String,
}

#[async_trait]
pub trait CastPoster: Send + Sync {
    async fn post_cast(&self, request: PostCastRequest) -> Result<PostedCast, AgentError>;
}

/// Submits signed messages to a hub's HTTP API (`/v1/submitMessage`)
pub struct HubCastPoster {
    client: Client,
    submit_url: String,
    api_key: Option<String>,
}

impl HubCastPoster {
    pub fn new(hub_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            submit_url: format!("{}/v1/submitMessage", hub_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.is_empty()).map(|k| k.to_string()),
        }
    }
}

#[async_trait]
impl CastPoster for HubCastPoster {
    async fn post_cast(&self, request: PostCastRequest) -> Result<PostedCast, AgentError> {
        let signer_key = request
            .credentials
            .signer_private_key
            .as_deref()
            .ok_or_else(|| AgentError::Posting("SIGNER_PRIVATE_KEY not configured".to_string()))?;
        let signing_key = parse_signer_key(signer_key).map_err(AgentError::Posting)?;

        let parent = match &request.parent {
            Some(p) => Some(CastId {
                fid: p.fid,
                hash: parse_cast_hash(&p.hash).map_err(AgentError::Posting)?,
            }),
            None => None,
        };

        let timestamp = farcaster_timestamp(chrono::Utc::now().timestamp());
        let message = build_cast_add(request.fid, &request.text, parent, timestamp, &signing_key);
        let hash = format!("0x{}", hex::encode(&message.hash));

        log::info!(
            "[HUB] Submitting cast {} for fid {} ({} chars) to {}",
            hash,
            request.fid,
            request.text.chars().count(),
            self.submit_url
        );
        if log::log_enabled!(log::Level::Debug) {
            if let Some(custody) = request.credentials.custody_address() {
                log::debug!("[HUB] fid {} custody account {}", request.fid, custody);
            }
        }

        let mut req = self
            .client
            .post(&self.submit_url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(message.encode_to_vec());
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| AgentError::Posting(format!("Hub request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Posting(format!(
                "Hub rejected cast with status {}: {}",
                status, body
            )));
        }

        Ok(PostedCast { hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(signer: Option<&str>, parent_hash: &str) -> PostCastRequest {
        PostCastRequest {
            credentials: PostingCredentials {
                custody_private_key: None,
                signer_private_key: signer.map(|s| s.to_string()),
            },
            fid: 2634873,
            text: "hi".to_string(),
            parent: Some(ParentCast {
                hash: parent_hash.to_string(),
                fid: 999,
            }),
        }
    }

    #[test]
    fn test_submit_url() {
        let poster = HubCastPoster::new("https://hub.example/", Some(""));
        assert_eq!(poster.submit_url, "https://hub.example/v1/submitMessage");
        assert!(poster.api_key.is_none());
    }

    #[test]
    fn test_custody_address_from_credentials() {
        let mut credentials = PostingCredentials {
            custody_private_key: Some(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
            ),
            signer_private_key: None,
        };
        assert_eq!(
            credentials.custody_address().as_deref(),
            Some("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );

        credentials.custody_private_key = Some("0x1234".to_string());
        assert_eq!(credentials.custody_address(), None);
    }

    #[tokio::test]
    async fn test_missing_signer_key_is_posting_error() {
        let poster = HubCastPoster::new("http://127.0.0.1:9", None);
        let err = poster.post_cast(request(None, "0xabcd")).await.unwrap_err();
        assert_eq!(err.to_string(), "SIGNER_PRIVATE_KEY not configured");
    }

    #[tokio::test]
    async fn test_bad_parent_hash_fails_before_network() {
        let poster = HubCastPoster::new("http://127.0.0.1:9", None);
        let seed = hex::encode([3u8; 32]);
        let err = poster.post_cast(request(Some(&seed), "0xnothex")).await.unwrap_err();
        assert!(matches!(err, AgentError::Posting(ref m) if m.starts_with("Invalid cast hash")));
    }
}
