//! Webhook → reply pipeline
//!
//! Filters run cheapest first and short-circuit, so unrelated events and the
//! agent's own casts never reach the model or the hub.

mod types;

use types::{Cast, InboundEvent};

use crate::ai::CompletionClient;
use crate::config::Config;
use crate::error::AgentError;
use crate::farcaster::{CastPoster, ParentCast, PostCastRequest, PostingCredentials};
use crate::reply::{generate_response, ReplyContext};
use actix_web::http::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

/// Status and JSON body for the caller
#[derive(Debug)]
pub struct WebhookOutcome {
    pub status: StatusCode,
    pub body: Value,
}

impl WebhookOutcome {
    fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

pub struct ReplyPipeline {
    agent_fid: u64,
    agent_handle: String,
    persona_prompt: String,
    credentials: PostingCredentials,
    ai: Arc<dyn CompletionClient>,
    poster: Arc<dyn CastPoster>,
}

impl ReplyPipeline {
    pub fn new(
        config: &Config,
        ai: Arc<dyn CompletionClient>,
        poster: Arc<dyn CastPoster>,
    ) -> Self {
        Self {
            agent_fid: config.agent_fid,
            agent_handle: config.agent_handle.clone(),
            persona_prompt: config.system_prompt.clone(),
            credentials: PostingCredentials {
                custody_private_key: config.custody_private_key.clone(),
                signer_private_key: config.signer_private_key.clone(),
            },
            ai,
            poster,
        }
    }

    /// Handle one webhook delivery. Always produces a JSON outcome.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> WebhookOutcome {
        if *method != Method::POST {
            return WebhookOutcome::new(
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed" }),
            );
        }

        match self.process(body).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("[WEBHOOK] Error processing webhook: {}", e);
                WebhookOutcome::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Internal server error",
                        "message": e.to_string()
                    }),
                )
            }
        }
    }

    async fn process(&self, body: &[u8]) -> Result<WebhookOutcome, AgentError> {
        let body: Value = serde_json::from_slice(body)
            .map_err(|e| AgentError::Payload(format!("Invalid webhook body: {}", e)))?;

        log::debug!("[WEBHOOK] Received event: {}", body);

        let Some(event) = InboundEvent::from_body(&body) else {
            return Ok(WebhookOutcome::new(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid event structure" }),
            ));
        };

        if !event.is_cast_created() {
            return Ok(WebhookOutcome::ok(json!({
                "message": "Event type ignored",
                "type": event.event_type
            })));
        }

        let cast = Cast::from(event.data);

        if cast.author_fid() == Some(self.agent_fid) {
            return Ok(WebhookOutcome::ok(json!({ "message": "Ignoring own cast" })));
        }

        let context = ReplyContext {
            is_mention: cast.mentions(&self.agent_handle),
            is_reply: cast.parent_author_fid() == Some(self.agent_fid),
        };

        if !context.is_mention && !context.is_reply {
            return Ok(WebhookOutcome::ok(json!({ "message": "Not a mention or reply to us" })));
        }

        self.respond(&cast, context).await
    }

    async fn respond(&self, cast: &Cast, context: ReplyContext) -> Result<WebhookOutcome, AgentError> {
        let username = cast.username();
        let kind = if context.is_mention { "mention" } else { "reply" };

        log::info!(
            "[WEBHOOK] Processing {} from @{}: {:?}",
            kind,
            username,
            cast.text()
        );

        let response_text = generate_response(
            self.ai.as_ref(),
            &self.persona_prompt,
            cast.text(),
            username,
            context,
        )
        .await
        .map_err(|e| {
            if e.is_auth_error() {
                log::error!("[WEBHOOK] Completion API rejected our credentials");
            } else if e.is_rate_limited() {
                log::warn!("[WEBHOOK] Completion API rate limited us");
            }
            AgentError::Ai(e)
        })?;

        log::info!("[WEBHOOK] Generated response: {:?}", response_text);

        let parent = match (&cast.hash, cast.author_fid()) {
            (Some(hash), Some(fid)) => Some(ParentCast {
                hash: hash.clone(),
                fid,
            }),
            _ => None,
        };

        let posted = self
            .poster
            .post_cast(PostCastRequest {
                credentials: self.credentials.clone(),
                fid: self.agent_fid,
                text: response_text,
                parent,
            })
            .await?;

        log::info!("[WEBHOOK] Posted reply with hash: {}", posted.hash);

        Ok(WebhookOutcome::ok(json!({
            "success": true,
            "castHash": posted.hash,
            "respondedTo": {
                "username": username,
                "hash": cast.hash,
                "type": kind
            }
        })))
    }
}
