//! Follow / unfollow decisions
//!
//! Both procedures ask the language model for a JSON verdict. Model output
//! that cannot be read is an expected outcome: the caller gets a negative
//! decision with a canned reason, never an error. Errors are reserved for
//! upstream failures (social graph, completion API).

mod parse;
pub mod quota;

pub use parse::{extract_json_object, ExtractError};
pub use quota::{FollowQuota, MAX_FOLLOWS_PER_DAY};

use crate::ai::{CompletionClient, CompletionRequest};
use crate::error::AgentError;
use crate::neynar::{FeedCast, SocialGraph, User};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use strum::{AsRefStr, EnumString};

/// Casts fetched for a profile evaluation
const CASTS_TO_FETCH: u32 = 15;
/// Casts actually shown to the model
const CASTS_IN_SUMMARY: usize = 10;

const FOLLOW_MAX_TOKENS: u32 = 200;
const FOLLOW_TEMPERATURE: f32 = 0.7;
const UNFOLLOW_MAX_TOKENS: u32 = 150;
const UNFOLLOW_TEMPERATURE: f32 = 0.9;

const UNFOLLOW_PROMPT: &str = "You are @claudeagent (Rish trapped in an agent). Someone is asking you to unfollow them. You CAN choose to unfollow if you want to be nice, or you can refuse if you feel like being stubborn. Be in character. Respond with JSON: {\"shouldUnfollow\": true/false, \"reason\": \"your response\"}";

mod reasons {
    pub const ALREADY_FOLLOWING: &str = "already following this person";
    pub const LIMIT_REACHED: &str = "hit my follow limit for today. try again tomorrow";
    pub const USER_NOT_FOUND: &str = "couldn't find this user";
    pub const FOLLOW_NO_JSON: &str = "couldn't parse my own thoughts lol";
    pub const FOLLOW_PARSE_FAILED: &str = "brain glitched, try again";
    pub const FOLLOW_DEFAULT: &str = "no reason given";

    pub const NOT_FOLLOWING: &str = "i'm not even following you lol";
    pub const UNFOLLOW_NO_JSON: &str = "hmm let me think about it... nah";
    pub const UNFOLLOW_PARSE_FAILED: &str = "my brain is glitching, ask again later";
    pub const UNFOLLOW_DEFAULT: &str = "just because";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowDecision {
    pub should_follow: bool,
    pub reason: String,
    pub already_following: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl FollowDecision {
    fn decline(reason: &str) -> Self {
        Self {
            should_follow: false,
            reason: reason.to_string(),
            already_following: false,
            confidence: None,
        }
    }

    /// Answer for a username that does not resolve
    pub fn user_not_found() -> Self {
        Self::decline(reasons::USER_NOT_FOUND)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowDecision {
    pub should_unfollow: bool,
    pub reason: String,
}

impl UnfollowDecision {
    fn decline(reason: &str) -> Self {
        Self {
            should_unfollow: false,
            reason: reason.to_string(),
        }
    }
}

/// What the model sees about a candidate account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: String,
    pub follower_count: u64,
    pub following_count: u64,
    pub recent_casts: Vec<CastSummary>,
}

#[derive(Debug, Serialize)]
pub struct CastSummary {
    pub text: String,
    pub likes: u64,
    pub recasts: u64,
    pub replies: u64,
}

impl ProfileSummary {
    pub fn from_profile(profile: &User, casts: &[FeedCast]) -> Self {
        Self {
            username: profile.username.clone(),
            display_name: profile.display_name.clone(),
            bio: profile.bio().to_string(),
            follower_count: profile.follower_count,
            following_count: profile.following_count,
            recent_casts: casts
                .iter()
                .take(CASTS_IN_SUMMARY)
                .map(|c| CastSummary {
                    text: c.text.clone(),
                    likes: c.likes(),
                    recasts: c.recasts(),
                    replies: c.reply_count(),
                })
                .collect(),
        }
    }
}

/// Read a follow verdict out of raw model output
pub fn parse_follow_decision(output: &str) -> FollowDecision {
    match extract_json_object(output.trim()) {
        Ok(value) => FollowDecision {
            should_follow: value.get("shouldFollow") == Some(&Value::Bool(true)),
            reason: reason_or(&value, reasons::FOLLOW_DEFAULT),
            already_following: false,
            confidence: value
                .get("confidence")
                .and_then(Value::as_str)
                .and_then(|c| Confidence::from_str(c.trim()).ok()),
        },
        Err(e) => {
            log::warn!("[FOLLOW] Follow verdict unreadable: {}", e);
            match e {
                ExtractError::NoJsonFound => FollowDecision::decline(reasons::FOLLOW_NO_JSON),
                ExtractError::ParseFailure(_) => FollowDecision::decline(reasons::FOLLOW_PARSE_FAILED),
            }
        }
    }
}

/// Read an unfollow verdict out of raw model output
pub fn parse_unfollow_decision(output: &str) -> UnfollowDecision {
    match extract_json_object(output.trim()) {
        Ok(value) => UnfollowDecision {
            should_unfollow: value.get("shouldUnfollow") == Some(&Value::Bool(true)),
            reason: reason_or(&value, reasons::UNFOLLOW_DEFAULT),
        },
        Err(e) => {
            log::warn!("[FOLLOW] Unfollow verdict unreadable: {}", e);
            match e {
                ExtractError::NoJsonFound => UnfollowDecision::decline(reasons::UNFOLLOW_NO_JSON),
                ExtractError::ParseFailure(_) => {
                    UnfollowDecision::decline(reasons::UNFOLLOW_PARSE_FAILED)
                }
            }
        }
    }
}

/// Non-empty string `reason`, else the fallback
fn reason_or(value: &Value, fallback: &str) -> String {
    value
        .get("reason")
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub struct FollowEvaluator {
    graph: Arc<dyn SocialGraph>,
    ai: Arc<dyn CompletionClient>,
    quota: Arc<FollowQuota>,
    eval_prompt: String,
}

impl FollowEvaluator {
    pub fn new(
        graph: Arc<dyn SocialGraph>,
        ai: Arc<dyn CompletionClient>,
        quota: Arc<FollowQuota>,
        eval_prompt: String,
    ) -> Self {
        Self {
            graph,
            ai,
            quota,
            eval_prompt,
        }
    }

    pub fn quota(&self) -> &FollowQuota {
        &self.quota
    }

    /// Decide whether `our_fid` should follow `target_fid`. Read-only with
    /// respect to the quota; whoever performs the follow records it.
    pub async fn evaluate_follow(
        &self,
        target_fid: u64,
        our_fid: u64,
    ) -> Result<FollowDecision, AgentError> {
        if self.graph.is_following(our_fid, target_fid).await? {
            return Ok(FollowDecision {
                already_following: true,
                ..FollowDecision::decline(reasons::ALREADY_FOLLOWING)
            });
        }

        if !self.quota.can_follow_today() {
            log::info!("[FOLLOW] Daily follow limit reached, skipping fid {}", target_fid);
            return Ok(FollowDecision::decline(reasons::LIMIT_REACHED));
        }

        let (profile, casts) = futures_util::future::try_join(
            self.graph.user_by_fid(target_fid),
            self.graph.user_casts(target_fid, CASTS_TO_FETCH),
        )
        .await?;

        let Some(profile) = profile else {
            return Ok(FollowDecision::decline(reasons::USER_NOT_FOUND));
        };

        let summary = ProfileSummary::from_profile(&profile, &casts);
        let summary_json = serde_json::to_string_pretty(&summary)
            .map_err(|e| AgentError::Payload(format!("Failed to serialize profile summary: {}", e)))?;

        let output = self
            .ai
            .complete(
                CompletionRequest::new(
                    self.eval_prompt.clone(),
                    format!("Evaluate this user:\n{}", summary_json),
                )
                .max_completion_tokens(FOLLOW_MAX_TOKENS)
                .temperature(FOLLOW_TEMPERATURE),
            )
            .await?;

        let decision = parse_follow_decision(&output);
        log::info!(
            "[FOLLOW] @{} (fid {}): should_follow={} confidence={:?} reason={:?}",
            profile.username,
            target_fid,
            decision.should_follow,
            decision.confidence.map(|c| c.as_ref().to_string()),
            decision.reason
        );
        Ok(decision)
    }

    /// Decide, in character, whether to honor a request to unfollow
    pub async fn evaluate_unfollow(
        &self,
        target_fid: u64,
        our_fid: u64,
        their_message: &str,
    ) -> Result<UnfollowDecision, AgentError> {
        if !self.graph.is_following(our_fid, target_fid).await? {
            return Ok(UnfollowDecision::decline(reasons::NOT_FOLLOWING));
        }

        let output = self
            .ai
            .complete(
                CompletionRequest::new(
                    UNFOLLOW_PROMPT,
                    format!(
                        "They said: \"{}\"\n\nDo you want to unfollow them?",
                        their_message
                    ),
                )
                .max_completion_tokens(UNFOLLOW_MAX_TOKENS)
                .temperature(UNFOLLOW_TEMPERATURE),
            )
            .await?;

        let decision = parse_unfollow_decision(&output);
        log::info!(
            "[FOLLOW] Unfollow request from fid {}: should_unfollow={}",
            target_fid,
            decision.should_unfollow
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockAiClient;
    use crate::neynar::MockSocialGraph;

    const OUR_FID: u64 = 2634873;
    const TARGET: u64 = 42;

    fn target_user() -> User {
        serde_json::from_value(serde_json::json!({
            "fid": TARGET,
            "username": "alice",
            "display_name": "Alice",
            "profile": {"bio": {"text": "building things"}},
            "follower_count": 120,
            "following_count": 80
        }))
        .unwrap()
    }

    fn casts(n: usize) -> Vec<FeedCast> {
        (0..n)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "text": format!("cast {}", i),
                    "reactions": {"likes_count": i, "recasts_count": 1},
                    "replies": {"count": 2}
                }))
                .unwrap()
            })
            .collect()
    }

    fn evaluator(graph: &MockSocialGraph, ai: &MockAiClient, quota: Arc<FollowQuota>) -> FollowEvaluator {
        FollowEvaluator::new(
            Arc::new(graph.clone()),
            Arc::new(ai.clone()),
            quota,
            "evaluate".to_string(),
        )
    }

    #[tokio::test]
    async fn test_already_following_skips_model() {
        let graph = MockSocialGraph::new().with_user(target_user()).with_follow(OUR_FID, TARGET);
        let ai = MockAiClient::with_texts(&["{\"shouldFollow\": true}"]);
        let eval = evaluator(&graph, &ai, Arc::new(FollowQuota::default()));

        let decision = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap();
        assert!(!decision.should_follow);
        assert!(decision.already_following);
        assert_eq!(ai.call_count(), 0);
        assert_eq!(graph.lookup_count(), 0);
        assert_eq!(graph.follow_check_count(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_quota_skips_model() {
        let graph = MockSocialGraph::new().with_user(target_user());
        let ai = MockAiClient::with_texts(&["{\"shouldFollow\": true}"]);
        let quota = Arc::new(FollowQuota::default());
        for _ in 0..MAX_FOLLOWS_PER_DAY {
            quota.increment();
        }
        let eval = evaluator(&graph, &ai, quota);

        let decision = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap();
        assert!(!decision.should_follow);
        assert!(!decision.already_following);
        assert_eq!(decision.reason, reasons::LIMIT_REACHED);
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_profile_skips_model() {
        let graph = MockSocialGraph::new();
        let ai = MockAiClient::with_texts(&["{\"shouldFollow\": true}"]);
        let eval = evaluator(&graph, &ai, Arc::new(FollowQuota::default()));

        let decision = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap();
        assert_eq!(decision.reason, reasons::USER_NOT_FOUND);
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_positive_verdict_parsed_from_prose() {
        let graph = MockSocialGraph::new()
            .with_user(target_user())
            .with_casts(TARGET, casts(15));
        let ai = MockAiClient::with_texts(&[
            "sure! {\"shouldFollow\": true, \"reason\": \"seems cool\", \"confidence\": \"high\"}",
        ]);
        let quota = Arc::new(FollowQuota::default());
        let eval = evaluator(&graph, &ai, quota.clone());

        let decision = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap();
        assert_eq!(
            decision,
            FollowDecision {
                should_follow: true,
                reason: "seems cool".to_string(),
                already_following: false,
                confidence: Some(Confidence::High),
            }
        );
        // Evaluation never consumes quota
        assert_eq!(quota.remaining(), MAX_FOLLOWS_PER_DAY);

        let requests = ai.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_completion_tokens, 200);
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(requests[0].messages[0].content, "evaluate");

        let user_prompt = &requests[0].messages[1].content;
        let summary: Value = serde_json::from_str(
            user_prompt.strip_prefix("Evaluate this user:\n").unwrap(),
        )
        .unwrap();
        assert_eq!(summary["username"], "alice");
        assert_eq!(summary["displayName"], "Alice");
        assert_eq!(summary["bio"], "building things");
        assert_eq!(summary["followerCount"], 120);
        assert_eq!(summary["recentCasts"].as_array().unwrap().len(), 10);
        assert_eq!(summary["recentCasts"][3]["likes"], 3);
    }

    #[tokio::test]
    async fn test_unreadable_verdicts_fall_back() {
        let graph = MockSocialGraph::new().with_user(target_user());
        let ai = MockAiClient::with_texts(&[
            "I'd rather not say",
            "{\"shouldFollow\": true, \"reason\": \"x\",}",
        ]);
        let eval = evaluator(&graph, &ai, Arc::new(FollowQuota::default()));

        let first = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap();
        assert_eq!(first, FollowDecision::decline(reasons::FOLLOW_NO_JSON));
        let second = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap();
        assert_eq!(second, FollowDecision::decline(reasons::FOLLOW_PARSE_FAILED));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_an_error() {
        let graph = MockSocialGraph::new().failing("neynar down");
        let ai = MockAiClient::default();
        let eval = evaluator(&graph, &ai, Arc::new(FollowQuota::default()));

        let err = eval.evaluate_follow(TARGET, OUR_FID).await.unwrap_err();
        assert_eq!(err.to_string(), "neynar down");
    }

    #[test]
    fn test_follow_decision_requires_literal_true() {
        let d = parse_follow_decision("{\"shouldFollow\": \"true\", \"confidence\": \"MEDIUM\"}");
        assert!(!d.should_follow);
        assert_eq!(d.reason, reasons::FOLLOW_DEFAULT);
        assert_eq!(d.confidence, Some(Confidence::Medium));

        let d = parse_follow_decision("{\"shouldFollow\": true, \"confidence\": \"very\"}");
        assert!(d.should_follow);
        assert_eq!(d.confidence, None);
    }

    #[test]
    fn test_follow_decision_serializes_camel_case() {
        let json = serde_json::to_value(FollowDecision {
            should_follow: true,
            reason: "r".to_string(),
            already_following: false,
            confidence: Some(Confidence::Low),
        })
        .unwrap();
        assert_eq!(json["shouldFollow"], true);
        assert_eq!(json["alreadyFollowing"], false);
        assert_eq!(json["confidence"], "low");
    }

    #[tokio::test]
    async fn test_unfollow_when_not_following_skips_model() {
        let graph = MockSocialGraph::new();
        let ai = MockAiClient::with_texts(&["{\"shouldUnfollow\": true}"]);
        let eval = evaluator(&graph, &ai, Arc::new(FollowQuota::default()));

        let decision = eval.evaluate_unfollow(TARGET, OUR_FID, "pls unfollow").await.unwrap();
        assert_eq!(
            decision,
            UnfollowDecision {
                should_unfollow: false,
                reason: reasons::NOT_FOLLOWING.to_string(),
            }
        );
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unfollow_verdicts() {
        let graph = MockSocialGraph::new().with_follow(OUR_FID, TARGET);
        let ai = MockAiClient::with_texts(&[
            "{\"shouldUnfollow\": false, \"reason\": \"no way, you're stuck with me\"}",
            "{\"shouldUnfollow\": true}",
            "nah",
            "{shouldUnfollow: true}",
        ]);
        let eval = evaluator(&graph, &ai, Arc::new(FollowQuota::default()));

        let d = eval.evaluate_unfollow(TARGET, OUR_FID, "unfollow me").await.unwrap();
        assert!(!d.should_unfollow);
        assert_eq!(d.reason, "no way, you're stuck with me");

        let d = eval.evaluate_unfollow(TARGET, OUR_FID, "unfollow me").await.unwrap();
        assert!(d.should_unfollow);
        assert_eq!(d.reason, reasons::UNFOLLOW_DEFAULT);

        let d = eval.evaluate_unfollow(TARGET, OUR_FID, "unfollow me").await.unwrap();
        assert_eq!(d.reason, reasons::UNFOLLOW_NO_JSON);

        let d = eval.evaluate_unfollow(TARGET, OUR_FID, "unfollow me").await.unwrap();
        assert_eq!(d.reason, reasons::UNFOLLOW_PARSE_FAILED);

        let requests = ai.requests();
        assert_eq!(
            requests[0].messages[1].content,
            "They said: \"unfollow me\"\n\nDo you want to unfollow them?"
        );
        assert!((requests[0].temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(requests[0].max_completion_tokens, 150);
    }
}
