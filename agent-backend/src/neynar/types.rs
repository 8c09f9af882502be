//! Typed views over the Neynar v2 JSON payloads. Every field defaults when
//! absent or null; Neynar omits or nulls many of them depending on the account.

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub fid: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    pub display_name: Option<String>,
    pub profile: Option<UserProfile>,
    #[serde(deserialize_with = "null_as_default")]
    pub follower_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub following_count: u64,
    pub viewer_context: Option<ViewerContext>,
}

impl User {
    pub fn bio(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.bio.as_ref())
            .and_then(|b| b.text.as_deref())
            .unwrap_or("")
    }

    /// Whether the viewer passed with the lookup follows this user
    pub fn viewer_follows(&self) -> bool {
        self.viewer_context
            .as_ref()
            .map(|v| v.following)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub bio: Option<UserBio>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserBio {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerContext {
    #[serde(deserialize_with = "null_as_default")]
    pub following: bool,
}

/// A cast as returned by the user feed endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedCast {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    pub reactions: Option<CastReactions>,
    pub replies: Option<CastReplies>,
}

impl FeedCast {
    pub fn likes(&self) -> u64 {
        self.reactions.as_ref().map(|r| r.likes_count).unwrap_or(0)
    }

    pub fn recasts(&self) -> u64 {
        self.reactions.as_ref().map(|r| r.recasts_count).unwrap_or(0)
    }

    pub fn reply_count(&self) -> u64 {
        self.replies.as_ref().map(|r| r.count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CastReactions {
    #[serde(deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub recasts_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CastReplies {
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BulkUsersResponse {
    pub users: Option<Vec<User>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct UserResponse {
    pub user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CastsResponse {
    pub casts: Option<Vec<FeedCast>>,
}
