use super::{FeedCast, SocialGraph, User};
use crate::error::AgentError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory social graph for tests. Counts every lookup so tests can assert
/// which stages ran.
#[derive(Clone, Default)]
pub struct MockSocialGraph {
    users: Arc<Mutex<HashMap<u64, User>>>,
    casts: Arc<Mutex<HashMap<u64, Vec<FeedCast>>>>,
    follows: Arc<Mutex<HashSet<(u64, u64)>>>,
    fail_with: Arc<Mutex<Option<String>>>,
    lookups: Arc<AtomicUsize>,
    follow_checks: Arc<AtomicUsize>,
}

impl MockSocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().insert(user.fid, user);
        self
    }

    pub fn with_casts(self, fid: u64, casts: Vec<FeedCast>) -> Self {
        self.casts.lock().unwrap().insert(fid, casts);
        self
    }

    /// Record that `viewer` follows `target`
    pub fn with_follow(self, viewer: u64, target: u64) -> Self {
        self.follows.lock().unwrap().insert((viewer, target));
        self
    }

    /// Make every call fail with this message
    pub fn failing(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Profile and cast lookups made so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn follow_check_count(&self) -> usize {
        self.follow_checks.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), AgentError> {
        match self.fail_with.lock().unwrap().as_ref() {
            Some(msg) => Err(AgentError::SocialGraph(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SocialGraph for MockSocialGraph {
    async fn user_by_fid(&self, fid: u64) -> Result<Option<User>, AgentError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.users.lock().unwrap().get(&fid).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AgentError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let name = username.replacen('@', "", 1);
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == name)
            .cloned())
    }

    async fn user_casts(&self, fid: u64, limit: u32) -> Result<Vec<FeedCast>, AgentError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let casts = self.casts.lock().unwrap().get(&fid).cloned().unwrap_or_default();
        Ok(casts.into_iter().take(limit as usize).collect())
    }

    async fn is_following(&self, viewer_fid: u64, target_fid: u64) -> Result<bool, AgentError> {
        self.follow_checks.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.follows.lock().unwrap().contains(&(viewer_fid, target_fid)))
    }
}
