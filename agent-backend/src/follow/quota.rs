//! Daily follow quota. In memory, lives as long as the process.
//!
//! Resets lazily: every read or write first compares today's date with the
//! stored reset date. A restart starts from zero.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;

/// Follows allowed per calendar day
pub const MAX_FOLLOWS_PER_DAY: u32 = 20;

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

struct QuotaState {
    count: u32,
    reset_date: NaiveDate,
}

pub struct FollowQuota {
    max_per_day: u32,
    state: Mutex<QuotaState>,
    today: Clock,
}

impl FollowQuota {
    /// Quota on the local calendar
    pub fn new(max_per_day: u32) -> Self {
        Self::with_clock(max_per_day, Arc::new(|| chrono::Local::now().date_naive()))
    }

    pub fn with_clock(max_per_day: u32, today: Clock) -> Self {
        let reset_date = today();
        Self {
            max_per_day,
            state: Mutex::new(QuotaState {
                count: 0,
                reset_date,
            }),
            today,
        }
    }

    /// Run `f` on the state after rolling it over to today if needed
    fn with_state<T>(&self, f: impl FnOnce(&mut QuotaState) -> T) -> T {
        let today = (self.today)();
        let mut state = self.state.lock();
        if state.reset_date != today {
            log::info!(
                "[FOLLOW] New day ({}), resetting follow count from {}",
                today,
                state.count
            );
            state.count = 0;
            state.reset_date = today;
        }
        f(&mut state)
    }

    pub fn can_follow_today(&self) -> bool {
        self.with_state(|s| s.count < self.max_per_day)
    }

    /// Record a follow that actually happened. Saturates at the daily cap.
    pub fn increment(&self) {
        self.with_state(|s| {
            if s.count < self.max_per_day {
                s.count += 1;
            }
        })
    }

    pub fn remaining(&self) -> u32 {
        self.with_state(|s| self.max_per_day - s.count)
    }

    pub fn max_per_day(&self) -> u32 {
        self.max_per_day
    }
}

impl Default for FollowQuota {
    fn default() -> Self {
        Self::new(MAX_FOLLOWS_PER_DAY)
    }
}
