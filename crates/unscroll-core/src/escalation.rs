//! Escalation policy: difficulty curve, persisted attempt tracking and
//! enforced wait timers.
//!
//! Attempt counts are the durable source of truth and live in SQLite; wait
//! timers are process-lifetime state owned by the blocking service. A restart
//! therefore forgets an in-flight cool-down but keeps the escalated
//! difficulty.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::DatabaseError;
use crate::storage::Database;

/// Difficulty for a given attempt count. Starts at level 2 so even a first
/// attempt takes real effort; level 1 is never emitted here.
///
/// - 0 attempts: level 2
/// - 1-2 attempts: level 3
/// - 3+ attempts: level 4
pub fn difficulty_for_attempts(attempt_count: u32) -> u8 {
    match attempt_count {
        0 => 2,
        1..=2 => 3,
        _ => 4,
    }
}

/// Enforced cool-down before the next challenge is offered.
///
/// - 0-4 attempts: none
/// - 5-7 attempts: 30 s
/// - 8-9 attempts: 60 s
/// - 10+ attempts: 120 s
pub fn required_wait(attempt_count: u32) -> Duration {
    match attempt_count {
        0..=4 => Duration::zero(),
        5..=7 => Duration::seconds(30),
        8..=9 => Duration::seconds(60),
        _ => Duration::seconds(120),
    }
}

/// Current attempt count for a target, handling lazy resets.
///
/// A missing record self-heals to a fresh zero-count row; a record stale by
/// more than 24 hours is reset (and the reset persisted) before being read.
pub fn attempt_count(db: &Database, target_id: &str) -> Result<u32, DatabaseError> {
    attempt_count_at(db, target_id, Utc::now())
}

pub fn attempt_count_at(
    db: &Database,
    target_id: &str,
    now: DateTime<Utc>,
) -> Result<u32, DatabaseError> {
    let record = match db.attempt_record(target_id)? {
        Some(record) => record,
        None => {
            db.ensure_attempt_record(target_id, now)?;
            return Ok(0);
        }
    };

    if record.is_stale_at(now) {
        db.reset_attempts(target_id, now)?;
        return Ok(0);
    }

    Ok(record.attempt_count)
}

/// Record one failed challenge. Delegates to the storage layer's atomic
/// increment; never read-modify-write.
pub fn record_failure(db: &Database, target_id: &str) -> Result<(), DatabaseError> {
    db.increment_attempt(target_id, Utc::now())
}

/// Record a challenge success: zero the count and stamp the success time.
pub fn record_success(db: &Database, target_id: &str) -> Result<(), DatabaseError> {
    db.reset_attempts(target_id, Utc::now())
}

/// In-memory wait timers, one per target.
///
/// Reads lazily evict expired entries; that side effect is intentional and
/// keeps the map from accumulating dead state.
#[derive(Debug, Default)]
pub struct WaitTimerManager {
    waits: HashMap<String, WaitState>,
}

#[derive(Debug, Clone, Copy)]
struct WaitState {
    started_at: DateTime<Utc>,
    duration: Duration,
}

impl WaitTimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the wait owed at this attempt count. No-op when none is owed.
    pub fn start_wait(&mut self, target_id: &str, attempt_count: u32) {
        self.start_wait_at(target_id, attempt_count, Utc::now());
    }

    pub fn start_wait_at(&mut self, target_id: &str, attempt_count: u32, now: DateTime<Utc>) {
        let duration = required_wait(attempt_count);
        if duration > Duration::zero() {
            self.waits.insert(
                target_id.to_string(),
                WaitState {
                    started_at: now,
                    duration,
                },
            );
        }
    }

    /// Remaining whole seconds, truncated down. Returns 0 and evicts the
    /// entry once the wait has elapsed.
    pub fn remaining_seconds(&mut self, target_id: &str) -> u64 {
        self.remaining_seconds_at(target_id, Utc::now())
    }

    pub fn remaining_seconds_at(&mut self, target_id: &str, now: DateTime<Utc>) -> u64 {
        let Some(state) = self.waits.get(target_id) else {
            return 0;
        };

        let remaining = state.duration - (now - state.started_at);
        if remaining <= Duration::zero() {
            self.waits.remove(target_id);
            return 0;
        }

        remaining.num_seconds().max(0) as u64
    }

    pub fn is_wait_active(&mut self, target_id: &str) -> bool {
        self.remaining_seconds(target_id) > 0
    }

    pub fn is_wait_active_at(&mut self, target_id: &str, now: DateTime<Utc>) -> bool {
        self.remaining_seconds_at(target_id, now) > 0
    }

    pub fn clear_wait(&mut self, target_id: &str) {
        self.waits.remove(target_id);
    }

    pub fn clear_all(&mut self) {
        self.waits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::BlockedTarget;

    #[test]
    fn difficulty_curve_matches_policy() {
        assert_eq!(difficulty_for_attempts(0), 2);
        assert_eq!(difficulty_for_attempts(1), 3);
        assert_eq!(difficulty_for_attempts(2), 3);
        assert_eq!(difficulty_for_attempts(3), 4);
        assert_eq!(difficulty_for_attempts(50), 4);
    }

    #[test]
    fn difficulty_is_monotonic_and_in_range() {
        let mut last = 0;
        for count in 0..30 {
            let level = difficulty_for_attempts(count);
            assert!((2..=4).contains(&level));
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn wait_curve_matches_policy() {
        assert_eq!(required_wait(4), Duration::zero());
        assert_eq!(required_wait(5), Duration::seconds(30));
        assert_eq!(required_wait(7), Duration::seconds(30));
        assert_eq!(required_wait(8), Duration::seconds(60));
        assert_eq!(required_wait(9), Duration::seconds(60));
        assert_eq!(required_wait(10), Duration::seconds(120));
        assert_eq!(required_wait(100), Duration::seconds(120));
    }

    #[test]
    fn wait_curve_is_monotonic() {
        let mut last = Duration::zero();
        for count in 0..30 {
            let wait = required_wait(count);
            assert!(wait >= last);
            last = wait;
        }
    }

    #[test]
    fn missing_record_self_heals_to_zero() {
        let db = Database::open_memory().unwrap();
        db.upsert_target(&BlockedTarget::new("com.example.feed", "Feed"))
            .unwrap();

        assert_eq!(attempt_count(&db, "com.example.feed").unwrap(), 0);
        // The read created a fresh record.
        assert!(db.attempt_record("com.example.feed").unwrap().is_some());
    }

    #[test]
    fn stale_record_resets_lazily_and_persists() {
        let db = Database::open_memory().unwrap();
        db.upsert_target(&BlockedTarget::new("com.example.feed", "Feed"))
            .unwrap();

        let old = Utc::now() - Duration::hours(30);
        for _ in 0..6 {
            db.increment_attempt("com.example.feed", old).unwrap();
        }

        assert_eq!(attempt_count(&db, "com.example.feed").unwrap(), 0);
        let record = db.attempt_record("com.example.feed").unwrap().unwrap();
        assert_eq!(record.attempt_count, 0);
    }

    #[test]
    fn fresh_record_keeps_its_count() {
        let db = Database::open_memory().unwrap();
        db.upsert_target(&BlockedTarget::new("com.example.feed", "Feed"))
            .unwrap();

        record_failure(&db, "com.example.feed").unwrap();
        record_failure(&db, "com.example.feed").unwrap();
        assert_eq!(attempt_count(&db, "com.example.feed").unwrap(), 2);

        record_success(&db, "com.example.feed").unwrap();
        assert_eq!(attempt_count(&db, "com.example.feed").unwrap(), 0);
    }

    #[test]
    fn no_wait_below_five_attempts() {
        let mut waits = WaitTimerManager::new();
        waits.start_wait("com.example.feed", 4);
        assert!(!waits.is_wait_active("com.example.feed"));
        assert_eq!(waits.remaining_seconds("com.example.feed"), 0);
    }

    #[test]
    fn wait_counts_down_and_evicts_on_expiry() {
        let mut waits = WaitTimerManager::new();
        let start = Utc::now();
        waits.start_wait_at("com.example.feed", 6, start);

        assert_eq!(waits.remaining_seconds_at("com.example.feed", start), 30);
        assert_eq!(
            waits.remaining_seconds_at("com.example.feed", start + Duration::seconds(12)),
            18
        );
        // Sub-second remainder truncates down.
        assert_eq!(
            waits.remaining_seconds_at(
                "com.example.feed",
                start + Duration::seconds(29) + Duration::milliseconds(500)
            ),
            0
        );

        // Past the end: evicted, and repeated reads stay at 0.
        assert_eq!(
            waits.remaining_seconds_at("com.example.feed", start + Duration::seconds(31)),
            0
        );
        assert!(!waits.is_wait_active_at("com.example.feed", start + Duration::seconds(1)));
    }

    #[test]
    fn clear_wait_and_clear_all() {
        let mut waits = WaitTimerManager::new();
        let start = Utc::now();
        waits.start_wait_at("a", 10, start);
        waits.start_wait_at("b", 10, start);

        waits.clear_wait("a");
        assert!(!waits.is_wait_active_at("a", start));
        assert!(waits.is_wait_active_at("b", start));

        waits.clear_all();
        assert!(!waits.is_wait_active_at("b", start));
    }
}
