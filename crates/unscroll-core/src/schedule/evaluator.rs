//! Decides whether a target is inside an active block window.
//!
//! A rule is active iff it is enabled, today's weekday bit is set, and the
//! current time-of-day falls inside the window. Overnight windows
//! (`start > end`, e.g. 22:00-06:00) wrap across midnight; the weekday check
//! always uses the current calendar day, including for the post-midnight tail
//! of a wrapped window.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};

use crate::error::DatabaseError;
use crate::storage::Database;

use super::{DayMask, ScheduleRule};

/// Whether a single rule is active at the given local time.
pub fn rule_is_active_at(rule: &ScheduleRule, now: NaiveDateTime) -> bool {
    if !rule.enabled {
        return false;
    }

    let today = DayMask::from_weekday(now.weekday());
    if !rule.days.contains(today) {
        return false;
    }

    if rule.all_day {
        return true;
    }

    let current = now.hour() * 60 + now.minute();
    let start = rule.start_minutes();
    let end = rule.end_minutes();

    if start <= end {
        // Same-day window: [start, end)
        current >= start && current < end
    } else {
        // Overnight window, e.g. 22:00 to 06:00
        current >= start || current < end
    }
}

/// Whether the target should be blocked at the given local time.
///
/// False for unknown or disabled targets and for targets without enabled
/// rules; true if any enabled rule is active.
pub fn is_blocked_at(
    db: &Database,
    target_id: &str,
    now: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    if !db.is_target_enabled(target_id)? {
        return Ok(false);
    }

    let rules = db.enabled_rules_for(target_id)?;
    if rules.is_empty() {
        return Ok(false);
    }

    Ok(rules.iter().any(|rule| rule_is_active_at(rule, now)))
}

/// [`is_blocked_at`] against the wall clock.
pub fn is_blocked_now(db: &Database, target_id: &str) -> Result<bool, DatabaseError> {
    is_blocked_at(db, target_id, Local::now().naive_local())
}
