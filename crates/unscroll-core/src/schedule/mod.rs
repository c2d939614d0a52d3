//! Blocked targets and their recurring block windows.
//!
//! A target (an opaque app identifier, e.g. an Android package name) owns zero
//! or more schedule rules. The target is inside a block window iff it is
//! enabled and at least one of its enabled rules is active right now.

pub mod evaluator;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// An app the user has chosen to block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedTarget {
    /// Opaque app identifier (package name), primary key.
    pub id: String,
    /// Human-readable name for list views.
    pub display_name: String,
    /// Disabled targets are never blocked, schedules notwithstanding.
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl BlockedTarget {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            enabled: true,
            created_at: Utc::now(),
        }
    }
}

/// Day-of-week bitmask. Independent bits; a rule may span several days with
/// one set of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayMask(pub u8);

impl DayMask {
    pub const MONDAY: DayMask = DayMask(1);
    pub const TUESDAY: DayMask = DayMask(2);
    pub const WEDNESDAY: DayMask = DayMask(4);
    pub const THURSDAY: DayMask = DayMask(8);
    pub const FRIDAY: DayMask = DayMask(16);
    pub const SATURDAY: DayMask = DayMask(32);
    pub const SUNDAY: DayMask = DayMask(64);
    pub const ALL_DAYS: DayMask = DayMask(127);
    pub const WEEKDAYS: DayMask = DayMask(31);
    pub const WEEKENDS: DayMask = DayMask(96);

    pub fn from_weekday(day: Weekday) -> DayMask {
        match day {
            Weekday::Mon => DayMask::MONDAY,
            Weekday::Tue => DayMask::TUESDAY,
            Weekday::Wed => DayMask::WEDNESDAY,
            Weekday::Thu => DayMask::THURSDAY,
            Weekday::Fri => DayMask::FRIDAY,
            Weekday::Sat => DayMask::SATURDAY,
            Weekday::Sun => DayMask::SUNDAY,
        }
    }

    pub fn contains(self, day: DayMask) -> bool {
        self.0 & day.0 != 0
    }

    pub fn union(self, other: DayMask) -> DayMask {
        DayMask(self.0 | other.0)
    }

    /// The individual day bits set in this mask, Monday first.
    pub fn enabled_days(self) -> Vec<DayMask> {
        [
            DayMask::MONDAY,
            DayMask::TUESDAY,
            DayMask::WEDNESDAY,
            DayMask::THURSDAY,
            DayMask::FRIDAY,
            DayMask::SATURDAY,
            DayMask::SUNDAY,
        ]
        .into_iter()
        .filter(|d| self.contains(*d))
        .collect()
    }
}

/// A recurring block window belonging to exactly one target.
///
/// `start`/`end` are times of day; when `start > end` the window wraps across
/// midnight (e.g. 22:00-06:00). `all_day` rules ignore the times entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRule {
    /// Row id; 0 until the rule has been inserted.
    pub id: i64,
    pub target_id: String,
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    pub days: DayMask,
    pub all_day: bool,
    pub enabled: bool,
}

impl ScheduleRule {
    pub fn start_minutes(&self) -> u32 {
        self.start_hour as u32 * 60 + self.start_minute as u32
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_hour as u32 * 60 + self.end_minute as u32
    }
}
