//! SQLite persistence for blocked targets, schedule rules and attempt records.
//!
//! The attempt record is the durable source of truth for challenge escalation;
//! wait timers and access grants are process-lifetime caches rebuilt from it.
//! Attempt-count mutation goes through a single atomic UPDATE so rapid repeated
//! failures never lose an increment.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CoreError, DatabaseError};
use crate::schedule::{BlockedTarget, DayMask, ScheduleRule};

use super::data_dir;

/// Per-target escalation state. One row per blocked target, removed with it.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub target_id: String,
    pub attempt_count: u32,
    pub last_attempt_time: DateTime<Utc>,
    pub last_success_time: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    /// Attempt counts go stale after 24 hours without an attempt and are
    /// lazily reset on the next read.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_attempt_time > chrono::Duration::hours(24)
    }
}

/// SQLite database for targets, rules and attempt records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/unscroll/unscroll.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let dir = data_dir().map_err(|e| CoreError::Custom(e.to_string()))?;
        Ok(Self::open_at(&dir.join("unscroll.db"))?)
    }

    /// Open the database at an explicit path (tests and tools).
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_conn(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        Self::from_conn(conn)
    }

    fn from_conn(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS blocked_targets (
                    id           TEXT PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    enabled      INTEGER NOT NULL DEFAULT 1,
                    created_at   TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS schedule_rules (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    target_id    TEXT NOT NULL REFERENCES blocked_targets(id) ON DELETE CASCADE,
                    start_hour   INTEGER NOT NULL,
                    start_minute INTEGER NOT NULL,
                    end_hour     INTEGER NOT NULL,
                    end_minute   INTEGER NOT NULL,
                    days         INTEGER NOT NULL,
                    all_day      INTEGER NOT NULL DEFAULT 0,
                    enabled      INTEGER NOT NULL DEFAULT 1
                );

                CREATE TABLE IF NOT EXISTS attempt_records (
                    target_id         TEXT PRIMARY KEY REFERENCES blocked_targets(id) ON DELETE CASCADE,
                    attempt_count     INTEGER NOT NULL DEFAULT 0,
                    last_attempt_time TEXT NOT NULL,
                    last_success_time TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_schedule_rules_target ON schedule_rules(target_id);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // ── Blocked targets ──────────────────────────────────────────────

    /// Insert or replace a blocked target.
    pub fn upsert_target(&self, target: &BlockedTarget) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO blocked_targets (id, display_name, enabled, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                target.id,
                target.display_name,
                target.enabled,
                target.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn target(&self, id: &str) -> Result<Option<BlockedTarget>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, enabled, created_at FROM blocked_targets WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()?;
        row.map(|(id, display_name, enabled, created_at)| {
            Ok(BlockedTarget {
                id,
                display_name,
                enabled,
                created_at: parse_ts(&created_at)?,
            })
        })
        .transpose()
    }

    pub fn list_targets(&self) -> Result<Vec<BlockedTarget>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, enabled, created_at
             FROM blocked_targets ORDER BY display_name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut targets = Vec::new();
        for row in rows {
            let (id, display_name, enabled, created_at) = row?;
            targets.push(BlockedTarget {
                id,
                display_name,
                enabled,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(targets)
    }

    /// Remove a target. Schedule rules and the attempt record cascade.
    pub fn remove_target(&self, id: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM blocked_targets WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn set_target_enabled(&self, id: &str, enabled: bool) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE blocked_targets SET enabled = ?2 WHERE id = ?1",
            params![id, enabled],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "target",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    /// Whether the id names an enabled blocked target.
    pub fn is_target_enabled(&self, id: &str) -> Result<bool, DatabaseError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM blocked_targets WHERE id = ?1 AND enabled = 1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn enabled_target_count(&self) -> Result<u32, DatabaseError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM blocked_targets WHERE enabled = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Schedule rules ───────────────────────────────────────────────

    /// Insert a rule and return its row id.
    pub fn insert_rule(&self, rule: &ScheduleRule) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO schedule_rules
             (target_id, start_hour, start_minute, end_hour, end_minute, days, all_day, enabled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                rule.target_id,
                rule.start_hour,
                rule.start_minute,
                rule.end_hour,
                rule.end_minute,
                rule.days.0,
                rule.all_day,
                rule.enabled,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn rule(&self, id: i64) -> Result<Option<ScheduleRule>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, target_id, start_hour, start_minute, end_hour, end_minute,
                    days, all_day, enabled
             FROM schedule_rules WHERE id = ?1",
        )?;
        Ok(stmt.query_row(params![id], row_to_rule).optional()?)
    }

    /// All rules for a target, enabled or not (list views).
    pub fn rules_for(&self, target_id: &str) -> Result<Vec<ScheduleRule>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, target_id, start_hour, start_minute, end_hour, end_minute,
                    days, all_day, enabled
             FROM schedule_rules WHERE target_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![target_id], row_to_rule)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Enabled rules only (block decisions).
    pub fn enabled_rules_for(&self, target_id: &str) -> Result<Vec<ScheduleRule>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, target_id, start_hour, start_minute, end_hour, end_minute,
                    days, all_day, enabled
             FROM schedule_rules WHERE target_id = ?1 AND enabled = 1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![target_id], row_to_rule)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn remove_rule(&self, id: i64) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM schedule_rules WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn set_rule_enabled(&self, id: i64, enabled: bool) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE schedule_rules SET enabled = ?2 WHERE id = ?1",
            params![id, enabled],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "schedule rule",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    // ── Attempt records ──────────────────────────────────────────────

    pub fn attempt_record(&self, target_id: &str) -> Result<Option<AttemptRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT target_id, attempt_count, last_attempt_time, last_success_time
             FROM attempt_records WHERE target_id = ?1",
        )?;
        let row = stmt
            .query_row(params![target_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .optional()?;
        row.map(|(target_id, attempt_count, last_attempt, last_success)| {
            Ok(AttemptRecord {
                target_id,
                attempt_count,
                last_attempt_time: parse_ts(&last_attempt)?,
                last_success_time: last_success.as_deref().map(parse_ts).transpose()?,
            })
        })
        .transpose()
    }

    /// Create a zero-count record if none exists yet.
    pub fn ensure_attempt_record(
        &self,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO attempt_records (target_id, attempt_count, last_attempt_time)
             VALUES (?1, 0, ?2)",
            params![target_id, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Atomically bump the attempt count, creating the record at 1 if absent.
    ///
    /// Single statement so concurrent failures cannot lose an update.
    pub fn increment_attempt(
        &self,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO attempt_records (target_id, attempt_count, last_attempt_time)
             VALUES (?1, 1, ?2)
             ON CONFLICT(target_id) DO UPDATE SET
                 attempt_count = attempt_count + 1,
                 last_attempt_time = excluded.last_attempt_time",
            params![target_id, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Zero the attempt count and stamp the success time.
    pub fn reset_attempts(&self, target_id: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO attempt_records (target_id, attempt_count, last_attempt_time, last_success_time)
             VALUES (?1, 0, ?2, ?2)
             ON CONFLICT(target_id) DO UPDATE SET
                 attempt_count = 0,
                 last_success_time = excluded.last_success_time",
            params![target_id, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete attempt records with no attempt since `threshold`. Housekeeping;
    /// the lazy per-read reset is what escalation actually relies on.
    pub fn purge_stale_attempts(&self, threshold: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM attempt_records WHERE last_attempt_time < ?1",
            params![threshold.to_rfc3339()],
        )?;
        Ok(removed)
    }
}

fn row_to_rule(row: &rusqlite::Row<'_>) -> Result<ScheduleRule, rusqlite::Error> {
    Ok(ScheduleRule {
        id: row.get(0)?,
        target_id: row.get(1)?,
        start_hour: row.get(2)?,
        start_minute: row.get(3)?,
        end_hour: row.get(4)?,
        end_minute: row.get(5)?,
        days: DayMask(row.get(6)?),
        all_day: row.get(7)?,
        enabled: row.get(8)?,
    })
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{s}': {e}")))
}
