//! # Unscroll Core Library
//!
//! Core logic for Unscroll, a digital-wellbeing blocker that interposes a
//! solvable cognitive challenge when a distracting app is opened during a
//! scheduled block window. All operations are available through this library;
//! the CLI binary is a thin layer over it, and a GUI host would sit on the
//! same surface.
//!
//! ## Architecture
//!
//! - **Challenges**: Six generator/validator pairs behind one tagged enum,
//!   selected by weighted roll at an escalating difficulty
//! - **Schedule**: Blocked targets, per-target schedule rules with a weekday
//!   bitmask, and the evaluator that decides "blocked right now"
//! - **Escalation**: Persisted attempt counts driving the difficulty curve
//!   and enforced wait timers
//! - **Blocker**: The foreground poll loop, temporary access grants and the
//!   challenge session state machine
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`ChallengeSession`]: Wait/present/retry state machine for one target
//! - [`BlockerRuntime`]: Shared state for a running blocker instance
//! - [`Database`]: Targets, rules and attempt persistence
//! - [`Config`]: Application configuration management

pub mod blocker;
pub mod challenge;
pub mod error;
pub mod escalation;
pub mod schedule;
pub mod storage;

pub use blocker::{
    AccessGrantManager, BlockEvent, BlockerRuntime, ChallengeResponse, ChallengeSession,
    ForegroundSource, SessionPhase,
};
pub use challenge::{Challenge, ChallengeKind};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use escalation::WaitTimerManager;
pub use schedule::{BlockedTarget, DayMask, ScheduleRule};
pub use storage::{Config, Database};
