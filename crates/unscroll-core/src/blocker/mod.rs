//! Blocking engine: foreground monitoring, temporary access grants and the
//! challenge session flow.

pub mod access;
pub mod monitor;
pub mod session;

use std::sync::Mutex;

use crate::storage::{Config, Database};

pub use access::AccessGrantManager;
pub use monitor::{BlockEvent, ForegroundSource, RearmGuard};
pub use session::{ChallengeResponse, ChallengeSession, SessionPhase, SessionState, SubmitOutcome};

use crate::escalation::WaitTimerManager;

/// Shared state for one running blocker instance.
///
/// Wrapped in an `Arc` by callers; the monitor loop and challenge sessions
/// hold clones. Locks guard short critical sections only and are never held
/// across an await.
pub struct BlockerRuntime {
    pub db: Mutex<Database>,
    pub waits: Mutex<WaitTimerManager>,
    pub grants: Mutex<AccessGrantManager>,
    pub config: Config,
}

impl BlockerRuntime {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db: Mutex::new(db),
            waits: Mutex::new(WaitTimerManager::new()),
            grants: Mutex::new(AccessGrantManager::new()),
            config,
        }
    }
}
