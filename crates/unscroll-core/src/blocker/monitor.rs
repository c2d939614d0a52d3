//! Foreground polling loop.
//!
//! Polls a [`ForegroundSource`] on a fixed interval and emits a
//! [`BlockEvent`] whenever a blocked target comes to the foreground. A
//! per-target debounce window keeps the same foreground app from
//! re-triggering the challenge flow on every tick.
//!
//! Read errors from the source are logged and the tick skipped; the loop
//! only exits on cancellation or when the event receiver goes away.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::schedule::evaluator;

use super::BlockerRuntime;

/// Reports which app currently holds the foreground.
///
/// `None` means the reading is unavailable or stale this tick (screen off,
/// permission hiccup); the loop just skips it.
pub trait ForegroundSource: Send {
    fn current_foreground(&mut self) -> Result<Option<String>, CoreError>;
}

/// A blocked target reached the foreground during an active window.
#[derive(Debug, Clone)]
pub struct BlockEvent {
    pub target_id: String,
    pub display_name: Option<String>,
    pub detected_at: DateTime<Utc>,
}

/// Run the monitor loop until cancelled.
pub async fn run_monitor<S: ForegroundSource>(
    runtime: Arc<BlockerRuntime>,
    mut source: S,
    events: mpsc::Sender<BlockEvent>,
    cancel: CancellationToken,
) {
    let poll = Duration::from_millis(runtime.config.monitor.poll_interval_ms);
    let debounce = Duration::from_millis(runtime.config.monitor.debounce_ms);

    let mut interval = tokio::time::interval(poll);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_blocked: Option<(String, Instant)> = None;

    info!(
        "monitor started (poll {}ms, debounce {}ms)",
        poll.as_millis(),
        debounce.as_millis()
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("monitor stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        let foreground = match source.current_foreground() {
            Ok(Some(id)) => id,
            Ok(None) => continue,
            Err(e) => {
                warn!("foreground read failed: {e}");
                continue;
            }
        };

        match should_block(&runtime, &foreground) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("block check failed for {foreground}: {e}");
                continue;
            }
        }

        if let Some((ref id, at)) = last_blocked {
            if *id == foreground && at.elapsed() < debounce {
                debug!("debounced repeat block of {foreground}");
                continue;
            }
        }
        last_blocked = Some((foreground.clone(), Instant::now()));

        let display_name = {
            let db = runtime.db.lock().expect("poisoned lock");
            db.target(&foreground)
                .ok()
                .flatten()
                .map(|t| t.display_name)
        };

        info!("blocked target in foreground: {foreground}");
        let event = BlockEvent {
            target_id: foreground,
            display_name,
            detected_at: Utc::now(),
        };
        if events.send(event).await.is_err() {
            info!("event receiver dropped, monitor stopped");
            return;
        }
    }
}

/// Whether a foreground app should trigger the challenge flow right now.
///
/// Never blocks ourselves or allow-listed packages, honors active access
/// grants, then defers to the schedule evaluator.
pub fn should_block(runtime: &BlockerRuntime, target_id: &str) -> Result<bool, CoreError> {
    let monitor = &runtime.config.monitor;
    if target_id == monitor.self_id || monitor.allowlist.iter().any(|p| p == target_id) {
        return Ok(false);
    }

    if runtime
        .grants
        .lock()
        .expect("poisoned lock")
        .has_active_access(target_id)
    {
        return Ok(false);
    }

    let db = runtime.db.lock().expect("poisoned lock");
    Ok(evaluator::is_blocked_now(&db, target_id)?)
}

/// Drop guard that relaunches the monitor if it exits without being
/// explicitly cancelled.
///
/// The supervising task creates the guard before awaiting the monitor and
/// calls [`RearmGuard::disarm`] on an orderly shutdown; any other exit path
/// fires the relaunch hook on drop.
pub struct RearmGuard {
    relaunch: Option<Box<dyn FnOnce() + Send>>,
}

impl RearmGuard {
    pub fn new(relaunch: impl FnOnce() + Send + 'static) -> Self {
        Self {
            relaunch: Some(Box::new(relaunch)),
        }
    }

    /// Shutdown is intentional; do not relaunch.
    pub fn disarm(mut self) {
        self.relaunch = None;
    }
}

impl Drop for RearmGuard {
    fn drop(&mut self) {
        if let Some(relaunch) = self.relaunch.take() {
            warn!("monitor exited unexpectedly, re-arming");
            relaunch();
        }
    }
}
