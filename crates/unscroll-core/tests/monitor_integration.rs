//! Integration tests for the monitor loop driving challenge sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use unscroll_core::blocker::monitor::run_monitor;
use unscroll_core::blocker::session::SubmitOutcome;
use unscroll_core::challenge::Challenge;
use unscroll_core::error::CoreError;
use unscroll_core::{
    BlockedTarget, BlockerRuntime, ChallengeKind, ChallengeResponse, ChallengeSession, Config,
    Database, DayMask, ForegroundSource, ScheduleRule,
};

const FEED: &str = "com.example.feed";

struct FixedForeground(String);

impl ForegroundSource for FixedForeground {
    fn current_foreground(&mut self) -> Result<Option<String>, CoreError> {
        Ok(Some(self.0.clone()))
    }
}

fn seeded_runtime() -> Arc<BlockerRuntime> {
    let db = Database::open_memory().unwrap();
    db.upsert_target(&BlockedTarget::new(FEED, "Feed")).unwrap();
    db.insert_rule(&ScheduleRule {
        id: 0,
        target_id: FEED.into(),
        start_hour: 0,
        start_minute: 0,
        end_hour: 0,
        end_minute: 0,
        days: DayMask::ALL_DAYS,
        all_day: true,
        enabled: true,
    })
    .unwrap();
    Arc::new(BlockerRuntime::new(db, Config::default()))
}

#[tokio::test(start_paused = true)]
async fn solved_challenge_silences_the_monitor() {
    let runtime = seeded_runtime();
    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run_monitor(
        runtime.clone(),
        FixedForeground(FEED.to_string()),
        tx,
        cancel.clone(),
    ));

    let event = rx.recv().await.unwrap();
    assert_eq!(event.target_id, FEED);

    // Solve the challenge the event would have surfaced.
    let mut session =
        ChallengeSession::start_of_kind(runtime.clone(), FEED, ChallengeKind::Typing).unwrap();
    let text = match session.challenge() {
        Challenge::Typing(c) => c.text_to_type.clone(),
        other => panic!("expected typing, got {other:?}"),
    };
    assert_eq!(
        session.submit(&ChallengeResponse::Typing { text }).unwrap(),
        SubmitOutcome::Solved
    );

    // Well past the 2s debounce: the active grant, not the debounce, is
    // what keeps the monitor quiet.
    assert!(timeout(Duration::from_secs(10), rx.recv()).await.is_err());

    // Revoking the grant lets the next poll fire again.
    runtime.grants.lock().unwrap().revoke(FEED);
    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("expected an event after revoke")
        .unwrap();
    assert_eq!(event.target_id, FEED);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unscheduled_targets_never_emit_events() {
    let runtime = seeded_runtime();
    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run_monitor(
        runtime,
        FixedForeground("com.example.harmless".to_string()),
        tx,
        cancel.clone(),
    ));

    assert!(timeout(Duration::from_secs(10), rx.recv()).await.is_err());

    cancel.cancel();
    handle.await.unwrap();
}
