//! Integration tests for the block-challenge-access flow.
//!
//! These exercise the full path from a blocked target through escalation,
//! waits and access grants, including persistence across a simulated
//! restart.

use std::sync::Arc;

use unscroll_core::blocker::monitor::should_block;
use unscroll_core::blocker::session::SubmitOutcome;
use unscroll_core::challenge::Challenge;
use unscroll_core::{
    BlockedTarget, BlockerRuntime, ChallengeKind, ChallengeResponse, ChallengeSession, Config,
    Database, DayMask, ScheduleRule, SessionPhase,
};

const FEED: &str = "com.example.feed";

fn all_day_rule() -> ScheduleRule {
    ScheduleRule {
        id: 0,
        target_id: FEED.into(),
        start_hour: 0,
        start_minute: 0,
        end_hour: 0,
        end_minute: 0,
        days: DayMask::ALL_DAYS,
        all_day: true,
        enabled: true,
    }
}

fn seeded_runtime(db: Database) -> Arc<BlockerRuntime> {
    db.upsert_target(&BlockedTarget::new(FEED, "Feed")).unwrap();
    db.insert_rule(&all_day_rule()).unwrap();
    Arc::new(BlockerRuntime::new(db, Config::default()))
}

#[test]
fn solving_a_challenge_suppresses_blocking_until_revoked() {
    let runtime = seeded_runtime(Database::open_memory().unwrap());
    assert!(should_block(&runtime, FEED).unwrap());

    let mut session =
        ChallengeSession::start_of_kind(runtime.clone(), FEED, ChallengeKind::Typing).unwrap();
    let text = match session.challenge() {
        Challenge::Typing(c) => c.text_to_type.clone(),
        other => panic!("expected typing, got {other:?}"),
    };
    let outcome = session
        .submit(&ChallengeResponse::Typing { text })
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Solved);

    assert!(!should_block(&runtime, FEED).unwrap());

    runtime.grants.lock().unwrap().revoke(FEED);
    assert!(should_block(&runtime, FEED).unwrap());
}

#[test]
fn repeated_failures_escalate_to_waits() {
    let runtime = seeded_runtime(Database::open_memory().unwrap());
    let mut session =
        ChallengeSession::start_of_kind(runtime.clone(), FEED, ChallengeKind::Typing).unwrap();
    assert_eq!(session.challenge().difficulty(), 2);

    // Four wrong answers: difficulty tops out, still no wait.
    for expected_attempts in 1..=4 {
        let outcome = session
            .submit(&ChallengeResponse::Typing {
                text: "wrong".into(),
            })
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Retry { wait_seconds: 0 });
        assert_eq!(session.attempt_count(), expected_attempts);
    }
    assert_eq!(session.challenge().difficulty(), 4);

    // Fifth failure crosses the wait threshold.
    let outcome = session
        .submit(&ChallengeResponse::Typing {
            text: "wrong".into(),
        })
        .unwrap();
    assert!(matches!(
        outcome,
        SubmitOutcome::Retry {
            wait_seconds: 29..=30
        }
    ));
    assert_eq!(session.phase(), SessionPhase::WaitingOut);

    // While waiting, responses are not judged.
    let outcome = session
        .submit(&ChallengeResponse::Typing {
            text: "wrong".into(),
        })
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Ignored);
    assert_eq!(session.attempt_count(), 5);
}

#[test]
fn ten_failures_owe_the_longest_wait() {
    let runtime = seeded_runtime(Database::open_memory().unwrap());
    {
        let db = runtime.db.lock().unwrap();
        for _ in 0..11 {
            db.increment_attempt(FEED, chrono::Utc::now()).unwrap();
        }
    }

    let session =
        ChallengeSession::start_of_kind(runtime, FEED, ChallengeKind::Typing).unwrap();
    assert_eq!(session.phase(), SessionPhase::WaitingOut);
    assert!((119..=120).contains(&session.wait_remaining_seconds()));
    assert_eq!(session.challenge().difficulty(), 4);
}

#[test]
fn attempt_counts_survive_a_restart_but_waits_do_not() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unscroll.db");

    {
        let runtime = seeded_runtime(Database::open_at(&path).unwrap());
        let mut session =
            ChallengeSession::start_of_kind(runtime, FEED, ChallengeKind::Typing).unwrap();
        for _ in 0..6 {
            session
                .submit(&ChallengeResponse::Typing {
                    text: "wrong".into(),
                })
                .unwrap();
        }
        // Past the threshold: a wait is running in this process.
        assert_eq!(session.phase(), SessionPhase::WaitingOut);
    }

    // New process: fresh runtime over the same database file.
    let db = Database::open_at(&path).unwrap();
    let record = db.attempt_record(FEED).unwrap().unwrap();
    // Only the five judged submissions counted; the sixth was ignored
    // during the wait.
    assert_eq!(record.attempt_count, 5);

    let runtime = Arc::new(BlockerRuntime::new(db, Config::default()));
    let session =
        ChallengeSession::start_of_kind(runtime, FEED, ChallengeKind::Typing).unwrap();
    // The owed wait restarts from scratch at the stored attempt count.
    assert_eq!(session.phase(), SessionPhase::WaitingOut);
    assert!((29..=30).contains(&session.wait_remaining_seconds()));
    assert_eq!(session.challenge().difficulty(), 4);
}
