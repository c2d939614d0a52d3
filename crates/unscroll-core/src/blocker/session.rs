//! Challenge session flow for one blocked target.
//!
//! A session is created when a block event fires and lives until the user
//! solves a challenge or walks away. It owns the current challenge instance
//! and drives the wait/present/retry cycle; durable state (attempt counts)
//! and shared state (waits, grants) live on the [`BlockerRuntime`].

use std::sync::Arc;

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::challenge::{self, Challenge, ChallengeKind, ValidationResult};
use crate::error::CoreError;
use crate::escalation;

use super::BlockerRuntime;

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// An escalation wait is running; no challenge is shown yet.
    WaitingOut,
    /// A challenge is shown and accepting a response.
    Presenting,
    /// The challenge was solved and access granted.
    Solved,
}

/// A user's answer to the active challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeResponse {
    Math { answer: i64 },
    Typing { text: String },
    Reflection { text: String },
    Memory { sequence: Vec<usize> },
    Word { answer: String },
    BreathingComplete,
}

/// Result of one [`ChallengeSession::submit_with`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Correct; access has been granted.
    Solved,
    /// Wrong; a fresh challenge is ready once `wait_seconds` (possibly 0)
    /// have passed.
    Retry { wait_seconds: u64 },
    /// Not judged: response kind did not match the challenge, or the input
    /// was incomplete. State is unchanged.
    Ignored,
}

/// Snapshot of a session for hosts to render. Serializable so a GUI layer
/// can consume it as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub target_id: String,
    pub phase: SessionPhase,
    pub challenge: Challenge,
    pub difficulty: u8,
    pub attempt_count: u32,
    pub wait_seconds_remaining: u64,
    pub error_message: Option<String>,
    pub solved: bool,
}

pub struct ChallengeSession {
    runtime: Arc<BlockerRuntime>,
    target_id: String,
    challenge: Challenge,
    attempt_count: u32,
    phase: SessionPhase,
    forced_kind: Option<ChallengeKind>,
    last_error: Option<String>,
}

impl ChallengeSession {
    /// Open a session for a blocked target using the wall clock and thread
    /// RNG.
    pub fn start(runtime: Arc<BlockerRuntime>, target_id: &str) -> Result<Self, CoreError> {
        Self::start_with(runtime, target_id, None, &mut rand::thread_rng())
    }

    /// [`ChallengeSession::start`] pinned to one challenge kind, for hosts
    /// that let the user pick.
    pub fn start_of_kind(
        runtime: Arc<BlockerRuntime>,
        target_id: &str,
        kind: ChallengeKind,
    ) -> Result<Self, CoreError> {
        Self::start_with(runtime, target_id, Some(kind), &mut rand::thread_rng())
    }

    pub fn start_with(
        runtime: Arc<BlockerRuntime>,
        target_id: &str,
        forced_kind: Option<ChallengeKind>,
        rng: &mut impl Rng,
    ) -> Result<Self, CoreError> {
        let attempt_count = {
            let db = runtime.db.lock().expect("poisoned lock");
            escalation::attempt_count(&db, target_id)?
        };
        let difficulty = escalation::difficulty_for_attempts(attempt_count);

        // A wait may be owed from earlier failures without one running,
        // e.g. the user dismissed the overlay and came back.
        let wait_seconds = {
            let mut waits = runtime.waits.lock().expect("poisoned lock");
            if !waits.is_wait_active(target_id) {
                waits.start_wait(target_id, attempt_count);
            }
            waits.remaining_seconds(target_id)
        };

        let challenge = generate(forced_kind, difficulty, rng);
        info!(
            "session opened for {target_id}: {} attempts, difficulty {difficulty}, wait {wait_seconds}s",
            attempt_count
        );

        Ok(Self {
            runtime,
            target_id: target_id.to_string(),
            challenge,
            attempt_count,
            phase: if wait_seconds > 0 {
                SessionPhase::WaitingOut
            } else {
                SessionPhase::Presenting
            },
            forced_kind,
            last_error: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            target_id: self.target_id.clone(),
            phase: self.phase,
            challenge: self.challenge.clone(),
            difficulty: self.challenge.difficulty(),
            attempt_count: self.attempt_count,
            wait_seconds_remaining: self.wait_remaining_seconds(),
            error_message: self.last_error.clone(),
            solved: self.phase == SessionPhase::Solved,
        }
    }

    /// Seconds left on the current escalation wait, 0 when none.
    pub fn wait_remaining_seconds(&self) -> u64 {
        self.runtime
            .waits
            .lock()
            .expect("poisoned lock")
            .remaining_seconds(&self.target_id)
    }

    /// Sleep out the current wait in one-second ticks, then present the
    /// challenge. Returns immediately if no wait is running.
    pub async fn run_wait(&mut self) {
        loop {
            if self.wait_remaining_seconds() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
        if self.phase == SessionPhase::WaitingOut {
            self.phase = SessionPhase::Presenting;
        }
    }

    /// Judge a response against the active challenge.
    pub fn submit(&mut self, response: &ChallengeResponse) -> Result<SubmitOutcome, CoreError> {
        self.submit_with(response, &mut rand::thread_rng())
    }

    pub fn submit_with(
        &mut self,
        response: &ChallengeResponse,
        rng: &mut impl Rng,
    ) -> Result<SubmitOutcome, CoreError> {
        if self.phase != SessionPhase::Presenting {
            warn!(
                "ignoring response while {:?} for {}",
                self.phase, self.target_id
            );
            return Ok(SubmitOutcome::Ignored);
        }

        self.last_error = None;
        let correct = match (&self.challenge, response) {
            (Challenge::Math(c), ChallengeResponse::Math { answer }) => {
                challenge::math::validate(c, *answer)
            }
            (Challenge::Typing(c), ChallengeResponse::Typing { text }) => {
                challenge::typing::validate(&c.text_to_type, text)
            }
            (Challenge::Reflection(c), ChallengeResponse::Reflection { text }) => {
                match challenge::reflection::validate(text, c.minimum_words) {
                    ValidationResult::Valid => true,
                    ValidationResult::TooShort { actual, required } => {
                        self.last_error =
                            Some(format!("Need at least {required} words, got {actual}."));
                        false
                    }
                    ValidationResult::TooRepetitive => {
                        self.last_error = Some("Response is too repetitive.".to_string());
                        false
                    }
                    ValidationResult::Suspicious => {
                        self.last_error =
                            Some("Please write a genuine response.".to_string());
                        false
                    }
                }
            }
            (Challenge::Memory(c), ChallengeResponse::Memory { sequence }) => {
                // Judged only once the full sequence is entered; the host
                // streams taps as they happen.
                if sequence.len() < c.sequence.len() {
                    return Ok(SubmitOutcome::Ignored);
                }
                challenge::memory::validate(c, sequence)
            }
            (Challenge::Word(c), ChallengeResponse::Word { answer }) => {
                challenge::word::validate(c, answer)
            }
            // Finishing the breathing cycles is the whole task.
            (Challenge::Breathing(_), ChallengeResponse::BreathingComplete) => true,
            (challenge, response) => {
                warn!(
                    "ignoring {:?} response to {:?} challenge for {}",
                    kind_of_response(response),
                    challenge.kind(),
                    self.target_id
                );
                return Ok(SubmitOutcome::Ignored);
            }
        };

        if correct {
            self.on_success()?;
            Ok(SubmitOutcome::Solved)
        } else {
            self.on_failure(rng)
        }
    }

    fn on_success(&mut self) -> Result<(), CoreError> {
        {
            let db = self.runtime.db.lock().expect("poisoned lock");
            escalation::record_success(&db, &self.target_id)?;
        }
        self.runtime
            .waits
            .lock()
            .expect("poisoned lock")
            .clear_wait(&self.target_id);
        self.runtime
            .grants
            .lock()
            .expect("poisoned lock")
            .grant(&self.target_id, self.runtime.config.access_duration());

        self.attempt_count = 0;
        self.last_error = None;
        self.phase = SessionPhase::Solved;
        info!("challenge solved for {}", self.target_id);
        Ok(())
    }

    fn on_failure(&mut self, rng: &mut impl Rng) -> Result<SubmitOutcome, CoreError> {
        {
            let db = self.runtime.db.lock().expect("poisoned lock");
            escalation::record_failure(&db, &self.target_id)?;
        }
        self.attempt_count += 1;
        if self.last_error.is_none() {
            self.last_error = Some("Incorrect, try again.".to_string());
        }

        let difficulty = escalation::difficulty_for_attempts(self.attempt_count);
        self.challenge = generate(self.forced_kind, difficulty, rng);

        let wait_seconds = {
            let mut waits = self.runtime.waits.lock().expect("poisoned lock");
            waits.start_wait(&self.target_id, self.attempt_count);
            waits.remaining_seconds(&self.target_id)
        };
        self.phase = if wait_seconds > 0 {
            SessionPhase::WaitingOut
        } else {
            SessionPhase::Presenting
        };

        info!(
            "challenge failed for {}: {} attempts, next difficulty {difficulty}, wait {wait_seconds}s",
            self.target_id, self.attempt_count
        );
        Ok(SubmitOutcome::Retry { wait_seconds })
    }
}

fn generate(forced_kind: Option<ChallengeKind>, difficulty: u8, rng: &mut impl Rng) -> Challenge {
    match forced_kind {
        Some(kind) => challenge::generate_of_kind(kind, difficulty, rng),
        None => challenge::generate(difficulty, rng),
    }
}

fn kind_of_response(response: &ChallengeResponse) -> ChallengeKind {
    match response {
        ChallengeResponse::Math { .. } => ChallengeKind::Math,
        ChallengeResponse::Typing { .. } => ChallengeKind::Typing,
        ChallengeResponse::Reflection { .. } => ChallengeKind::Reflection,
        ChallengeResponse::Memory { .. } => ChallengeKind::Memory,
        ChallengeResponse::Word { .. } => ChallengeKind::Word,
        ChallengeResponse::BreathingComplete => ChallengeKind::Breathing,
    }
}
