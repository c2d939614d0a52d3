//! Temporary access grants issued after a solved challenge.
//!
//! Grants are process-lifetime state. Expiry is evaluated lazily on read;
//! nothing ticks in the background, so a grant simply stops answering
//! `true` once its deadline passes.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::info;

/// Active access grants keyed by target id.
#[derive(Debug, Default)]
pub struct AccessGrantManager {
    grants: HashMap<String, DateTime<Utc>>,
}

impl AccessGrantManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant access until `duration` from now. A second grant for the same
    /// target overwrites the first, it does not extend it.
    pub fn grant(&mut self, target_id: &str, duration: Duration) {
        self.grant_at(target_id, duration, Utc::now());
    }

    pub fn grant_at(&mut self, target_id: &str, duration: Duration, now: DateTime<Utc>) {
        let expires_at = now + duration;
        info!(
            "access granted to {} for {}s",
            target_id,
            duration.num_seconds()
        );
        self.grants.insert(target_id.to_string(), expires_at);
    }

    /// Whether the target currently holds an unexpired grant. Expired
    /// entries are evicted on the way out.
    pub fn has_active_access(&mut self, target_id: &str) -> bool {
        self.has_active_access_at(target_id, Utc::now())
    }

    pub fn has_active_access_at(&mut self, target_id: &str, now: DateTime<Utc>) -> bool {
        match self.grants.get(target_id) {
            Some(expires_at) if *expires_at > now => true,
            Some(_) => {
                self.grants.remove(target_id);
                false
            }
            None => false,
        }
    }

    /// Remaining whole seconds on the grant, 0 when absent or expired.
    pub fn remaining_seconds(&mut self, target_id: &str) -> u64 {
        self.remaining_seconds_at(target_id, Utc::now())
    }

    pub fn remaining_seconds_at(&mut self, target_id: &str, now: DateTime<Utc>) -> u64 {
        if !self.has_active_access_at(target_id, now) {
            return 0;
        }
        (self.grants[target_id] - now).num_seconds().max(0) as u64
    }

    /// End a grant early. Idempotent.
    pub fn revoke(&mut self, target_id: &str) {
        if self.grants.remove(target_id).is_some() {
            info!("access revoked for {target_id}");
        }
    }

    pub fn clear_all(&mut self) {
        self.grants.clear();
    }

    /// Target ids with unexpired grants. Does not evict; reads stay cheap
    /// and side-effect free for status displays.
    pub fn active_targets(&self) -> Vec<String> {
        self.active_targets_at(Utc::now())
    }

    pub fn active_targets_at(&self, now: DateTime<Utc>) -> Vec<String> {
        self.grants
            .iter()
            .filter(|(_, expires_at)| **expires_at > now)
            .map(|(id, _)| id.clone())
            .collect()
    }
}
