// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Captures host callback invocations.

use std::sync::{Arc, Mutex, PoisonError};

use polling_core::Reward;

#[derive(Debug, Default)]
struct Recorded {
    successes: Vec<serde_json::Value>,
    failures: Vec<String>,
    rewards: Vec<Reward>,
    available: usize,
}

/// Hands out closures for each host callback and records what they receive.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    inner: Arc<Mutex<Recorded>>,
}

impl CallbackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_handler(&self) -> impl Fn(serde_json::Value) + Send + Sync + 'static {
        let inner = self.inner.clone();
        move |data| lock(&inner).successes.push(data)
    }

    pub fn failure_handler(&self) -> impl Fn(String) + Send + Sync + 'static {
        let inner = self.inner.clone();
        move |message| lock(&inner).failures.push(message)
    }

    pub fn reward_handler(&self) -> impl Fn(Reward) + Send + Sync + 'static {
        let inner = self.inner.clone();
        move |reward| lock(&inner).rewards.push(reward)
    }

    pub fn available_handler(&self) -> impl Fn() + Send + Sync + 'static {
        let inner = self.inner.clone();
        move || lock(&inner).available += 1
    }

    pub fn successes(&self) -> Vec<serde_json::Value> {
        lock(&self.inner).successes.clone()
    }

    pub fn failures(&self) -> Vec<String> {
        lock(&self.inner).failures.clone()
    }

    pub fn rewards(&self) -> Vec<Reward> {
        lock(&self.inner).rewards.clone()
    }

    /// Number of survey-available notifications.
    pub fn available_count(&self) -> usize {
        lock(&self.inner).available
    }

    /// No callback of any kind has fired.
    pub fn is_silent(&self) -> bool {
        let recorded = lock(&self.inner);
        recorded.successes.is_empty()
            && recorded.failures.is_empty()
            && recorded.rewards.is_empty()
            && recorded.available == 0
    }
}

fn lock(inner: &Mutex<Recorded>) -> std::sync::MutexGuard<'_, Recorded> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
