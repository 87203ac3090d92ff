// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host callbacks.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use polling_core::Reward;

pub type SuccessCallback = Arc<dyn Fn(serde_json::Value) + Send + Sync>;
pub type FailureCallback = Arc<dyn Fn(String) + Send + Sync>;
pub type RewardCallback = Arc<dyn Fn(Reward) + Send + Sync>;
pub type SurveyAvailableCallback = Arc<dyn Fn() + Send + Sync>;

/// The optional callbacks a host registers at initialization.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_success: Option<SuccessCallback>,
    pub on_failure: Option<FailureCallback>,
    pub on_reward: Option<RewardCallback>,
    pub on_survey_available: Option<SurveyAvailableCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the frame's completion data after a survey is finished.
    pub fn on_success(mut self, f: impl Fn(serde_json::Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Called with a human-readable message when a remote call fails.
    pub fn on_failure(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(f));
        self
    }

    pub fn on_reward(mut self, f: impl Fn(Reward) + Send + Sync + 'static) -> Self {
        self.on_reward = Some(Arc::new(f));
        self
    }

    /// Called when the available-surveys count goes from zero to non-zero.
    pub fn on_survey_available(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_survey_available = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("on_reward", &self.on_reward.is_some())
            .field("on_survey_available", &self.on_survey_available.is_some())
            .finish()
    }
}

/// Callbacks shared between components and replaceable at initialization.
///
/// The callback is cloned out of the lock before it runs, so a callback may
/// call back into the SDK.
#[derive(Debug, Default)]
pub struct SharedCallbacks {
    inner: RwLock<Callbacks>,
}

impl SharedCallbacks {
    pub fn new(callbacks: Callbacks) -> Self {
        Self {
            inner: RwLock::new(callbacks),
        }
    }

    pub fn replace(&self, callbacks: Callbacks) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = callbacks;
    }

    fn get(&self) -> Callbacks {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn success(&self, data: serde_json::Value) {
        if let Some(f) = self.get().on_success {
            f(data);
        }
    }

    pub fn failure(&self, message: String) {
        if let Some(f) = self.get().on_failure {
            f(message);
        }
    }

    pub fn reward(&self, reward: Reward) {
        if let Some(f) = self.get().on_reward {
            f(reward);
        }
    }

    pub fn survey_available(&self) {
        if let Some(f) = self.get().on_survey_available {
            f();
        }
    }
}
