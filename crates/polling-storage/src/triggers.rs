// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable trigger store: the persisted list of triggered surveys.
//!
//! The whole list lives under one key and is always read and written as a
//! unit. There are no partial updates; callers load, mutate and save back.

use std::sync::Arc;

use polling_core::{KeyValueStore, PollingError, TriggeredSurveyRecord};
use tracing::warn;

/// Storage key holding the serialized trigger list.
pub const TRIGGERED_SURVEYS_KEY: &str = "polling:triggered_surveys";

/// Typed repository over the host key-value store.
#[derive(Clone)]
pub struct TriggerStore {
    kv: Arc<dyn KeyValueStore>,
}

impl TriggerStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Loads the stored list in insertion order.
    ///
    /// Never fails: an unreadable backend or a corrupt value is logged and
    /// reported as an empty list.
    pub async fn load(&self) -> Vec<TriggeredSurveyRecord> {
        let raw = match self.kv.get(TRIGGERED_SURVEYS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "trigger store unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "trigger store corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replaces the stored list with `records`.
    pub async fn save(&self, records: &[TriggeredSurveyRecord]) -> Result<(), PollingError> {
        let raw = serde_json::to_string(records).map_err(|e| PollingError::Decode {
            context: "triggered surveys".into(),
            source: Box::new(e),
        })?;
        self.kv.set(TRIGGERED_SURVEYS_KEY, &raw).await
    }
}
