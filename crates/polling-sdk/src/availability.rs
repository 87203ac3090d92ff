// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Survey Availability Cache.
//!
//! Holds the most recent available-surveys snapshot. Each successful refresh
//! replaces the snapshot wholesale; the "survey available" notification fires
//! only when the cached count goes from zero to non-zero.

use std::sync::{Arc, PoisonError, RwLock};

use polling_core::{AvailableSurveysSnapshot, PollingError, SurveyApi};
use tracing::{debug, info, warn};

use crate::callbacks::SharedCallbacks;

pub struct AvailabilityCache {
    api: Arc<dyn SurveyApi>,
    callbacks: Arc<SharedCallbacks>,
    snapshot: RwLock<AvailableSurveysSnapshot>,
}

impl AvailabilityCache {
    pub fn new(api: Arc<dyn SurveyApi>, callbacks: Arc<SharedCallbacks>) -> Self {
        Self {
            api,
            callbacks,
            snapshot: RwLock::new(AvailableSurveysSnapshot::default()),
        }
    }

    /// Fetches a fresh snapshot and installs it.
    ///
    /// On failure the failure callback is invoked and the cache is left as it was.
    pub async fn refresh(&self) -> Result<usize, PollingError> {
        match self.api.available_surveys().await {
            Ok(snapshot) => Ok(self.install(snapshot)),
            Err(e) => {
                warn!(error = %e, "available surveys refresh failed");
                self.callbacks.failure(e.failure_message());
                Err(e)
            }
        }
    }

    /// Replaces the cached snapshot and returns the new count.
    pub fn install(&self, snapshot: AvailableSurveysSnapshot) -> usize {
        let count = snapshot.count();
        let previous = {
            let mut cached = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *cached, snapshot).count()
        };
        debug!(previous, count, "available surveys updated");

        if previous == 0 && count > 0 {
            info!(count, "surveys became available");
            self.callbacks.survey_available();
        }
        count
    }

    pub fn snapshot(&self) -> AvailableSurveysSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .count()
    }
}
