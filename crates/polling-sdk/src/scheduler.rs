// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger Scheduler.
//!
//! Decides which triggered survey, if any, is due for display. Every mutation
//! is a full read-modify-write of the Durable Trigger Store; mutations are
//! serialized on a local lock so concurrent tasks in this process cannot
//! lose each other's writes.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use polling_core::{
    DisplayTarget, PollingError, RawTrigger, SurveyApi, SurveyId, TriggeredSurveyRecord,
};
use polling_storage::TriggerStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::callbacks::SharedCallbacks;
use crate::display::DisplayController;

pub struct TriggerScheduler {
    store: TriggerStore,
    api: Arc<dyn SurveyApi>,
    display: Arc<DisplayController>,
    callbacks: Arc<SharedCallbacks>,
    postpone_minutes: u32,
    write_lock: Mutex<()>,
}

impl TriggerScheduler {
    pub fn new(
        store: TriggerStore,
        api: Arc<dyn SurveyApi>,
        display: Arc<DisplayController>,
        callbacks: Arc<SharedCallbacks>,
        postpone_minutes: u32,
    ) -> Self {
        Self {
            store,
            api,
            display,
            callbacks,
            postpone_minutes,
            write_lock: Mutex::new(()),
        }
    }

    /// The stored trigger list, in stored order.
    pub async fn records(&self) -> Vec<TriggeredSurveyRecord> {
        self.store.load().await
    }

    /// Merges newly delivered triggers into the store, then evaluates.
    ///
    /// Triggers whose timestamp cannot be parsed are dropped.
    pub async fn ingest(&self, triggers: &[RawTrigger]) -> Result<Option<SurveyId>, PollingError> {
        let incoming: Vec<_> = triggers
            .iter()
            .filter_map(|raw| {
                let record = raw.to_record();
                if record.is_none() {
                    warn!(
                        survey_id = %raw.survey.survey_uuid,
                        timestamp = %raw.delayed_timestamp,
                        "dropping trigger with unparsable timestamp"
                    );
                }
                record
            })
            .collect();

        {
            let _guard = self.write_lock.lock().await;
            let merged = merge_triggers(self.store.load().await, incoming);
            debug!(stored = merged.len(), "triggers merged");
            self.store.save(&merged).await?;
        }

        Ok(self.evaluate().await)
    }

    /// Shows the first due, still-valid triggered survey if nothing is displayed.
    ///
    /// Surveys the server reports as no longer available are removed and the
    /// next candidate is tried. A failed validity check leaves the store
    /// untouched and ends this evaluation.
    pub async fn evaluate(&self) -> Option<SurveyId> {
        loop {
            if !self.display.is_idle() {
                debug!("popup displayed, skipping trigger evaluation");
                return None;
            }

            let now = Utc::now();
            let Some(candidate) = self.store.load().await.into_iter().find(|r| r.is_due(now)) else {
                debug!("no triggered survey due");
                return None;
            };
            let survey_id = candidate.survey_id;

            let details = match self.api.survey_details(&survey_id).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(survey_id = %survey_id, error = %e, "survey validity check failed, retrying next cycle");
                    self.callbacks.failure(e.failure_message());
                    return None;
                }
            };

            if !details.is_available() {
                info!(
                    survey_id = %survey_id,
                    status = details.user_survey_status.as_deref().unwrap_or("<none>"),
                    "triggered survey no longer available, removing"
                );
                if let Err(e) = self.remove(&survey_id).await {
                    warn!(survey_id = %survey_id, error = %e, "failed to remove stale trigger");
                    return None;
                }
                continue;
            }

            // The check above awaited; state may have moved on meanwhile. The
            // re-check and the show happen under the write lock so a dismiss
            // cannot interleave between them.
            let _guard = self.write_lock.lock().await;
            if !self.display.is_idle() {
                debug!(survey_id = %survey_id, "popup opened during validity check, discarding result");
                return None;
            }
            let now = Utc::now();
            if !self
                .store
                .load()
                .await
                .iter()
                .any(|r| r.survey_id == survey_id && r.is_due(now))
            {
                debug!(survey_id = %survey_id, "trigger resolved or postponed during validity check, discarding result");
                continue;
            }

            return match self.display.show(DisplayTarget::Survey(survey_id.clone())) {
                Ok(true) => {
                    info!(survey_id = %survey_id, "triggered survey displayed");
                    Some(survey_id)
                }
                Ok(false) => None,
                Err(e) => {
                    warn!(survey_id = %survey_id, error = %e, "failed to display triggered survey");
                    None
                }
            };
        }
    }

    /// User closed the popup. A survey closed this way is postponed, never
    /// removed; closing the embed view postpones nothing.
    ///
    /// The popup is released and the survey postponed under the write lock,
    /// so no evaluation observes the idle gate before the postponement lands.
    pub async fn dismiss(&self) -> Option<DisplayTarget> {
        let _guard = self.write_lock.lock().await;
        let target = self.display.dismiss()?;
        if let DisplayTarget::Survey(survey_id) = &target {
            if let Err(e) = self.postpone_locked(survey_id).await {
                warn!(survey_id = %survey_id, error = %e, "failed to postpone dismissed survey");
            }
        }
        Some(target)
    }

    /// Defers `survey_id` by the configured postpone minutes, in place.
    ///
    /// Returns `false` when no record matches.
    pub async fn postpone(&self, survey_id: &SurveyId) -> Result<bool, PollingError> {
        let _guard = self.write_lock.lock().await;
        self.postpone_locked(survey_id).await
    }

    /// Caller holds `write_lock`.
    async fn postpone_locked(&self, survey_id: &SurveyId) -> Result<bool, PollingError> {
        let mut records = self.store.load().await;
        let Some(record) = records.iter_mut().find(|r| &r.survey_id == survey_id) else {
            debug!(survey_id = %survey_id, "postpone for unknown trigger");
            return Ok(false);
        };
        *record = record.postponed(self.postpone_minutes);
        info!(
            survey_id = %survey_id,
            due_at = %record.due_at,
            cumulative_delay_seconds = record.cumulative_delay_seconds,
            "triggered survey postponed"
        );
        self.store.save(&records).await?;
        Ok(true)
    }

    /// Drops the record for `survey_id`. Returns whether one was present.
    pub async fn remove(&self, survey_id: &SurveyId) -> Result<bool, PollingError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load().await;
        let before = records.len();
        records.retain(|r| &r.survey_id != survey_id);
        if records.len() == before {
            return Ok(false);
        }
        self.store.save(&records).await?;
        debug!(survey_id = %survey_id, "trigger removed");
        Ok(true)
    }
}

/// Appends `incoming` to `existing` and keeps only the last record per survey.
///
/// Survivors keep the relative order of their last occurrence.
pub fn merge_triggers(
    existing: Vec<TriggeredSurveyRecord>,
    incoming: Vec<TriggeredSurveyRecord>,
) -> Vec<TriggeredSurveyRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<_> = existing
        .into_iter()
        .chain(incoming)
        .rev()
        .filter(|r| seen.insert(r.survey_id.clone()))
        .collect();
    merged.reverse();
    merged
}
