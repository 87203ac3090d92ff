// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted survey API for deterministic testing.
//!
//! `MockSurveyApi` implements `SurveyApi` with per-endpoint response scripts
//! and records every call for assertion in tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use polling_core::{
    AvailableSurveysSnapshot, EventOutcome, PollingError, SurveyApi, SurveyDetails, SurveyId,
    SurveySummary,
};

/// A failure the mock should report instead of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// No response at all.
    Network,
    /// A non-success HTTP status.
    Status(u16),
}

impl MockFailure {
    fn to_error(self, context: &str) -> PollingError {
        match self {
            MockFailure::Network => PollingError::Transport {
                message: "mock network failure".into(),
                source: None,
            },
            MockFailure::Status(status) => PollingError::Status {
                context: context.to_string(),
                status,
            },
        }
    }
}

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    AvailableSurveys,
    SurveyDetails(SurveyId),
    LogEvent { name: String, value: String },
}

#[derive(Default)]
struct Script {
    available: VecDeque<Result<AvailableSurveysSnapshot, MockFailure>>,
    available_fallback: AvailableSurveysSnapshot,
    details: HashMap<SurveyId, Result<String, MockFailure>>,
    events: VecDeque<Result<EventOutcome, MockFailure>>,
    calls: Vec<ApiCall>,
}

/// A survey API that answers from a script.
///
/// * Available surveys: queued responses are popped in order; once the
///   queue is empty the fallback snapshot (initially empty) is returned.
/// * Survey details: answered per survey id; unknown ids report status
///   `"available"`.
/// * Events: queued responses are popped in order; an empty queue yields an
///   outcome without triggers.
pub struct MockSurveyApi {
    script: Mutex<Script>,
    details_gate: Mutex<Option<DetailsGate>>,
}

#[derive(Clone)]
struct DetailsGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl MockSurveyApi {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            details_gate: Mutex::new(None),
        }
    }

    /// Builds a snapshot listing the given survey ids.
    pub fn snapshot(ids: &[&str]) -> AvailableSurveysSnapshot {
        AvailableSurveysSnapshot {
            items: ids
                .iter()
                .map(|id| SurveySummary {
                    survey_uuid: Some((*id).to_string()),
                    name: Some(format!("Survey {id}")),
                    user_survey_status: Some(SurveyDetails::AVAILABLE.to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    /// Queue a one-shot available-surveys response.
    pub async fn push_available(&self, response: Result<AvailableSurveysSnapshot, MockFailure>) {
        self.script.lock().await.available.push_back(response);
    }

    /// Set the snapshot returned once the queue is exhausted.
    pub async fn set_available(&self, snapshot: AvailableSurveysSnapshot) {
        self.script.lock().await.available_fallback = snapshot;
    }

    /// Report `status` as the survey's current `user_survey_status`.
    pub async fn set_survey_status(&self, survey_id: &str, status: &str) {
        self.script
            .lock()
            .await
            .details
            .insert(SurveyId::from(survey_id), Ok(status.to_string()));
    }

    /// Make detail queries for `survey_id` fail.
    pub async fn fail_survey_details(&self, survey_id: &str, failure: MockFailure) {
        self.script
            .lock()
            .await
            .details
            .insert(SurveyId::from(survey_id), Err(failure));
    }

    /// Queue a one-shot event response.
    pub async fn push_event(&self, response: Result<EventOutcome, MockFailure>) {
        self.script.lock().await.events.push_back(response);
    }

    /// Hold every detail query until [`release_details`](Self::release_details)
    /// is called. Returns a handle that resolves once a query is in flight.
    pub async fn hold_details(&self) -> Arc<Notify> {
        let gate = DetailsGate {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        let entered = gate.entered.clone();
        *self.details_gate.lock().await = Some(gate);
        entered
    }

    /// Let one held detail query continue.
    pub async fn release_details(&self) {
        if let Some(gate) = self.details_gate.lock().await.take() {
            gate.release.notify_one();
        }
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.script.lock().await.calls.clone()
    }

    /// Count of calls matching `pred`.
    pub async fn call_count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.script.lock().await.calls.iter().filter(|c| pred(c)).count()
    }

    async fn record(&self, call: ApiCall) {
        self.script.lock().await.calls.push(call);
    }
}

impl Default for MockSurveyApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SurveyApi for MockSurveyApi {
    async fn available_surveys(&self) -> Result<AvailableSurveysSnapshot, PollingError> {
        let mut script = self.script.lock().await;
        script.calls.push(ApiCall::AvailableSurveys);
        match script.available.pop_front() {
            Some(response) => response.map_err(|f| f.to_error("Failed to load")),
            None => Ok(script.available_fallback.clone()),
        }
    }

    async fn survey_details(&self, survey_id: &SurveyId) -> Result<SurveyDetails, PollingError> {
        self.record(ApiCall::SurveyDetails(survey_id.clone())).await;

        let gate = self.details_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let scripted = self.script.lock().await.details.get(survey_id).cloned();
        let status = match scripted {
            Some(Ok(status)) => status,
            Some(Err(failure)) => return Err(failure.to_error("Failed to load")),
            None => SurveyDetails::AVAILABLE.to_string(),
        };
        Ok(SurveyDetails {
            survey_uuid: Some(survey_id.to_string()),
            user_survey_status: Some(status),
            ..Default::default()
        })
    }

    async fn log_event(&self, name: &str, value: &str) -> Result<EventOutcome, PollingError> {
        let mut script = self.script.lock().await;
        script.calls.push(ApiCall::LogEvent {
            name: name.to_string(),
            value: value.to_string(),
        });
        match script.events.pop_front() {
            Some(response) => response.map_err(|f| f.to_error("Failed to log event")),
            None => Ok(EventOutcome::default()),
        }
    }
}
