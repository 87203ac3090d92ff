// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote survey and event API.

use async_trait::async_trait;

use crate::error::PollingError;
use crate::types::{AvailableSurveysSnapshot, EventOutcome, SurveyDetails, SurveyId};

/// Client for the remote survey service.
///
/// Implementations return [`PollingError::Transport`] when no response was
/// received and [`PollingError::Status`] for non-success responses; callers
/// rely on that split to decide whether state may be mutated.
#[async_trait]
pub trait SurveyApi: Send + Sync + 'static {
    /// Fetches the surveys the current customer is eligible for.
    async fn available_surveys(&self) -> Result<AvailableSurveysSnapshot, PollingError>;

    /// Fetches the current status of a single survey.
    async fn survey_details(&self, survey_id: &SurveyId) -> Result<SurveyDetails, PollingError>;

    /// Submits an analytics event; the response may carry new triggers.
    async fn log_event(&self, name: &str, value: &str) -> Result<EventOutcome, PollingError>;
}
