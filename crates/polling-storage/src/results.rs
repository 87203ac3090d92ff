// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local survey result storage: one serialized answers blob per completed survey.

use std::sync::Arc;

use polling_core::{KeyValueStore, PollingError, SurveyId};

pub const RESULT_KEY_PREFIX: &str = "polling:survey_result:";

pub fn result_key(survey_id: &SurveyId) -> String {
    format!("{RESULT_KEY_PREFIX}{survey_id}")
}

/// Stores the answers of completed surveys, keyed by survey id.
#[derive(Clone)]
pub struct SurveyResultStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SurveyResultStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Serializes `answers` and stores it, replacing any earlier result.
    pub async fn store(
        &self,
        survey_id: &SurveyId,
        answers: &serde_json::Value,
    ) -> Result<(), PollingError> {
        let raw = serde_json::to_string(answers).map_err(|e| PollingError::Decode {
            context: format!("answers for survey {survey_id}"),
            source: Box::new(e),
        })?;
        self.kv.set(&result_key(survey_id), &raw).await
    }

    /// The serialized answers for `survey_id`, if that survey was completed here.
    pub async fn get(&self, survey_id: &SurveyId) -> Result<Option<String>, PollingError> {
        self.kv.get(&result_key(survey_id)).await
    }
}
