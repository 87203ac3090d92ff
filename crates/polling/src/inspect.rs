// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only views of the local store: `polling results` and `polling triggers`.

use std::sync::Arc;

use polling_config::PollingConfig;
use polling_core::{PollingError, SurveyId};
use polling_storage::results::RESULT_KEY_PREFIX;
use polling_storage::{SqliteKeyValueStore, SurveyResultStore, TriggerStore};
use serde_json::{json, Value};

/// Stored answers are JSON, but a value written by another tool is shown raw.
fn result_line(survey_id: &str, stored: String) -> Value {
    let result = serde_json::from_str(&stored).unwrap_or(Value::String(stored));
    json!({"survey_id": survey_id, "result": result})
}

async fn result_lines(
    kv: SqliteKeyValueStore,
    survey_id: Option<&str>,
) -> Result<Vec<Value>, PollingError> {
    let keys = match survey_id {
        Some(id) => vec![id.to_string()],
        None => kv
            .keys_with_prefix(RESULT_KEY_PREFIX)
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(RESULT_KEY_PREFIX).map(str::to_string))
            .collect(),
    };

    let store = SurveyResultStore::new(Arc::new(kv));
    let mut lines = Vec::with_capacity(keys.len());
    for id in keys {
        if let Some(stored) = store.get(&SurveyId::from(id.as_str())).await? {
            lines.push(result_line(&id, stored));
        }
    }
    Ok(lines)
}

async fn trigger_lines(kv: SqliteKeyValueStore) -> Result<Vec<Value>, PollingError> {
    let records = TriggerStore::new(Arc::new(kv)).load().await;
    records
        .iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|e| PollingError::Decode {
                context: "trigger record".into(),
                source: Box::new(e),
            })
        })
        .collect()
}

pub async fn results(config: &PollingConfig, survey_id: Option<&str>) -> Result<(), PollingError> {
    let kv = SqliteKeyValueStore::open(&config.storage).await?;
    let lines = result_lines(kv, survey_id).await?;
    if lines.is_empty() {
        if let Some(id) = survey_id {
            return Err(PollingError::Internal(format!("no stored result for survey {id}")));
        }
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub async fn triggers(config: &PollingConfig) -> Result<(), PollingError> {
    let kv = SqliteKeyValueStore::open(&config.storage).await?;
    for line in trigger_lines(kv).await? {
        println!("{line}");
    }
    Ok(())
}
