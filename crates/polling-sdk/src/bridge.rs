// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge Protocol Handler.
//!
//! Inbound messages from the embedded survey frame are checked against the
//! trusted-origin pattern, parsed into a [`BridgeMessage`] at the boundary,
//! and only then dispatched into scheduler, display and storage transitions.

use std::sync::Arc;

use chrono::Utc;
use polling_core::{PollingError, Reward, SurveyId};
use polling_storage::SurveyResultStore;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::availability::AvailabilityCache;
use crate::callbacks::SharedCallbacks;
use crate::display::DisplayController;
use crate::scheduler::TriggerScheduler;

pub const EVENT_COMPLETED: &str = "survey.completed";
pub const EVENT_ERROR: &str = "survey.error";
pub const EVENT_EMPTY: &str = "survey.empty";

/// A message posted by the survey frame, as received by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMessage {
    pub origin: String,
    pub data: Value,
}

impl FrameMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// Allow-list for frame origins: the trusted domain or any of its subdomains,
/// over http or https, with an optional port.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    pattern: Regex,
}

impl OriginPolicy {
    pub fn new(trusted_domain: &str) -> Result<Self, PollingError> {
        let pattern = format!(
            r"^https?://([A-Za-z0-9-]+\.)*{}(:[0-9]{{1,5}})?$",
            regex::escape(trusted_domain)
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| PollingError::Config(format!("invalid trusted domain: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.pattern.is_match(origin)
    }
}

/// Payload of a `survey.completed` message.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub survey_id: SurveyId,
    /// The frame's `data` object, handed to the success callback untouched.
    pub data: Value,
    pub answers: Value,
    pub reward: Option<RewardPayload>,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RewardPayload {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub name: String,
}

/// A validated frame message.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    Completed(Completion),
    Errored { survey_id: SurveyId },
    Empty { survey_id: SurveyId },
    /// Any other `event` value, or none at all.
    Other { event: Option<String> },
}

#[derive(Deserialize)]
struct CompletedWire {
    #[serde(rename = "surveyUuid")]
    survey_uuid: String,
    data: CompletionDataWire,
}

#[derive(Deserialize)]
struct CompletionDataWire {
    #[serde(default)]
    answers: Value,
    #[serde(default)]
    reward: Option<RewardPayload>,
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct TerminalWire {
    #[serde(rename = "surveyUuid")]
    survey_uuid: String,
}

impl BridgeMessage {
    /// Parses the message body. Fails only for a recognised event whose
    /// payload is malformed.
    pub fn parse(data: &Value) -> Result<Self, PollingError> {
        let event = data.get("event").and_then(Value::as_str);
        match event {
            Some(EVENT_COMPLETED) => {
                let wire: CompletedWire = from_value(data, EVENT_COMPLETED)?;
                Ok(BridgeMessage::Completed(Completion {
                    survey_id: SurveyId(wire.survey_uuid),
                    data: data.get("data").cloned().unwrap_or(Value::Null),
                    answers: wire.data.answers,
                    reward: wire.data.reward,
                    session_id: wire.data.session_id.unwrap_or_default(),
                }))
            }
            Some(EVENT_ERROR) => {
                let wire: TerminalWire = from_value(data, EVENT_ERROR)?;
                Ok(BridgeMessage::Errored {
                    survey_id: SurveyId(wire.survey_uuid),
                })
            }
            Some(EVENT_EMPTY) => {
                let wire: TerminalWire = from_value(data, EVENT_EMPTY)?;
                Ok(BridgeMessage::Empty {
                    survey_id: SurveyId(wire.survey_uuid),
                })
            }
            other => Ok(BridgeMessage::Other {
                event: other.map(str::to_string),
            }),
        }
    }
}

fn from_value<T: DeserializeOwned>(data: &Value, event: &str) -> Result<T, PollingError> {
    T::deserialize(data)
        .map_err(|e| PollingError::Bridge(format!("malformed {event} message: {e}")))
}

/// Reads a reward amount the way the frame's integer parsing does: numbers
/// are truncated, strings contribute their leading integer (after optional
/// whitespace and sign). Only positive amounts are returned.
pub fn parse_reward_amount(value: &Value) -> Option<u64> {
    let amount = match value {
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i128::from(i),
            (None, Some(u)) => i128::from(u),
            (None, None) => n.as_f64()?.trunc() as i128,
        },
        Value::String(s) => leading_integer(s)?,
        _ => return None,
    };
    if amount <= 0 {
        return None;
    }
    Some(u64::try_from(amount).unwrap_or(u64::MAX))
}

fn leading_integer(raw: &str) -> Option<i128> {
    let s = raw.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    // Overlong digit runs saturate rather than fail.
    let magnitude = digits.bytes().fold(0i128, |acc, d| {
        acc.saturating_mul(10).saturating_add(i128::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// What the handler did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Origin not allowed; nothing was touched.
    Rejected,
    /// Unrecognised or malformed message; nothing was touched.
    Ignored,
    Completed(SurveyId),
    /// `survey.error` or `survey.empty`: the trigger was dropped.
    Closed(SurveyId),
}

pub struct BridgeHandler {
    policy: OriginPolicy,
    scheduler: Arc<TriggerScheduler>,
    display: Arc<DisplayController>,
    availability: Arc<AvailabilityCache>,
    results: SurveyResultStore,
    callbacks: Arc<SharedCallbacks>,
}

impl BridgeHandler {
    pub fn new(
        policy: OriginPolicy,
        scheduler: Arc<TriggerScheduler>,
        display: Arc<DisplayController>,
        availability: Arc<AvailabilityCache>,
        results: SurveyResultStore,
        callbacks: Arc<SharedCallbacks>,
    ) -> Self {
        Self {
            policy,
            scheduler,
            display,
            availability,
            results,
            callbacks,
        }
    }

    pub async fn handle(&self, origin: &str, data: &Value) -> BridgeOutcome {
        if !self.policy.allows(origin) {
            error!(origin = %origin, "message origin not allowed");
            return BridgeOutcome::Rejected;
        }

        let message = match BridgeMessage::parse(data) {
            Ok(message) => message,
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring malformed frame message");
                return BridgeOutcome::Ignored;
            }
        };

        match message {
            BridgeMessage::Completed(completion) => self.on_completed(completion).await,
            BridgeMessage::Errored { survey_id } | BridgeMessage::Empty { survey_id } => {
                info!(survey_id = %survey_id, "survey ended without completion");
                self.drop_trigger(&survey_id).await;
                self.display.release(&survey_id);
                BridgeOutcome::Closed(survey_id)
            }
            BridgeMessage::Other { event } => {
                debug!(
                    origin = %origin,
                    event = event.as_deref().unwrap_or("<none>"),
                    data = %data,
                    "ignoring frame message"
                );
                BridgeOutcome::Ignored
            }
        }
    }

    async fn on_completed(&self, completion: Completion) -> BridgeOutcome {
        let Completion {
            survey_id,
            data,
            answers,
            reward,
            session_id,
        } = completion;
        info!(survey_id = %survey_id, "survey completed");

        if let Err(e) = self.results.store(&survey_id, &answers).await {
            warn!(survey_id = %survey_id, error = %e, "failed to store survey answers");
        }

        self.callbacks.success(data);

        self.drop_trigger(&survey_id).await;

        if let Some(reward) = reward {
            match parse_reward_amount(&reward.value) {
                Some(amount) => {
                    info!(survey_id = %survey_id, amount, "reward earned");
                    self.callbacks.reward(Reward {
                        completed_at: Utc::now(),
                        amount,
                        name: reward.name,
                        session_id,
                    });
                }
                None => debug!(survey_id = %survey_id, value = %reward.value, "no positive reward"),
            }
        }

        self.display.release(&survey_id);

        // Failures are reported through the failure callback by the cache.
        let _ = self.availability.refresh().await;

        BridgeOutcome::Completed(survey_id)
    }

    async fn drop_trigger(&self, survey_id: &SurveyId) {
        if let Err(e) = self.scheduler.remove(survey_id).await {
            warn!(survey_id = %survey_id, error = %e, "failed to remove trigger");
        }
    }
}

/// Feeds frame messages from `rx` into `handler` until cancelled or every
/// sender is gone.
pub fn spawn_listener(
    handler: Arc<BridgeHandler>,
    mut rx: mpsc::Receiver<FrameMessage>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("bridge listener started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = rx.recv() => match message {
                    Some(message) => {
                        handler.handle(&message.origin, &message.data).await;
                    }
                    None => break,
                },
            }
        }
        debug!("bridge listener stopped");
    })
}
