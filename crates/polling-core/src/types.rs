// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the SDK components.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier of a survey (the server's survey UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub String);

impl SurveyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SurveyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurveyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SurveyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// --- Trigger types ---

/// Survey reference embedded in a server-issued trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSurvey {
    pub survey_uuid: String,
    #[serde(default)]
    pub name: String,
}

/// A trigger exactly as delivered by the event API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrigger {
    pub survey: TriggerSurvey,
    /// Absolute instant at which the survey becomes eligible.
    pub delayed_timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

impl RawTrigger {
    /// Converts the wire trigger into a stored record with no postponement.
    ///
    /// Returns `None` when `delayed_timestamp` is not a recognisable instant.
    pub fn to_record(&self) -> Option<TriggeredSurveyRecord> {
        let due_at = parse_timestamp(&self.delayed_timestamp)?;
        Some(TriggeredSurveyRecord {
            survey_id: SurveyId(self.survey.survey_uuid.clone()),
            display_name: self.survey.name.clone(),
            due_at,
            cumulative_delay_seconds: 0,
        })
    }
}

/// Parses RFC 3339 timestamps, falling back to a bare `YYYY-MM-DD HH:MM:SS` in UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// A triggered survey held in the durable trigger store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredSurveyRecord {
    pub survey_id: SurveyId,
    /// Informational only.
    pub display_name: String,
    pub due_at: DateTime<Utc>,
    /// Total postponement applied so far.
    pub cumulative_delay_seconds: u64,
}

impl TriggeredSurveyRecord {
    /// A record is due once `due_at` lies strictly before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at < now
    }

    /// Returns a copy deferred by `minutes`, with the delay accumulated.
    pub fn postponed(&self, minutes: u32) -> Self {
        Self {
            due_at: self.due_at + Duration::minutes(i64::from(minutes)),
            cumulative_delay_seconds: self.cumulative_delay_seconds + u64::from(minutes) * 60,
            ..self.clone()
        }
    }
}

/// Response body of the event API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    #[serde(default)]
    pub triggered_surveys: Option<Vec<RawTrigger>>,
}

impl EventOutcome {
    pub fn triggers(&self) -> &[RawTrigger] {
        self.triggered_surveys.as_deref().unwrap_or_default()
    }
}

// --- Availability types ---

/// One entry of the available-surveys listing.
///
/// Only the identifier and status are interpreted; every other field the
/// server sends is kept verbatim for the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveySummary {
    #[serde(default)]
    pub survey_uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_survey_status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The most recent available-surveys response, replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableSurveysSnapshot {
    #[serde(rename = "data", default)]
    pub items: Vec<SurveySummary>,
}

impl AvailableSurveysSnapshot {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Current server-side status of one survey for this customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyDetails {
    #[serde(default)]
    pub survey_uuid: Option<String>,
    #[serde(default)]
    pub user_survey_status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SurveyDetails {
    /// Status value the server uses for surveys that may still be shown.
    pub const AVAILABLE: &'static str = "available";

    pub fn is_available(&self) -> bool {
        self.user_survey_status.as_deref() == Some(Self::AVAILABLE)
    }
}

// --- Completion types ---

/// A reward earned by completing a survey. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub completed_at: DateTime<Utc>,
    pub amount: u64,
    pub name: String,
    /// Correlates with the survey session that produced the reward.
    pub session_id: String,
}

// --- Display types ---

/// What the popup is showing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayTarget {
    /// A specific survey, shown explicitly or via a trigger.
    Survey(SurveyId),
    /// The account's default embed view listing available surveys.
    EmbedView,
}

impl DisplayTarget {
    pub fn survey_id(&self) -> Option<&SurveyId> {
        match self {
            DisplayTarget::Survey(id) => Some(id),
            DisplayTarget::EmbedView => None,
        }
    }
}

impl std::fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayTarget::Survey(id) => write!(f, "survey:{id}"),
            DisplayTarget::EmbedView => write!(f, "embed-view"),
        }
    }
}

/// System-wide popup visibility. At most one target is displayed at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisibilityState {
    #[default]
    Idle,
    Displaying(DisplayTarget),
}

impl VisibilityState {
    pub fn is_idle(&self) -> bool {
        matches!(self, VisibilityState::Idle)
    }

    pub fn target(&self) -> Option<&DisplayTarget> {
        match self {
            VisibilityState::Idle => None,
            VisibilityState::Displaying(target) => Some(target),
        }
    }
}

/// How the popup shell is presented on the host page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PresentationMode {
    /// Centered modal over a dimmed overlay.
    #[default]
    FullPage,
    /// Non-modal panel anchored to a corner, animated into view.
    Corner,
}

/// Everything the host surface needs to build the popup shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub target: DisplayTarget,
    /// URL the embedded frame is pointed at.
    pub url: String,
    pub mode: PresentationMode,
}
