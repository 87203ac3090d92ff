// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Polling survey SDK.
//!
//! This crate provides the error type, the domain types shared by every
//! component (triggers, availability snapshots, rewards, display state) and
//! the traits the SDK uses to reach its external collaborators: the remote
//! survey API, the host's durable key-value storage and the visual surface
//! that hosts the survey frame.

pub mod error;
pub mod traits;
pub mod types;

pub use error::PollingError;
pub use types::{
    AvailableSurveysSnapshot, DisplayTarget, EventOutcome, PopupRequest, PresentationMode,
    RawTrigger, Reward, SurveyDetails, SurveyId, SurveySummary, TriggerSurvey,
    TriggeredSurveyRecord, VisibilityState,
};

pub use traits::{DisplaySurface, KeyValueStore, SurveyApi};
