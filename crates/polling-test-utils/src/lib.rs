// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the Polling survey SDK.
//!
//! Provides deterministic stand-ins for every external collaborator so the
//! scheduling and bridge logic can be exercised without a network or a UI.
//!
//! # Components
//!
//! - [`MockSurveyApi`] - scripted survey API with a call log
//! - [`RecordingSurface`] - display surface that records mounts and unmounts
//! - [`CallbackRecorder`] - captures host callback invocations

pub mod callbacks;
pub mod mock_api;
pub mod surface;

pub use callbacks::CallbackRecorder;
pub use mock_api::{ApiCall, MockFailure, MockSurveyApi};
pub use surface::{RecordingSurface, SurfaceEvent};
