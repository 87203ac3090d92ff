// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the SDK's external collaborators.
//!
//! Async traits use `#[async_trait]` so they can be held as trait objects.

pub mod api;
pub mod store;
pub mod surface;

pub use api::SurveyApi;
pub use store::KeyValueStore;
pub use surface::DisplaySurface;
