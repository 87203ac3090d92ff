// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP access to the Polling survey service.
//!
//! [`Endpoints`] owns the base URLs and the runtime-mutable account
//! credentials and builds every request and frame URL from them.
//! [`PollingApiClient`] implements [`polling_core::SurveyApi`] on top of it.

pub mod client;
pub mod endpoints;

pub use client::PollingApiClient;
pub use endpoints::{Credentials, Endpoints};
pub use reqwest::Url;
