// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Polling survey SDK.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use polling_core::PresentationMode;
use serde::{Deserialize, Serialize};

/// Top-level SDK configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Account credentials.
    #[serde(default)]
    pub account: AccountConfig,

    /// Remote service base URLs.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Poll driver and trigger scheduling settings.
    #[serde(default)]
    pub polling: PollingScheduleConfig,

    /// Embedded frame bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Popup presentation settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Durable storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ambient SDK settings.
    #[serde(default)]
    pub sdk: SdkConfig,
}

/// Account credentials. Both must be present before the poll driver does any work.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    #[serde(default)]
    pub customer_id: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

/// Base URLs of the survey web app and the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointsConfig {
    /// Origin serving survey views loaded into the frame.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,

    /// Origin serving the JSON API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for API calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            app_base_url: default_app_base_url(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_app_base_url() -> String {
    "https://app.polling.com".to_string()
}

fn default_api_base_url() -> String {
    "https://api.polling.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Poll driver and trigger scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollingScheduleConfig {
    /// Seconds between poll ticks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Minutes a survey is deferred when the user closes it unfinished.
    #[serde(default = "default_close_postpone_minutes")]
    pub close_postpone_minutes: u32,

    /// Skip the available-surveys refresh on each tick.
    #[serde(default)]
    pub disable_available_surveys_poll: bool,
}

impl Default for PollingScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            close_postpone_minutes: default_close_postpone_minutes(),
            disable_available_surveys_poll: false,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_close_postpone_minutes() -> u32 {
    30
}

/// Bridge origin policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Frame messages are accepted from this domain and its subdomains only.
    #[serde(default = "default_trusted_domain")]
    pub trusted_domain: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            trusted_domain: default_trusted_domain(),
        }
    }
}

fn default_trusted_domain() -> String {
    "polling.com".to_string()
}

/// Popup presentation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default)]
    pub presentation: PresentationMode,
}

/// Durable storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database backing the trigger and result stores.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("polling").join("polling.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("polling.db"))
        .to_string_lossy()
        .into_owned()
}

/// Ambient settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PollingConfig {
    /// Both credentials, when configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.account.customer_id, &self.account.api_key) {
            (Some(customer_id), Some(api_key)) => Some((customer_id.as_str(), api_key.as_str())),
            _ => None,
        }
    }
}
