// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as absolute URLs, non-zero intervals, and hostname-shaped domains.

use crate::diagnostic::ConfigError;
use crate::model::PollingConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PollingConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    for (key, url) in [
        ("endpoints.app_base_url", &config.endpoints.app_base_url),
        ("endpoints.api_base_url", &config.endpoints.api_base_url),
    ] {
        let trimmed = url.trim();
        if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be an absolute http(s) URL, got `{url}`"),
            });
        } else if trimmed.ends_with('/') {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not end with a trailing slash, got `{url}`"),
            });
        }
    }

    if config.endpoints.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "endpoints.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.polling.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "polling.poll_interval_secs must be at least 1".to_string(),
        });
    }

    if config.polling.close_postpone_minutes == 0 {
        errors.push(ConfigError::Validation {
            message: "polling.close_postpone_minutes must be at least 1".to_string(),
        });
    }

    let domain = config.bridge.trusted_domain.trim();
    if domain.is_empty() {
        errors.push(ConfigError::Validation {
            message: "bridge.trusted_domain must not be empty".to_string(),
        });
    } else if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        errors.push(ConfigError::Validation {
            message: format!("bridge.trusted_domain `{domain}` is not a valid hostname"),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.sdk.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "sdk.log_level `{}` must be one of {}",
                config.sdk.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
