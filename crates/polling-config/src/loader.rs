// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./polling.toml` > `~/.config/polling/polling.toml` >
//! `/etc/polling/polling.toml`, with environment variable overrides via the
//! `POLLING_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PollingConfig;

const SYSTEM_CONFIG: &str = "/etc/polling/polling.toml";
const LOCAL_CONFIG: &str = "polling.toml";

/// Config files in merge order (earlier entries are overridden by later ones).
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("polling").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/polling/polling.toml`
/// 3. `~/.config/polling/polling.toml`
/// 4. `./polling.toml`
/// 5. `POLLING_*` environment variables
pub fn load_config() -> Result<PollingConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PollingConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PollingConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PollingConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PollingConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    config_file_candidates()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(PollingConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Maps `POLLING_*` variables onto dotted keys.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `POLLING_ACCOUNT_CUSTOMER_ID`
/// must become `account.customer_id`, not `account.customer.id`.
fn env_provider() -> Env {
    Env::prefixed("POLLING_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    const SECTIONS: [&str; 7] = [
        "account", "endpoints", "polling", "bridge", "display", "storage", "sdk",
    ];
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(*section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(key)
}
