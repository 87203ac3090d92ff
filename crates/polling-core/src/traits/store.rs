// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key-value storage provided by the host.

use async_trait::async_trait;

use crate::error::PollingError;

/// String-keyed, string-valued durable storage that survives restarts.
///
/// The SDK layers typed repositories on top; backends never interpret values.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, PollingError>;

    /// Inserts or overwrites the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), PollingError>;

    /// Deletes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), PollingError>;
}
