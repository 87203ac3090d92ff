// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the KeyValueStore trait.

use async_trait::async_trait;
use polling_config::model::StorageConfig;
use polling_core::{KeyValueStore, PollingError};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::database::{map_tr_err, Database};

/// Key-value store persisted in the `kv_store` table.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    db: Database,
}

impl SqliteKeyValueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database named by the storage configuration.
    pub async fn open(config: &StorageConfig) -> Result<Self, PollingError> {
        let db = Database::open(&config.database_path).await?;
        debug!(path = %config.database_path, "sqlite key-value store ready");
        Ok(Self::new(db))
    }

    /// Lists stored keys starting with `prefix`, in key order.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, PollingError> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT key FROM kv_store WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key",
                )?;
                let rows = stmt.query_map(params![pattern], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PollingError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PollingError> {
        let key = key.to_string();
        let value = value.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn remove(&self, key: &str) -> Result<(), PollingError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
