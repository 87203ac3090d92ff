// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All access is serialized through tokio-rusqlite's single background thread.

use polling_core::PollingError;
use tracing::debug;

use crate::migrations;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;";

/// Handle to the SDK's SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub async fn open(path: &str) -> Result<Self, PollingError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| PollingError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| PollingError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(true).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self, PollingError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| PollingError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    async fn prepare(&self, on_disk: bool) -> Result<(), PollingError> {
        self.conn
            .call(move |conn| -> Result<(), PollingError> {
                if on_disk {
                    conn.execute_batch(PRAGMAS).map_err(storage_err)?;
                }
                migrations::run_migrations(conn)
            })
            .await
            .map_err(|e| PollingError::Storage {
                source: Box::new(e),
            })
    }
}

fn storage_err(e: rusqlite::Error) -> PollingError {
    PollingError::Storage {
        source: Box::new(e),
    }
}

/// Convert a tokio-rusqlite error into PollingError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> PollingError {
    PollingError::Storage {
        source: Box::new(e),
    }
}
