// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!` and run on every database open.

use polling_core::PollingError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), PollingError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| PollingError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
