// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage for the Polling survey SDK.
//!
//! Two [`KeyValueStore`](polling_core::KeyValueStore) backends (SQLite with
//! embedded migrations, and an in-process map) plus the typed repositories
//! the SDK works through: the trigger store and the survey result store.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod results;
pub mod sqlite;
pub mod triggers;

pub use database::Database;
pub use memory::MemoryKeyValueStore;
pub use results::SurveyResultStore;
pub use sqlite::SqliteKeyValueStore;
pub use triggers::TriggerStore;
