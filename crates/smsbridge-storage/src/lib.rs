// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for received SMS messages.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a single-writer
//! concurrency model via `tokio-rusqlite`. [`SqliteStorage`] implements the
//! `MessageStore` trait used by the poller.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
