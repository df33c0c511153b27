// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SmsBridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{NewMessage, StoredMessage};

/// Persistence for received messages.
///
/// Uniqueness over `(from, body, received_at)` is the caller's job: look the
/// triple up with [`find_message`](Self::find_message) before inserting.
#[async_trait]
pub trait MessageStore: PluginAdapter {
    /// Initializes the storage backend (connection, migrations).
    async fn initialize(&self) -> Result<(), SmsBridgeError>;

    /// Creates the lookup index on `(from, body, received_at)` if missing.
    async fn ensure_indexes(&self) -> Result<(), SmsBridgeError>;

    /// Exact-match lookup on the deduplication triple.
    async fn find_message(
        &self,
        from: &str,
        body: &str,
        received_at: &DateTime<Utc>,
    ) -> Result<Option<StoredMessage>, SmsBridgeError>;

    /// Inserts a new record and returns its id.
    async fn insert_message(&self, message: &NewMessage) -> Result<String, SmsBridgeError>;

    /// Lists stored messages, newest `received_at` first.
    async fn list_messages(&self, limit: Option<i64>)
    -> Result<Vec<StoredMessage>, SmsBridgeError>;

    /// Total number of stored messages.
    async fn count_messages(&self) -> Result<i64, SmsBridgeError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), SmsBridgeError>;
}
