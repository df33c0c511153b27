// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations: dedup lookup, insert, listing.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};
use smsbridge_core::{NewMessage, SmsBridgeError, StoredMessage};

use crate::database::{Database, format_timestamp, map_tr_err, parse_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, from_number, from_safe, body, received_at FROM messages";

fn row_to_message(row: &Row<'_>) -> Result<StoredMessage, rusqlite::Error> {
    let received_at: String = row.get(4)?;
    let received_at = parse_timestamp(&received_at).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(StoredMessage {
        id: row.get(0)?,
        from: row.get(1)?,
        from_safe: row.get(2)?,
        body: row.get(3)?,
        received_at,
    })
}

/// Create the compound lookup index used by [`find_message`]. Idempotent.
pub async fn ensure_indexes(db: &Database) -> Result<(), SmsBridgeError> {
    db.connection()
        .call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_messages_dedup
                 ON messages (from_number, body, received_at);",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Exact-match lookup on `(from, body, received_at)`.
pub async fn find_message(
    db: &Database,
    from: &str,
    body: &str,
    received_at: &DateTime<Utc>,
) -> Result<Option<StoredMessage>, SmsBridgeError> {
    let from = from.to_string();
    let body = body.to_string();
    let received_at = format_timestamp(received_at);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "{SELECT_COLUMNS} WHERE from_number = ?1 AND body = ?2 AND received_at = ?3 LIMIT 1"
                ),
                params![from, body, received_at],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new message and return its generated id.
pub async fn insert_message(db: &Database, msg: &NewMessage) -> Result<String, SmsBridgeError> {
    let id = uuid::Uuid::new_v4().to_string();
    let row_id = id.clone();
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, from_number, from_safe, body, received_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row_id,
                    msg.from,
                    msg.from_safe,
                    msg.body,
                    format_timestamp(&msg.received_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(id)
}

/// List messages, newest first. `None` returns everything.
pub async fn list_messages(
    db: &Database,
    limit: Option<i64>,
) -> Result<Vec<StoredMessage>, SmsBridgeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY received_at DESC, rowid DESC LIMIT ?1"
            ))?;
            // SQLite treats a negative LIMIT as no limit.
            let rows = stmt.query_map(params![limit.unwrap_or(-1)], row_to_message)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of stored messages.
pub async fn count_messages(db: &Database) -> Result<i64, SmsBridgeError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}
