// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smsbridge messages` command implementation.
//!
//! Prints stored messages with their masked sender numbers only.

use chrono::SecondsFormat;
use smsbridge_config::model::SmsBridgeConfig;
use smsbridge_core::{MessageStore, SmsBridgeError, StoredMessage};
use smsbridge_storage::SqliteStorage;

/// Print up to `limit` stored messages, newest first.
pub async fn run_messages(
    config: &SmsBridgeConfig,
    limit: Option<i64>,
) -> Result<(), SmsBridgeError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    let messages = storage.list_messages(limit).await?;
    let total = storage.count_messages().await?;

    if messages.is_empty() {
        println!("No messages stored.");
    } else {
        for message in &messages {
            println!("{}", format_message(message));
        }
        println!();
        println!("  {} of {total} message(s) shown.", messages.len());
    }

    storage.close().await
}

fn format_message(message: &StoredMessage) -> String {
    // Keep one message per line.
    let body = message.body.replace(['\r', '\n'], " ");
    format!(
        "{}  {:<18} {}",
        message
            .received_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        message.from_safe,
        body
    )
}
