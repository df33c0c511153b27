// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deduplicate normalized messages against storage and insert the new ones.

use smsbridge_core::{MessageStore, NewMessage, SmsBridgeError};
use tracing::{debug, info};

use crate::mask::mask_number;
use crate::normalize::NormalizedListing;

/// Body characters shown when logging a skipped duplicate.
const SKIP_PREVIEW_CHARS: usize = 30;

/// What one persistence pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    /// Ids of the records inserted, in listing order.
    pub inserted: Vec<String>,
    /// Messages already present in storage.
    pub skipped: usize,
}

/// Insert every message of `listing` whose `(from, body, received_at)` is not
/// stored yet.
///
/// Stops at the first storage error; records inserted before it stay.
pub async fn persist(
    store: &dyn MessageStore,
    listing: &NormalizedListing,
) -> Result<PersistReport, SmsBridgeError> {
    let mut report = PersistReport::default();

    for message in listing.values() {
        if let Some(existing) = store
            .find_message(&message.number, &message.content, &message.time)
            .await?
        {
            let preview: String = message.content.chars().take(SKIP_PREVIEW_CHARS).collect();
            debug!(id = %existing.id, from = %message.number, %preview, "message already stored");
            report.skipped += 1;
            continue;
        }

        let record = NewMessage {
            from: message.number.clone(),
            from_safe: mask_number(&message.number),
            body: message.content.clone(),
            received_at: message.time,
        };
        let id = store.insert_message(&record).await?;
        info!(%id, from = %record.from, received_at = %record.received_at, "stored new message");
        report.inserted.push(id);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use smsbridge_config::model::StorageConfig;
    use smsbridge_core::{NormalizedMessage, NotePolicy, RawSmsEntry, SmsNote};
    use smsbridge_storage::SqliteStorage;
    use tempfile::TempDir;

    async fn store() -> (SqliteStorage, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("persist.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    fn listing(items: &[(&str, &str, i64)]) -> NormalizedListing {
        items
            .iter()
            .map(|(number, content, secs)| {
                (
                    number.to_string(),
                    NormalizedMessage {
                        number: number.to_string(),
                        content: content.to_string(),
                        time: DateTime::from_timestamp(*secs, 0).unwrap(),
                    },
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn inserts_with_masked_number() {
        let (store, _dir) = store().await;
        let report = persist(&store, &listing(&[("+33612345678", "hi", 1000)]))
            .await
            .unwrap();
        assert_eq!(report.inserted.len(), 1);
        assert_eq!(report.skipped, 0);

        let stored = store.list_messages(None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, report.inserted[0]);
        assert_eq!(stored[0].from, "+33612345678");
        assert_eq!(stored[0].from_safe, "336 xx xx xx 78");
        assert_eq!(stored[0].body, "hi");
        assert_eq!(stored[0].received_at, DateTime::from_timestamp(1000, 0).unwrap());
    }

    #[tokio::test]
    async fn same_triple_twice_yields_one_record() {
        let (store, _dir) = store().await;
        let batch = listing(&[("+33612345678", "hi", 1000)]);

        persist(&store, &batch).await.unwrap();
        let second = persist(&store, &batch).await.unwrap();

        assert!(second.inserted.is_empty());
        assert_eq!(second.skipped, 1);
        assert_eq!(store.count_messages().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn changed_body_or_time_is_new_message() {
        let (store, _dir) = store().await;
        persist(&store, &listing(&[("+1555123456", "hi", 1000)])).await.unwrap();

        let report = persist(
            &store,
            &listing(&[("+1555123456", "hi again", 1000)]),
        )
        .await
        .unwrap();
        assert_eq!(report.inserted.len(), 1);

        let report = persist(&store, &listing(&[("+1555123456", "hi", 1001)])).await.unwrap();
        assert_eq!(report.inserted.len(), 1);
        assert_eq!(store.count_messages().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn listing_with_far_future_time_keeps_polling() {
        let (store, _dir) = store().await;
        let entries = vec![
            RawSmsEntry {
                phone: "+33612345678".into(),
                note: vec![SmsNote::at_unix("from year 10000", 253_402_300_800)],
            },
            RawSmsEntry {
                phone: "+447700900123".into(),
                note: vec![SmsNote {
                    content: "fractional".into(),
                    time_ms: 1_700_000_000_123,
                }],
            },
        ];

        for round in 0..2 {
            let normalized = crate::normalize::normalize(&entries, NotePolicy::FirstNote);
            let report = persist(&store, &normalized).await.unwrap();
            assert_eq!(report.inserted.len() + report.skipped, 1, "round {round}");
        }

        let stored = store.list_messages(Some(10)).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].received_at,
            DateTime::from_timestamp_millis(1_700_000_000_123).unwrap()
        );
    }

    #[tokio::test]
    async fn storage_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        // Never initialized: every call fails.
        let store = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("x.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        let err = persist(&store, &listing(&[("+1555123456", "hi", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsBridgeError::Storage { .. }));
    }
}
