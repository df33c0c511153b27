// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MessageStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use smsbridge_config::model::StorageConfig;
use smsbridge_core::{
    AdapterType, HealthStatus, MessageStore, NewMessage, PluginAdapter, SmsBridgeError,
    StoredMessage,
};

use crate::database::{self, Database};
use crate::queries;

/// SQLite-backed message store.
///
/// The database is opened on the first call to [`MessageStore::initialize`];
/// every other operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage. No file is touched until `initialize`.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, SmsBridgeError> {
        self.db.get().ok_or_else(|| SmsBridgeError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SmsBridgeError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SmsBridgeError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), SmsBridgeError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SmsBridgeError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), SmsBridgeError> {
        queries::messages::ensure_indexes(self.db()?).await
    }

    async fn find_message(
        &self,
        from: &str,
        body: &str,
        received_at: &DateTime<Utc>,
    ) -> Result<Option<StoredMessage>, SmsBridgeError> {
        queries::messages::find_message(self.db()?, from, body, received_at).await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<String, SmsBridgeError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn list_messages(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<StoredMessage>, SmsBridgeError> {
        queries::messages::list_messages(self.db()?, limit).await
    }

    async fn count_messages(&self) -> Result<i64, SmsBridgeError> {
        queries::messages::count_messages(self.db()?).await
    }

    async fn close(&self) -> Result<(), SmsBridgeError> {
        database::checkpoint(self.db()?.connection()).await
    }
}
