// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end tick testing.
//!
//! `TestHarness` wires a [`Poller`] to a [`MockRouter`], a temp SQLite
//! database and a [`FixedClock`]. Tests script the router, call
//! [`TestHarness::tick`] and assert on what landed in storage.

use std::sync::Arc;

use smsbridge_config::model::{SmsBridgeConfig, StorageConfig};
use smsbridge_core::{MessageStore, NotePolicy, SmsBridgeError, StoredMessage};
use smsbridge_poller::{Poller, TickOutcome, TickRunner};
use smsbridge_storage::SqliteStorage;

use crate::clock::FixedClock;
use crate::mock_router::MockRouter;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    password: Option<String>,
    note_policy: NotePolicy,
    start_unix: i64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            password: Some("test-password".to_string()),
            note_policy: NotePolicy::default(),
            start_unix: 1_700_000_000,
        }
    }

    /// Set the router password; `None` leaves it unconfigured.
    pub fn with_password(mut self, password: Option<&str>) -> Self {
        self.password = password.map(str::to_string);
        self
    }

    pub fn with_note_policy(mut self, policy: NotePolicy) -> Self {
        self.note_policy = policy;
        self
    }

    /// Wall-clock start for tick timestamps.
    pub fn with_start_time(mut self, unix_secs: i64) -> Self {
        self.start_unix = unix_secs;
        self
    }

    /// Build the harness, creating and migrating a temp database.
    pub async fn build(self) -> Result<TestHarness, SmsBridgeError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SmsBridgeError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = SmsBridgeConfig::default();
        config.router.password = self.password;
        config.poller.note_policy = self.note_policy;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        storage.ensure_indexes().await?;

        let router = Arc::new(MockRouter::new());
        let clock = Arc::new(FixedClock::at_unix(self.start_unix));
        let poller = Poller::new(&config, router.clone(), storage.clone())
            .with_clock(clock.clone());

        Ok(TestHarness {
            router,
            storage,
            clock,
            poller,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete tick environment with a mock router and temp storage.
pub struct TestHarness {
    /// The scripted router.
    pub router: Arc<MockRouter>,
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Clock used for tick timestamps.
    pub clock: Arc<FixedClock>,
    /// The poller under test.
    pub poller: Poller,
    /// Effective configuration.
    pub config: SmsBridgeConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one tick.
    pub async fn tick(&self) -> TickOutcome {
        self.poller.run_tick().await
    }

    /// Everything stored so far, newest first.
    pub async fn stored_messages(&self) -> Result<Vec<StoredMessage>, SmsBridgeError> {
        self.storage.list_messages(None).await
    }
}
