// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One polling tick: authenticate, fetch, normalize, persist.
//!
//! A tick either completes all four stages or stops at the first failing one.
//! Nothing carries over between ticks except what storage holds.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use strum::Display;
use tracing::{error, info, warn};

use smsbridge_config::model::{RouterConfig, SmsBridgeConfig};
use smsbridge_core::{Credentials, MessageStore, NotePolicy, RouterClient, SmsBridgeError};

use crate::normalize::normalize;
use crate::persist::persist;

/// Source of wall-clock time for tick bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Pipeline stage a tick failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TickStage {
    Authenticating,
    Fetching,
    Normalizing,
    Persisting,
}

/// Counters for a completed tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Phone entries in the router listing.
    pub fetched: usize,
    /// Distinct senders after normalization.
    pub normalized: usize,
    /// Ids of records inserted this tick.
    pub inserted: Vec<String>,
    /// Messages already stored.
    pub skipped: usize,
}

/// Why a tick stopped early.
#[derive(Debug)]
pub struct TickFailure {
    pub stage: TickStage,
    pub error: SmsBridgeError,
}

impl TickFailure {
    fn at(stage: TickStage) -> impl FnOnce(SmsBridgeError) -> Self {
        move |error| Self { stage, error }
    }
}

/// Result and timing of a single tick.
#[derive(Debug)]
pub struct TickOutcome {
    /// 1-based tick number for this poller.
    pub tick: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub result: Result<TickSummary, TickFailure>,
}

impl TickOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Anything the scheduler can drive.
#[async_trait]
pub trait TickRunner: Send + Sync {
    async fn run_tick(&self) -> TickOutcome;
}

/// Runs ticks against one router and one message store.
pub struct Poller {
    router: Arc<dyn RouterClient>,
    store: Arc<dyn MessageStore>,
    router_config: RouterConfig,
    note_policy: NotePolicy,
    clock: Arc<dyn Clock>,
    ticks: AtomicU64,
}

impl Poller {
    pub fn new(
        config: &SmsBridgeConfig,
        router: Arc<dyn RouterClient>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            router,
            store,
            router_config: config.router.clone(),
            note_policy: config.poller.note_policy,
            clock: Arc::new(SystemClock),
            ticks: AtomicU64::new(0),
        }
    }

    /// Replace the clock used for tick timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of ticks started so far.
    pub fn ticks_started(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn credentials(&self) -> Result<Credentials, SmsBridgeError> {
        let password = self.router_config.password.as_deref().ok_or_else(|| {
            SmsBridgeError::Config(
                "router password is not set (router.password or SMSBRIDGE_ROUTER_PASSWORD)"
                    .to_string(),
            )
        })?;
        Ok(Credentials::new(self.router_config.username.as_str(), password))
    }

    async fn execute(&self) -> Result<TickSummary, TickFailure> {
        let credentials = self
            .credentials()
            .map_err(TickFailure::at(TickStage::Authenticating))?;
        let session = self
            .router
            .login(&credentials)
            .await
            .map_err(TickFailure::at(TickStage::Authenticating))?;

        let entries = self
            .router
            .fetch_sms_list(&session)
            .await
            .map_err(TickFailure::at(TickStage::Fetching))?;

        let listing = normalize(&entries, self.note_policy);

        let report = persist(self.store.as_ref(), &listing)
            .await
            .map_err(TickFailure::at(TickStage::Persisting))?;

        Ok(TickSummary {
            fetched: entries.len(),
            normalized: listing.len(),
            inserted: report.inserted,
            skipped: report.skipped,
        })
    }
}

#[async_trait]
impl TickRunner for Poller {
    async fn run_tick(&self) -> TickOutcome {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let started_at = self.clock.now();
        let result = self.execute().await;
        let finished_at = self.clock.now();
        let elapsed_ms = (finished_at - started_at).num_milliseconds();

        match &result {
            Ok(summary) => info!(
                tick,
                fetched = summary.fetched,
                normalized = summary.normalized,
                inserted = summary.inserted.len(),
                skipped = summary.skipped,
                elapsed_ms,
                "tick complete"
            ),
            Err(TickFailure { stage, error }) => match error {
                SmsBridgeError::Auth { .. }
                | SmsBridgeError::Transport { .. }
                | SmsBridgeError::Parse { .. } => warn!(
                    tick,
                    %stage,
                    kind = error.kind(),
                    error = %error,
                    elapsed_ms,
                    "tick aborted"
                ),
                _ => error!(
                    tick,
                    %stage,
                    kind = error.kind(),
                    error = %error,
                    elapsed_ms,
                    "tick aborted"
                ),
            },
        }

        TickOutcome {
            tick,
            started_at,
            finished_at,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use smsbridge_config::model::StorageConfig;
    use smsbridge_core::{
        AdapterType, HealthStatus, PluginAdapter, RawSmsEntry, SessionCookie, SmsNote,
    };
    use smsbridge_storage::SqliteStorage;
    use tempfile::TempDir;

    /// Router double: a fixed login answer and a queue of listings.
    struct ScriptedRouter {
        login_ok: bool,
        listings: Mutex<VecDeque<Result<Vec<RawSmsEntry>, SmsBridgeError>>>,
        fetches: AtomicU64,
    }

    impl ScriptedRouter {
        fn new(login_ok: bool, listings: Vec<Result<Vec<RawSmsEntry>, SmsBridgeError>>) -> Self {
            Self {
                login_ok,
                listings: Mutex::new(listings.into()),
                fetches: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl PluginAdapter for ScriptedRouter {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Router
        }
        async fn health_check(&self) -> Result<HealthStatus, SmsBridgeError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), SmsBridgeError> {
            Ok(())
        }
    }

    #[async_trait]
    impl RouterClient for ScriptedRouter {
        async fn login(&self, _credentials: &Credentials) -> Result<SessionCookie, SmsBridgeError> {
            if self.login_ok {
                Ok(SessionCookie::new("a=1"))
            } else {
                Err(SmsBridgeError::Auth {
                    message: "router rejected login (errCode 1)".into(),
                })
            }
        }

        async fn fetch_sms_list(
            &self,
            _session: &SessionCookie,
        ) -> Result<Vec<RawSmsEntry>, SmsBridgeError> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            self.listings
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct StoppedClock(DateTime<Utc>);

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn sample_listing() -> Vec<RawSmsEntry> {
        vec![RawSmsEntry {
            phone: "+33612345678".into(),
            note: vec![SmsNote::at_unix("hi", 1000)],
        }]
    }

    fn config(password: Option<&str>) -> SmsBridgeConfig {
        let mut config = SmsBridgeConfig::default();
        config.router.password = password.map(str::to_string);
        config
    }

    async fn store() -> (Arc<SqliteStorage>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("tick.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (Arc::new(storage), dir)
    }

    #[tokio::test]
    async fn successful_tick_reports_counts() {
        let (store, _dir) = store().await;
        let router = Arc::new(ScriptedRouter::new(true, vec![Ok(sample_listing())]));
        let now = DateTime::from_timestamp(5000, 0).unwrap();
        let poller = Poller::new(&config(Some("secret")), router, store.clone())
            .with_clock(Arc::new(StoppedClock(now)));

        let outcome = poller.run_tick().await;
        assert_eq!(outcome.tick, 1);
        assert_eq!(outcome.started_at, now);
        assert_eq!(outcome.finished_at, now);
        let summary = outcome.result.unwrap();
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.normalized, 1);
        assert_eq!(summary.inserted.len(), 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(store.count_messages().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejected_login_aborts_before_fetch() {
        let (store, _dir) = store().await;
        let router = Arc::new(ScriptedRouter::new(false, vec![Ok(sample_listing())]));
        let poller = Poller::new(&config(Some("secret")), router.clone(), store.clone());

        let outcome = poller.run_tick().await;
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.stage, TickStage::Authenticating);
        assert!(matches!(failure.error, SmsBridgeError::Auth { .. }));
        assert_eq!(router.fetches.load(Ordering::Relaxed), 0);
        assert_eq!(store.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_password_is_config_failure() {
        let (store, _dir) = store().await;
        let router = Arc::new(ScriptedRouter::new(true, vec![]));
        let poller = Poller::new(&config(None), router.clone(), store);

        let failure = poller.run_tick().await.result.unwrap_err();
        assert_eq!(failure.stage, TickStage::Authenticating);
        assert!(matches!(failure.error, SmsBridgeError::Config(_)));
        assert_eq!(router.fetches.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_reported_at_fetching() {
        let (store, _dir) = store().await;
        let parse_error = SmsBridgeError::Parse {
            message: "listing is not valid JSON".into(),
            preview: "<html>".into(),
            source: None,
        };
        let router = Arc::new(ScriptedRouter::new(true, vec![Err(parse_error)]));
        let poller = Poller::new(&config(Some("secret")), router, store);

        let failure = poller.run_tick().await.result.unwrap_err();
        assert_eq!(failure.stage, TickStage::Fetching);
        assert_eq!(failure.stage.to_string(), "fetching");
    }

    #[tokio::test]
    async fn repeated_listing_is_stored_once_and_ticks_are_numbered() {
        let (store, _dir) = store().await;
        let router = Arc::new(ScriptedRouter::new(
            true,
            vec![Ok(sample_listing()), Ok(sample_listing())],
        ));
        let poller = Poller::new(&config(Some("secret")), router, store.clone());

        let first = poller.run_tick().await;
        let second = poller.run_tick().await;
        assert_eq!((first.tick, second.tick), (1, 2));
        assert_eq!(second.result.unwrap().skipped, 1);
        assert_eq!(store.count_messages().await.unwrap(), 1);
        assert_eq!(poller.ticks_started(), 2);
    }
}
