// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock router client for deterministic tick tests.
//!
//! `MockRouter` implements `RouterClient` with scripted login results and
//! listings, so tick tests run without a router or an HTTP server.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use smsbridge_core::{
    AdapterType, Credentials, HealthStatus, PluginAdapter, RawSmsEntry, RouterClient,
    SessionCookie, SmsBridgeError, SmsNote,
};

/// Cookie returned by a scripted successful login.
pub const MOCK_SESSION: &str = "session=mock";

/// A mock router that replays scripted results.
///
/// Login results and listings are popped from FIFO queues. An empty login
/// queue logs in successfully; an empty listing queue returns no entries.
pub struct MockRouter {
    logins: Arc<Mutex<VecDeque<Result<SessionCookie, SmsBridgeError>>>>,
    listings: Arc<Mutex<VecDeque<Result<Vec<RawSmsEntry>, SmsBridgeError>>>>,
    login_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    last_username: Mutex<Option<String>>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self {
            logins: Arc::new(Mutex::new(VecDeque::new())),
            listings: Arc::new(Mutex::new(VecDeque::new())),
            login_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_username: Mutex::new(None),
        }
    }

    /// Queue a listing for the next fetch.
    pub async fn push_listing(&self, entries: Vec<RawSmsEntry>) {
        self.listings.lock().await.push_back(Ok(entries));
    }

    /// Queue a failed fetch.
    pub async fn push_fetch_error(&self, error: SmsBridgeError) {
        self.listings.lock().await.push_back(Err(error));
    }

    /// Queue a rejected login, as the router does for `errCode != 0`.
    pub async fn push_login_rejection(&self) {
        self.logins.lock().await.push_back(Err(SmsBridgeError::Auth {
            message: "router rejected login (errCode 1)".to_string(),
        }));
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Username of the most recent login attempt.
    pub async fn last_username(&self) -> Option<String> {
        self.last_username.lock().await.clone()
    }
}

impl Default for MockRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a raw phone entry from `(content, unix seconds)` pairs.
pub fn sms_entry(phone: &str, notes: &[(&str, i64)]) -> RawSmsEntry {
    RawSmsEntry {
        phone: phone.to_string(),
        note: notes
            .iter()
            .map(|(content, secs)| SmsNote::at_unix(*content, *secs))
            .collect(),
    }
}

#[async_trait]
impl PluginAdapter for MockRouter {
    fn name(&self) -> &str {
        "mock-router"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
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
impl RouterClient for MockRouter {
    async fn login(&self, credentials: &Credentials) -> Result<SessionCookie, SmsBridgeError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_username.lock().await = Some(credentials.username.clone());
        self.logins
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(SessionCookie::new(MOCK_SESSION)))
    }

    async fn fetch_sms_list(
        &self,
        _session: &SessionCookie,
    ) -> Result<Vec<RawSmsEntry>, SmsBridgeError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.listings
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
