// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smsbridge doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the message database
//! and the router to find out why ticks fail.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use smsbridge_config::model::{RouterConfig, SmsBridgeConfig, StorageConfig};
use smsbridge_core::{
    Credentials, HealthStatus, MessageStore, PluginAdapter, RouterClient, SmsBridgeError,
};
use smsbridge_router::RouterHttpClient;
use smsbridge_storage::SqliteStorage;

/// Timeout for doctor's router requests when none is configured.
const DOCTOR_TIMEOUT_SECS: u64 = 5;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `smsbridge doctor` command.
///
/// Configuration was already loaded and validated by the caller, so the
/// config check only looks for settings that validate but cannot work.
pub async fn run_doctor(config: &SmsBridgeConfig, plain: bool) -> Result<(), SmsBridgeError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config),
        check_database(&config.storage).await,
        check_router_reachable(&config.router).await,
        check_router_login(&config.router).await,
    ];

    println!();
    println!("  smsbridge doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

fn check_config(config: &SmsBridgeConfig) -> CheckResult {
    let start = Instant::now();
    if config.router.password.is_none() {
        return CheckResult::new(
            "Configuration",
            CheckStatus::Warn,
            "router.password is not set (SMSBRIDGE_ROUTER_PASSWORD)",
            start,
        );
    }
    CheckResult::new("Configuration", CheckStatus::Pass, "valid", start)
}

/// Check the database opens, migrates and answers queries.
async fn check_database(config: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    if !Path::new(&config.database_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!(
                "not found: {} (will be created on first run)",
                config.database_path
            ),
            start,
        );
    }

    let storage = SqliteStorage::new(config.clone());
    let probe = async {
        storage.initialize().await?;
        let health = storage.health_check().await?;
        let count = storage.count_messages().await?;
        storage.close().await?;
        Ok::<_, SmsBridgeError>((health, count))
    };

    match probe.await {
        Ok((HealthStatus::Healthy, count)) => CheckResult::new(
            "Database",
            CheckStatus::Pass,
            format!("connected, {count} message(s) stored"),
            start,
        ),
        Ok((HealthStatus::Degraded(reason), _)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok((HealthStatus::Unhealthy(reason), _)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    }
}

fn doctor_client(config: &RouterConfig) -> Result<RouterHttpClient, SmsBridgeError> {
    let mut config = config.clone();
    config.request_timeout_secs = config.request_timeout_secs.or(Some(DOCTOR_TIMEOUT_SECS));
    RouterHttpClient::new(&config)
}

async fn check_router_reachable(config: &RouterConfig) -> CheckResult {
    let start = Instant::now();
    let client = match doctor_client(config) {
        Ok(client) => client,
        Err(e) => return CheckResult::new("Router", CheckStatus::Fail, e.to_string(), start),
    };

    match client.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Router",
            CheckStatus::Pass,
            format!("reachable at {}", client.base_url()),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Router", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Router", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Router", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Attempt a real login. Only cookie names are reported.
async fn check_router_login(config: &RouterConfig) -> CheckResult {
    let start = Instant::now();
    let Some(password) = config.password.as_deref() else {
        return CheckResult::new("Router login", CheckStatus::Warn, "skipped: no password", start);
    };

    let client = match doctor_client(config) {
        Ok(client) => client,
        Err(e) => {
            return CheckResult::new("Router login", CheckStatus::Fail, e.to_string(), start);
        }
    };

    let credentials = Credentials::new(config.username.as_str(), password);
    match client.login(&credentials).await {
        Ok(session) => CheckResult::new(
            "Router login",
            CheckStatus::Pass,
            format!("accepted (cookies: {})", session.names().join(", ")),
            start,
        ),
        Err(e) => CheckResult::new("Router login", CheckStatus::Fail, e.to_string(), start),
    }
}
