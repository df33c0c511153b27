// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the smsbridge poller.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Deserializer, Serialize};
use smsbridge_core::NotePolicy;

/// Top-level smsbridge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsBridgeConfig {
    /// Process-level settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Polling schedule and normalization policy.
    #[serde(default)]
    pub poller: PollerConfig,

    /// Router web UI connection settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollerConfig {
    /// Milliseconds between tick starts. A tick that runs longer delays the next one.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Which note of a phone entry becomes that sender's message.
    #[serde(default)]
    pub note_policy: NotePolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            note_policy: NotePolicy::default(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

/// Router web UI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Scheme and host of the router UI, without a trailing path.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login user name.
    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext admin password. Usually supplied via `SMSBRIDGE_ROUTER_PASSWORD`.
    /// Numbers and booleans are taken as their text.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub password: Option<String>,

    /// WHATWG encoding label used to decode the SMS listing
    /// (firmware locale dependent: "utf-8", "latin1", "gbk", ...).
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// `pageSizes` query parameter of the listing request.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// User-Agent header sent with the listing request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds. `None` keeps the HTTP client's default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            password: None,
            encoding: default_encoding(),
            page_size: default_page_size(),
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://192.168.1.5".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_page_size() -> u32 {
    200
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("smsbridge").join("smsbridge.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("smsbridge.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}
