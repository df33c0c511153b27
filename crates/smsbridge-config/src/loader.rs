// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./smsbridge.toml` > `~/.config/smsbridge/smsbridge.toml`
//! > `/etc/smsbridge/smsbridge.toml` with environment variable overrides via the
//! `SMSBRIDGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SmsBridgeConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/smsbridge/smsbridge.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "smsbridge.toml";

/// Environment variable holding the router password. Read verbatim, never
/// parsed as structured data, so `0000` stays `"0000"`.
pub const PASSWORD_ENV: &str = "SMSBRIDGE_ROUTER_PASSWORD";

/// The per-user configuration file under the XDG config directory, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smsbridge").join("smsbridge.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/smsbridge/smsbridge.toml` (system-wide)
/// 3. `~/.config/smsbridge/smsbridge.toml` (user XDG config)
/// 4. `./smsbridge.toml` (local directory)
/// 5. `SMSBRIDGE_*` environment variables
pub fn load_config() -> Result<SmsBridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SmsBridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SmsBridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SmsBridgeConfig, figment::Error> {
    merge_env(
        Figment::new()
            .merge(Serialized::defaults(SmsBridgeConfig::default()))
            .merge(Toml::file(path)),
    )
    .extract()
}

/// Build the Figment used for config loading before extraction.
pub fn build_figment() -> Figment {
    merge_env(
        Figment::new()
            .merge(Serialized::defaults(SmsBridgeConfig::default()))
            .merge(Toml::file(SYSTEM_CONFIG_PATH))
            .merge(Toml::file(user_config_path().unwrap_or_default()))
            .merge(Toml::file(LOCAL_CONFIG_PATH)),
    )
}

/// Layer the `SMSBRIDGE_*` overrides on top of `figment`.
fn merge_env(figment: Figment) -> Figment {
    let figment = figment.merge(env_provider());
    match Env::var(PASSWORD_ENV) {
        Some(password) => figment.merge(Serialized::default("router.password", password)),
        None => figment,
    }
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` and not `Env::split("_")` because key names contain
/// underscores: `SMSBRIDGE_ROUTER_PAGE_SIZE` must map to `router.page_size`,
/// not `router.page.size`.
///
/// The password is excluded here; [`merge_env`] adds it as a plain string.
fn env_provider() -> Env {
    Env::prefixed("SMSBRIDGE_")
        .filter(|key| !key.as_str().eq_ignore_ascii_case("router_password"))
        .map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name, in any case, to its dotted config key.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["daemon", "poller", "router", "storage"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}
