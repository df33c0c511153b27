// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, known text encodings and non-zero intervals.

use crate::diagnostic::ConfigError;
use crate::model::SmsBridgeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
///
/// A missing router password is not an error here: it is resolved per tick, so
/// the daemon can start and report the problem on every tick instead.
pub fn validate_config(config: &SmsBridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let base_url = config.router.base_url.trim();
    if base_url.is_empty() {
        fail("router.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "router.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.router.username.trim().is_empty() {
        fail("router.username must not be empty".to_string());
    }

    if let Some(password) = &config.router.password
        && password.is_empty()
    {
        fail("router.password must not be empty when set".to_string());
    }

    if encoding_rs::Encoding::for_label(config.router.encoding.trim().as_bytes()).is_none() {
        fail(format!(
            "router.encoding `{}` is not a known text encoding label",
            config.router.encoding
        ));
    }

    if config.router.page_size == 0 {
        fail("router.page_size must be at least 1".to_string());
    }

    if config.router.request_timeout_secs == Some(0) {
        fail("router.request_timeout_secs must be at least 1 when set".to_string());
    }

    if config.poller.interval_ms == 0 {
        fail("poller.interval_ms must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
