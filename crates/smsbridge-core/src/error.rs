// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the smsbridge poller.

use thiserror::Error;

/// The primary error type used across all smsbridge adapter traits and tick stages.
///
/// Every variant is tick-scoped: the scheduler logs it and the next tick starts
/// from scratch.
#[derive(Debug, Error)]
pub enum SmsBridgeError {
    /// Configuration errors (invalid TOML, missing password, unknown encoding).
    #[error("configuration error: {0}")]
    Config(String),

    /// The router rejected the login or answered with something unusable.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Network-level failure talking to the router.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A router payload could not be parsed. `preview` holds the start of the
    /// offending text for diagnosis.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        preview: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SmsBridgeError {
    /// Short machine-friendly label for the variant, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth { .. } => "auth",
            Self::Transport { .. } => "transport",
            Self::Parse { .. } => "parse",
            Self::Storage { .. } => "storage",
            Self::Internal(_) => "internal",
        }
    }
}
