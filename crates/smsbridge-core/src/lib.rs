// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the smsbridge poller.
//!
//! This crate provides the error type, the domain types that flow through a
//! tick, and the adapter traits implemented by the router client and the
//! message store.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SmsBridgeError;
pub use types::{
    AdapterType, Credentials, HealthStatus, NewMessage, NormalizedMessage, NotePolicy,
    RawSmsEntry, SessionCookie, SmsNote, StoredMessage,
};

pub use traits::{MessageStore, PluginAdapter, RouterClient};
