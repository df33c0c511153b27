// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for smsbridge integration tests.
//!
//! Provides a mock router and a tick harness for fast, deterministic,
//! CI-runnable tests without a router on the network.
//!
//! # Components
//!
//! - [`MockRouter`] - Router client with scripted logins and listings
//! - [`FixedClock`] - Clock that only moves when told to
//! - [`TestHarness`] - Poller wired to the mock router and a temp SQLite database

pub mod clock;
pub mod harness;
pub mod mock_router;

pub use clock::FixedClock;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_router::{MOCK_SESSION, MockRouter, sms_entry};
