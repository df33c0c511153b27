// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router web UI client for smsbridge.
//!
//! Implements [`smsbridge_core::RouterClient`] over HTTP: an MD5-hashed
//! JSON login that yields a cookie header, followed by a listing request
//! whose body is decoded with the router's configured text encoding.

pub mod auth;
pub mod client;
pub mod listing;

pub use client::RouterHttpClient;
