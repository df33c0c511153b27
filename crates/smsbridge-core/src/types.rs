// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the router client, the poller and storage.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Router,
    Storage,
}

/// Which note of a phone entry is taken as that sender's message for a tick.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotePolicy {
    /// Take `note[0]` as the router lists it, whatever its timestamp.
    #[default]
    FirstNote,
    /// Take the note with the greatest `time`; ties keep the earliest index.
    Newest,
}

/// Login credentials for the router's web UI. Built per tick, never persisted.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Cookie header value returned by a successful login.
///
/// Only valid for the tick that obtained it. `Debug` prints the cookie names,
/// never their values.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    pub fn new(header: impl Into<String>) -> Self {
        Self(header.into())
    }

    /// The raw `Cookie` header value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names of the cookies in the header, in order.
    pub fn names(&self) -> Vec<&str> {
        self.0
            .split(';')
            .filter_map(|pair| pair.split('=').next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCookie").field(&self.names()).finish()
    }
}

/// One note (SMS body) as listed by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsNote {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Milliseconds since the Unix epoch. The firmware sends seconds as a
    /// number, possibly fractional, or as a numeric string.
    #[serde(
        rename = "time",
        default,
        deserialize_with = "unix_seconds_as_millis",
        serialize_with = "millis_as_unix_seconds"
    )]
    pub time_ms: i64,
}

impl SmsNote {
    /// A note sent at whole Unix second `secs`.
    pub fn at_unix(content: impl Into<String>, secs: i64) -> Self {
        Self {
            content: content.into(),
            time_ms: secs.saturating_mul(1000),
        }
    }
}

/// One phone entry from the router's `smsList.phoneList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSmsEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: Vec<SmsNote>,
}

/// The single candidate message kept for a sender in one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub number: String,
    pub content: String,
    pub time: DateTime<Utc>,
}

/// A record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub from: String,
    pub from_safe: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

/// A persisted message record. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    pub id: String,
    pub from: String,
    pub from_safe: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UnixTime {
    Int(i64),
    Float(f64),
    Text(String),
}

fn unix_seconds_as_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let float_millis = |secs: f64| {
        if secs.is_finite() {
            // `as` saturates; out-of-range times are rejected downstream.
            Ok((secs * 1000.0).trunc() as i64)
        } else {
            Err(D::Error::custom(format!(
                "note time `{secs}` is not a finite number"
            )))
        }
    };

    match Option::<UnixTime>::deserialize(deserializer)? {
        None => Ok(0),
        Some(UnixTime::Int(secs)) => Ok(secs.saturating_mul(1000)),
        Some(UnixTime::Float(secs)) => float_millis(secs),
        Some(UnixTime::Text(text)) => {
            let trimmed = text.trim();
            match trimmed.parse::<i64>() {
                Ok(secs) => Ok(secs.saturating_mul(1000)),
                Err(_) => trimmed
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("note time `{text}` is not numeric")))
                    .and_then(float_millis),
            }
        }
    }
}

fn millis_as_unix_seconds<S>(millis: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if millis % 1000 == 0 {
        serializer.serialize_i64(millis / 1000)
    } else {
        serializer.serialize_f64(*millis as f64 / 1000.0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
