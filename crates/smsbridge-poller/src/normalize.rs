// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reduce a raw inbox listing to at most one message per sender.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Utc};
use indexmap::IndexMap;
use smsbridge_core::{NormalizedMessage, NotePolicy, RawSmsEntry, SmsNote};
use tracing::warn;

/// Calendar years a message timestamp may fall in. Storage writes four-digit
/// RFC 3339 years and cannot read anything else back.
pub const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

/// Normalized listing keyed by phone number, in first-seen order.
pub type NormalizedListing = IndexMap<String, NormalizedMessage>;

/// Pick one note per entry and key the result by phone number.
///
/// A phone that appears more than once keeps its first position but takes the
/// value of its last occurrence. Entries without notes are skipped silently;
/// entries with an empty phone or an unrepresentable timestamp are skipped
/// with a warning.
pub fn normalize(entries: &[RawSmsEntry], policy: NotePolicy) -> NormalizedListing {
    let mut listing = NormalizedListing::with_capacity(entries.len());

    for entry in entries {
        let Some(note) = select_note(&entry.note, policy) else {
            continue;
        };

        if entry.phone.trim().is_empty() {
            warn!(content_chars = note.content.chars().count(), "skipping SMS entry without phone number");
            continue;
        }

        let Some(time) = storable_time(note.time_ms) else {
            warn!(phone = %entry.phone, time_ms = note.time_ms, "skipping SMS with out-of-range timestamp");
            continue;
        };

        listing.insert(
            entry.phone.clone(),
            NormalizedMessage {
                number: entry.phone.clone(),
                content: note.content.clone(),
                time,
            },
        );
    }

    listing
}

fn storable_time(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).filter(|time| STORABLE_YEARS.contains(&time.year()))
}

fn select_note(notes: &[SmsNote], policy: NotePolicy) -> Option<&SmsNote> {
    match policy {
        NotePolicy::FirstNote => notes.first(),
        // Strictly greater keeps the earliest index on ties.
        NotePolicy::Newest => notes
            .iter()
            .reduce(|best, note| if note.time_ms > best.time_ms { note } else { best }),
    }
}
