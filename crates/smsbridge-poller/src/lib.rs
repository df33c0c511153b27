// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling pipeline for smsbridge.
//!
//! A [`Poller`] runs one tick: log in, fetch the inbox listing, reduce it to
//! one message per sender, and store the messages not seen before with a
//! masked sender number. The [`Scheduler`] repeats ticks on a fixed period
//! until shutdown.

pub mod mask;
pub mod normalize;
pub mod persist;
pub mod poller;
pub mod scheduler;
pub mod shutdown;

pub use mask::mask_number;
pub use normalize::{NormalizedListing, normalize};
pub use persist::{PersistReport, persist};
pub use poller::{
    Clock, Poller, SystemClock, TickFailure, TickOutcome, TickRunner, TickStage, TickSummary,
};
pub use scheduler::{Scheduler, SchedulerStats};
pub use shutdown::install_signal_handler;
