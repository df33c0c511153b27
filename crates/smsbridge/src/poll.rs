// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smsbridge poll` command implementation: exactly one tick.

use std::sync::Arc;

use smsbridge_config::model::SmsBridgeConfig;
use smsbridge_core::{MessageStore, SmsBridgeError};
use smsbridge_poller::{Poller, TickOutcome, TickRunner};
use smsbridge_router::RouterHttpClient;

use crate::serve::{init_tracing, open_storage};

/// Run one tick, print its outcome, and fail if it aborted.
pub async fn run_poll(config: SmsBridgeConfig) -> Result<(), SmsBridgeError> {
    init_tracing(&config.daemon.log_level);

    let storage = open_storage(&config).await?;
    let router = Arc::new(RouterHttpClient::new(&config.router)?);
    let poller = Poller::new(&config, router, storage.clone());

    let outcome = poller.run_tick().await;
    println!("{}", describe_outcome(&outcome));
    storage.close().await?;

    outcome.result.map(|_| ()).map_err(|failure| failure.error)
}

/// One-line human summary of a tick.
fn describe_outcome(outcome: &TickOutcome) -> String {
    let elapsed_ms = (outcome.finished_at - outcome.started_at).num_milliseconds();
    match &outcome.result {
        Ok(summary) => format!(
            "tick {}: {} entries fetched, {} senders, {} new, {} already stored ({elapsed_ms}ms)",
            outcome.tick,
            summary.fetched,
            summary.normalized,
            summary.inserted.len(),
            summary.skipped,
        ),
        Err(failure) => format!(
            "tick {} aborted while {}: {} ({elapsed_ms}ms)",
            outcome.tick, failure.stage, failure.error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use smsbridge_poller::{TickFailure, TickStage, TickSummary};

    fn outcome(result: Result<TickSummary, TickFailure>) -> TickOutcome {
        TickOutcome {
            tick: 3,
            started_at: DateTime::from_timestamp_millis(1_000).unwrap(),
            finished_at: DateTime::from_timestamp_millis(1_250).unwrap(),
            result,
        }
    }

    #[test]
    fn describes_success() {
        let line = describe_outcome(&outcome(Ok(TickSummary {
            fetched: 4,
            normalized: 3,
            inserted: vec!["a".into()],
            skipped: 2,
        })));
        assert_eq!(
            line,
            "tick 3: 4 entries fetched, 3 senders, 1 new, 2 already stored (250ms)"
        );
    }

    #[test]
    fn describes_failure_with_stage() {
        let line = describe_outcome(&outcome(Err(TickFailure {
            stage: TickStage::Authenticating,
            error: SmsBridgeError::Auth {
                message: "router rejected login (errCode 1)".into(),
            },
        })));
        assert_eq!(
            line,
            "tick 3 aborted while authenticating: authentication failed: router rejected login (errCode 1) (250ms)"
        );
    }
}
