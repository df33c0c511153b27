// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-period driver for a [`TickRunner`].
//!
//! Ticks run inline in the scheduling loop, so at most one is in flight. A tick
//! that outlasts the period pushes the next one back instead of overlapping it.

use std::time::Duration;

use smsbridge_config::model::PollerConfig;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::poller::TickRunner;

/// Totals reported when the scheduler stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Ticks that ran to an outcome.
    pub ticks: u64,
    /// Of those, ticks that aborted.
    pub failures: u64,
}

/// Runs ticks every `period` until cancelled.
#[derive(Debug, Clone)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick immediately, then once per period, until `cancel` fires.
    ///
    /// Cancellation also interrupts a tick in flight; that tick is not counted.
    pub async fn run(&self, runner: &dyn TickRunner, cancel: CancellationToken) -> SchedulerStats {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats = SchedulerStats::default();

        info!(period_ms = self.period.as_millis() as u64, "poll scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("shutdown requested mid-tick, abandoning it");
                    break;
                }
                outcome = runner.run_tick() => {
                    stats.ticks += 1;
                    if !outcome.is_success() {
                        stats.failures += 1;
                    }
                }
            }
        }

        info!(ticks = stats.ticks, failures = stats.failures, "poll scheduler stopped");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use smsbridge_core::SmsBridgeError;

    use crate::poller::{TickFailure, TickOutcome, TickStage, TickSummary};

    /// Runner that takes `work` of (virtual) time per tick and fails every
    /// `fail_every`-th tick.
    #[derive(Default)]
    struct FakeRunner {
        work: Duration,
        fail_every: Option<u64>,
        started: AtomicU64,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        start_times: std::sync::Mutex<Vec<tokio::time::Instant>>,
    }

    #[async_trait]
    impl TickRunner for FakeRunner {
        async fn run_tick(&self) -> TickOutcome {
            let tick = self.started.fetch_add(1, Ordering::SeqCst) + 1;
            self.start_times.lock().unwrap().push(tokio::time::Instant::now());
            let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

            tokio::time::sleep(self.work).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let result = match self.fail_every {
                Some(n) if tick % n == 0 => Err(TickFailure {
                    stage: TickStage::Fetching,
                    error: SmsBridgeError::Transport {
                        message: "connection refused".into(),
                        source: None,
                    },
                }),
                _ => Ok(TickSummary::default()),
            };
            TickOutcome {
                tick,
                started_at: Utc::now(),
                finished_at: Utc::now(),
                result,
            }
        }
    }

    async fn run_for(runner: Arc<FakeRunner>, period_ms: u64, total_ms: u64) -> SchedulerStats {
        let cancel = CancellationToken::new();
        let scheduler = Scheduler::new(Duration::from_millis(period_ms));
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move { scheduler.run(runner.as_ref(), cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(total_ms)).await;
        cancel.cancel();
        handle.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate_then_every_period() {
        let runner = Arc::new(FakeRunner::default());
        let stats = run_for(runner.clone(), 1000, 3500).await;

        // Ticks at 0, 1000, 2000 and 3000 ms.
        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.failures, 0);

        let starts = runner.start_times.lock().unwrap().clone();
        let gaps: Vec<u128> = starts.windows(2).map(|w| (w[1] - w[0]).as_millis()).collect();
        assert_eq!(gaps, vec![1000, 1000, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_ticks_never_overlap() {
        let runner = Arc::new(FakeRunner {
            work: Duration::from_millis(2500),
            ..FakeRunner::default()
        });
        run_for(runner.clone(), 1000, 6000).await;

        assert_eq!(runner.max_in_flight.load(Ordering::SeqCst), 1);
        // Starts at 0, 2500 and 5000 ms; the third is cut off by cancellation.
        assert_eq!(runner.started.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_counted_and_do_not_stop_the_loop() {
        let runner = Arc::new(FakeRunner {
            fail_every: Some(2),
            ..FakeRunner::default()
        });
        let stats = run_for(runner, 1000, 4500).await;
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_runs_no_tick() {
        let runner = FakeRunner::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let stats = Scheduler::new(Duration::from_millis(1000))
            .run(&runner, cancel)
            .await;
        assert_eq!(stats, SchedulerStats::default());
        assert_eq!(runner.started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn period_comes_from_config() {
        let scheduler = Scheduler::from_config(&PollerConfig {
            interval_ms: 250,
            ..PollerConfig::default()
        });
        assert_eq!(scheduler.period(), Duration::from_millis(250));
    }
}
