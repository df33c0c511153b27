// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smsbridge serve` command implementation.
//!
//! Opens storage, builds the router client and the poller, then ticks on the
//! configured period until SIGINT/SIGTERM.

use std::sync::Arc;

use smsbridge_config::model::SmsBridgeConfig;
use smsbridge_core::{MessageStore, SmsBridgeError};
use smsbridge_poller::{Poller, Scheduler, install_signal_handler};
use smsbridge_router::RouterHttpClient;
use smsbridge_storage::SqliteStorage;
use tracing::{info, warn};

/// Run the `smsbridge serve` command.
pub async fn run_serve(config: SmsBridgeConfig) -> Result<(), SmsBridgeError> {
    init_tracing(&config.daemon.log_level);

    info!(
        router = %config.router.base_url,
        interval_ms = config.poller.interval_ms,
        note_policy = %config.poller.note_policy,
        database = %config.storage.database_path,
        "starting smsbridge"
    );
    if config.router.password.is_none() {
        warn!("router password is not configured; every tick will fail until it is set");
    }

    let storage = open_storage(&config).await?;
    let router = Arc::new(RouterHttpClient::new(&config.router)?);
    let poller = Poller::new(&config, router, storage.clone());

    let cancel = install_signal_handler();
    let stats = Scheduler::from_config(&config.poller)
        .run(&poller, cancel)
        .await;

    info!(ticks = stats.ticks, failures = stats.failures, "shutting down");
    storage.close().await?;
    info!("smsbridge stopped");
    Ok(())
}

/// Open and migrate the message store, then create the lookup index.
///
/// A failed index creation is logged and otherwise ignored: lookups still
/// work, only slower.
pub(crate) async fn open_storage(
    config: &SmsBridgeConfig,
) -> Result<Arc<SqliteStorage>, SmsBridgeError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    match storage.ensure_indexes().await {
        Ok(()) => info!("message indexes ready"),
        Err(e) => warn!(error = %e, "failed to create message indexes, continuing without them"),
    }

    Ok(Arc::new(storage))
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over `daemon.log_level`.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "smsbridge={log_level},smsbridge_poller={log_level},smsbridge_router={log_level},smsbridge_storage={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsbridge_config::model::StorageConfig;

    #[tokio::test]
    async fn open_storage_creates_database_with_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let config = SmsBridgeConfig {
            storage: StorageConfig {
                database_path: dir.path().join("serve.db").to_string_lossy().into_owned(),
                wal_mode: true,
            },
            ..SmsBridgeConfig::default()
        };

        let storage = open_storage(&config).await.unwrap();
        assert_eq!(storage.count_messages().await.unwrap(), 0);
        storage.close().await.unwrap();
    }
}
