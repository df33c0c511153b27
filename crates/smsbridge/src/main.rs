// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! smsbridge - polls a router's web UI for received SMS and stores new ones.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod messages;
mod poll;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// smsbridge - bridge a router's SMS inbox into a local database.
#[derive(Parser, Debug)]
#[command(name = "smsbridge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Poll the router until interrupted (default).
    Serve,
    /// Run a single tick and report its outcome.
    Poll,
    /// Print stored messages, newest first.
    Messages {
        /// Show at most this many messages.
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Check configuration, database and router reachability.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => smsbridge_config::load_and_validate_path(path),
        None => smsbridge_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            smsbridge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Poll => poll::run_poll(config).await,
        Commands::Messages { limit } => messages::run_messages(&config, limit).await,
        Commands::Doctor { plain } => doctor::run_doctor(&config, plain).await,
    };

    if let Err(e) = result {
        eprintln!("smsbridge: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["smsbridge"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn messages_accepts_limit_and_global_config() {
        let cli =
            Cli::try_parse_from(["smsbridge", "messages", "--limit", "5", "-c", "/tmp/s.toml"])
                .unwrap();
        assert_eq!(cli.command, Some(Commands::Messages { limit: Some(5) }));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn doctor_plain_flag() {
        let cli = Cli::try_parse_from(["smsbridge", "doctor", "--plain"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Doctor { plain: true }));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["smsbridge", "send"]).is_err());
    }
}
