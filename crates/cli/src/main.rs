// SPDX-License-Identifier: MIT

//! clai - manual control client for the `claid` daemon.
//!
//! Grounded on the teacher's `oj` CLI (`clap::Parser` top-level command,
//! `DaemonClient` dialing the same socket the daemon binds), reduced to
//! `ping`/`status`/`shutdown` per this crate's scope: a smoke-testing and
//! operability surface, not the full shell-integration command set.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;

use clap::{Parser, Subcommand};

use crate::client::{ClientError, DaemonClient};

#[derive(Parser)]
#[command(name = "clai", version, about = "Manual control client for the clai daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the daemon is reachable
    Ping,
    /// Print daemon version, active session count, and uptime
    Status,
    /// Request a graceful daemon shutdown
    Shutdown,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), ClientError> {
    let client = DaemonClient::connect()?;
    match command {
        Commands::Ping => {
            client.ping().await?;
            println!("pong");
        }
        Commands::Status => {
            let (version, active_sessions, uptime_secs, commands_logged) = client.status().await?;
            println!("version: {version}");
            println!("active sessions: {active_sessions}");
            println!("uptime: {uptime_secs}s");
            println!("commands logged: {commands_logged}");
        }
        Commands::Shutdown => {
            client.shutdown().await?;
            println!("shutdown requested");
        }
    }
    Ok(())
}
