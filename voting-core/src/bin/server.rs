//! Voting ledger server binary
//!
//! Serves the operation surface over stdin/stdout: one JSON request
//! per line in, one JSON response per line out. A config file path may
//! be passed as the first argument; otherwise environment variables
//! and defaults apply.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use voting_core::{Config, Dispatcher, Metrics, VotingLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting TokenVote voting server");

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    tracing::info!(
        data_dir = %config.data_dir.display(),
        service = %config.service_name,
        version = %config.service_version,
        "Configuration loaded"
    );

    // Open ledger
    let ledger = VotingLedger::open(config).await?;
    let metrics = Arc::new(Metrics::new()?);
    let dispatcher = Dispatcher::new(ledger, metrics.clone());

    tracing::info!("Voting ledger opened successfully");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }

                        let response = dispatcher.dispatch_json(line).await;
                        stdout.write_all(response.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    tracing::info!(
        transfers = metrics.transfers_total.get(),
        tokens_transferred = metrics.tokens_transferred_total.get(),
        "Shutting down voting server"
    );

    dispatcher.shutdown().await?;
    Ok(())
}
