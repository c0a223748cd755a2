#![doc = include_str!("../README.md")]

use std::sync::Arc;

use blocks_bridge::{BridgeController, BridgeSettings};
use blocks_threading::ThreadBoundRunner;
use clap::Parser;
use color_eyre::eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{
    filter::LevelFilter, prelude::__tracing_subscriber_SubscriberExt as _,
    util::SubscriberInitExt as _, EnvFilter,
};

use crate::{
    cli::Cli,
    stdio::{InputLine, StdoutOpener, StdoutSurface},
};

mod cli;
mod stdio;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG overrides the default INFO level. Logs go to stderr, stdout belongs to the surface.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = cli.bridge_settings()?;

    // The surface is pinned to this LocalSet, requests run on the runtime.
    tokio::task::LocalSet::new().run_until(run(settings)).await
}

async fn run(settings: BridgeSettings) -> Result<()> {
    let channel = settings.channel_name.clone();
    let bridge = BridgeController::with_shared_jar(
        settings,
        ThreadBoundRunner::new(StdoutSurface),
        Arc::new(StdoutOpener),
    )?;

    tracing::info!(%channel, "Bridge ready, reading messages from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let input: InputLine = match serde_json::from_str(&line) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Skipping unreadable input line: {e}");
                continue;
            }
        };

        let outcome = bridge.on_message(input.into_message(&channel));
        tracing::debug!(?outcome, "Handled message");
    }

    // Input is exhausted, let running requests deliver before stopping.
    bridge.settle().await;
    bridge.shutdown().await;
    tracing::info!("Bridge stopped");

    Ok(())
}
