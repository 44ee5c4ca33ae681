mod args;

use std::{future::pending, process::ExitCode, sync::Arc};

use anyhow::{Context as _, Result};
use args::Args;
use awair_exporter::{
    duration::parse_duration,
    metrics::AwairMetrics,
    poller::{Poller, PollerConfig},
    server::{bind, router, serve},
};
use clap::Parser as _;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("awair_exporter=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let interval = parse_duration(&args.poll_frequency).with_context(|| {
        format!(
            "couldn't parse duration from poll_frequency ({})",
            args.poll_frequency
        )
    })?;

    let request_timeout = args
        .request_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .context("couldn't parse duration from request_timeout")?;

    let metrics = Arc::new(AwairMetrics::new().context("failed to initialize metrics")?);

    let poller = Poller::new(
        PollerConfig {
            addresses: args.awair_addresses.clone(),
            interval,
            request_timeout,
        },
        Arc::clone(&metrics),
    )
    .context("failed to create poller")?;

    let listener = bind(&args.listen, args.port).await?;
    let listen = listener
        .local_addr()
        .context("failed to read listen address")?;

    let poller = poller.spawn();

    tracing::info!(
        %listen,
        addresses = ?args.awair_addresses,
        ?interval,
        "Awair poller started"
    );

    let served = serve(listener, router(metrics), shutdown_signal()).await;

    poller
        .shutdown()
        .await
        .context("failed to stop poller")?;

    served
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(e) => {
            tracing::error!("failed to listen for shutdown signal: {e}");
            pending::<()>().await;
        }
    }
}
