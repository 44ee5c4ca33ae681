use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::awair::{AwairClient, Reading};
use crate::metrics::AwairMetrics;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Polled in order once per cycle. Duplicates are polled once per occurrence.
    pub addresses: Vec<String>,

    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,

    pub request_timeout: Option<Duration>,
}

pub struct Poller {
    client: AwairClient,
    addresses: Vec<String>,
    interval: Duration,
    metrics: Arc<AwairMetrics>,
}

impl Poller {
    pub fn new(config: PollerConfig, metrics: Arc<AwairMetrics>) -> Result<Self> {
        if config.addresses.is_empty() {
            bail!("no Awair addresses configured");
        }

        if config.interval.is_zero() {
            bail!("poll interval must be positive");
        }

        let client =
            AwairClient::new(config.request_timeout).context("failed to create Awair client")?;

        Ok(Self {
            client,
            addresses: config.addresses,
            interval: config.interval,
            metrics,
        })
    }

    /// Fetches one reading and, only if it decodes, overwrites all six gauges for `address`.
    pub async fn poll_device(&self, address: &str) -> Result<Reading> {
        let reading = self.client.fetch_reading(address).await?;

        self.metrics.record(address, &reading);
        tracing::debug!(device_address = %address, ?reading, "recorded Awair reading");

        Ok(reading)
    }

    /// Polls every address once, sequentially. A failing device is logged and skipped.
    pub async fn poll_once(&self) {
        for address in &self.addresses {
            if let Err(e) = self.poll_device(address).await {
                tracing::error!(device_address = %address, "failed to poll Awair device: {e:#}");
            }
        }
    }

    /// Polls until `stop` becomes `true` or its sender is dropped.
    ///
    /// The stop signal is honoured mid-cycle as well, so a hung device cannot block shutdown.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = self.poll_once() => {}
                _ = stopped(&mut stop) => break,
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = stopped(&mut stop) => break,
            }
        }

        tracing::info!("Awair poller stopped");
    }

    pub fn spawn(self) -> PollerHandle {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));

        PollerHandle { stop, task }
    }
}

async fn stopped(stop: &mut watch::Receiver<bool>) {
    // A closed channel counts as a stop request too.
    let _ = stop.wait_for(|stop| *stop).await;
}

/// Handle to a spawned [`Poller`]. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.stop.send(true);
        self.task.await.context("poller task panicked")
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
