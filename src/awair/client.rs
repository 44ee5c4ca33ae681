use std::time::Duration;

use anyhow::{Context as _, Result};
use reqwest::Client;

use crate::awair::Reading;

#[derive(Debug, Clone)]
pub struct AwairClient {
    http: Client,
}

impl AwairClient {
    /// `request_timeout` of `None` lets a request wait on the device indefinitely.
    pub fn new(request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self { http })
    }

    pub async fn fetch_reading(&self, address: &str) -> Result<Reading> {
        let response = self
            .http
            .get(address)
            .send()
            .await
            .with_context(|| format!("failed to GET from Awair address: {address}"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                device_address = %address,
                %status,
                "Awair device answered with a non-success status"
            );
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body from Awair address: {address}"))?;

        Reading::from_slice(&body)
            .with_context(|| format!("failed to decode body from Awair address: {address}"))
    }
}
