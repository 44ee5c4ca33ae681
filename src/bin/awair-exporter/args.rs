use clap::Parser;

#[derive(Debug, Parser)]
#[command(about = "Polls Awair devices and exposes their readings as Prometheus metrics")]
pub struct Args {
    /// Listen address, as an IP or a host name
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0")]
    pub listen: String,

    #[arg(long, env = "LISTEN_PORT", default_value_t = 2112)]
    pub port: u16,

    /// Comma-separated list of Awair air-data URLs
    #[arg(
        long,
        alias = "awair_addresses",
        env = "AWAIR_ADDRESSES",
        value_delimiter = ',',
        default_value = "http://localhost/air-data/latest"
    )]
    pub awair_addresses: Vec<String>,

    /// Time to wait between polling cycles, e.g. 30s or 1m30s
    #[arg(
        long,
        alias = "poll_frequency",
        env = "POLL_FREQUENCY",
        default_value = "30s"
    )]
    pub poll_frequency: String,

    /// Per-request timeout for device requests; unset waits indefinitely
    #[arg(long, env = "REQUEST_TIMEOUT")]
    pub request_timeout: Option<String>,
}
