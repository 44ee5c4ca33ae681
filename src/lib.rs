pub mod awair;
pub mod duration;
pub mod metrics;
pub mod poller;
pub mod server;
