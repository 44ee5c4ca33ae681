mod client;
mod reading;

pub use client::*;
pub use reading::*;
