//! Dashboard backend integration.
//!
//! This module describes the backend's HTTP endpoints and their response
//! shapes, provides the HTTP client used by pollers and one-shot actions, and
//! subscribes to the market ticker WebSocket.

mod client;
mod endpoints;
mod stream;

pub use client::{ApiClient, ApiClientBuilder};
pub use endpoints::Endpoint;
pub use stream::{TickerStream, parse_tickers};

#[cfg(test)]
pub(crate) use client::test_server;
