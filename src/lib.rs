//! # MarketDeck - crypto market dashboard for the terminal
//!
//! A terminal dashboard over a market-analysis backend: price predictions,
//! trading signals, alerts, an economic calendar, a portfolio, news, and a
//! DEX token swap through an injected wallet. Built with ratatui.
//!
//! ## Architecture
//!
//! - **Poller**: one per data domain, refreshing on a fixed interval and
//!   publishing [`poller::PollResult`] snapshots
//! - **API**: endpoint descriptors, HTTP client and the ticker WebSocket
//! - **Analysis**: model run trigger with an estimated progress bar
//! - **Swap**: wallet capability, router calldata and the swap state machine
//! - **State**: centralized store with an action reducer
//! - **UI/Events**: rendering and key handling
//! - **Config**: configuration management

pub mod analysis;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod poller;
pub mod state;
pub mod swap;
pub mod transform;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
