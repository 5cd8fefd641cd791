//! Market ticker WebSocket stream.
//!
//! The server pushes a JSON array of tickers on its own cadence. Only the most
//! recent array is kept ("last message wins"); anything that is not an array
//! of tickers is ignored.

use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::state::{Ticker, TickerState};

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Reconnect delay after `delay`: doubled, capped at 30 seconds.
fn next_delay(delay: Duration) -> Duration {
    delay.saturating_mul(2).min(MAX_RECONNECT_DELAY)
}

/// Parse one stream message; `None` for anything but a ticker array.
pub fn parse_tickers(text: &str) -> Option<Vec<Ticker>> {
    serde_json::from_str::<Vec<Ticker>>(text).ok()
}

/// Background subscription to the ticker WebSocket.
pub struct TickerStream {
    url: String,
    state: Arc<watch::Sender<TickerState>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TickerStream {
    /// Create a stream for `url` without connecting.
    pub fn new(url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(TickerState::default());
        Self {
            url: url.into(),
            state: Arc::new(state),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Receive every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<TickerState> {
        self.state.subscribe()
    }

    /// Connect in the background, reconnecting with a doubling delay after
    /// every disconnect.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let url = self.url.clone();
        let state = self.state.clone();
        let cancel = self.cancel.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut delay = INITIAL_RECONNECT_DELAY;
            loop {
                let session = tokio::select! {
                    _ = cancel.cancelled() => break,
                    session = run_session(&url, &state) => session,
                };
                state.send_if_modified(|s| std::mem::replace(&mut s.connected, false));

                match session {
                    Ok(()) => {
                        info!(%url, "Ticker stream closed, reconnecting");
                        delay = INITIAL_RECONNECT_DELAY;
                    }
                    Err(err) => {
                        warn!(%url, error = %err, retry_secs = delay.as_secs(), "Ticker stream failed");
                    }
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
                delay = next_delay(delay);
            }
        }));
    }

    /// Close the connection and stop reconnecting.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!(url = %self.url, "Ticker stream stopped");
        }
    }
}

impl Drop for TickerStream {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_session(url: &str, state: &watch::Sender<TickerState>) -> Result<()> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| Error::network(e.to_string()))?;
    info!(%url, "Ticker stream connected");
    state.send_modify(|s| s.connected = true);

    let (_write, mut read) = ws.split();
    while let Some(message) = read.next().await {
        match message.map_err(|e| Error::network(e.to_string()))? {
            Message::Text(text) => match parse_tickers(&text) {
                Some(tickers) => state.send_modify(|s| {
                    s.tickers = tickers;
                    s.last_update = Some(Utc::now());
                }),
                None => debug!("Ignoring non-ticker message"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
    Ok(())
}
