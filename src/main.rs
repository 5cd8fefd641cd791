//! MarketDeck - a terminal dashboard for crypto markets.
//!
//! The terminal belongs to the TUI, so logs go to a daily file under the
//! data directory.

use marketdeck::{App, Config, Result, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_dir = config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, "marketdeck.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketdeck=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    // Load configuration
    let config = Config::load_or_default()?;

    // Run the application
    let mut app = App::new(config).await?;
    let result = app.run().await;
    drop(app);

    if let Err(err) = &result {
        tracing::error!(error = %err, "MarketDeck exited with an error");
        eprintln!("marketdeck: {err}");
    }
    result
}
