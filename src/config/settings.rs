//! Configuration settings for MarketDeck.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Refresh intervals per data domain.
    pub polling: PollingConfig,
    /// Wallet and swap configuration.
    pub wallet: WalletConfig,
    /// Model run configuration.
    pub analysis: AnalysisConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
}

impl Config {
    /// Load configuration from file, returning default if file doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, layered with `MARKETDECK_*` environment
    /// variables (`MARKETDECK_API__BASE_URL` selects the backend origin).
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);
        Self::from_sources(&config_path, None)
    }

    /// Build the configuration from a file path and an optional explicit
    /// environment map (the process environment is used when `None`).
    pub fn from_sources(
        config_path: &Path,
        env: Option<HashMap<String, String>>,
    ) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(super::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(|e| crate::Error::config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin; every endpoint path is appended to it.
    pub base_url: String,
    /// Market ticker WebSocket URL.
    pub ws_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            ws_url: "ws://localhost:8000/ws/market".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Refresh intervals in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub predictions_secs: u64,
    pub signals_secs: u64,
    pub analyzed_coins_secs: u64,
    pub alerts_secs: u64,
    pub portfolio_secs: u64,
    pub news_secs: u64,
    pub social_secs: u64,
    pub coins_secs: u64,
    pub calendar_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            predictions_secs: 300,
            signals_secs: 10,
            analyzed_coins_secs: 10,
            alerts_secs: 60,
            portfolio_secs: 300,
            news_secs: 300,
            social_secs: 300,
            coins_secs: 30,
            calendar_secs: 3600,
        }
    }
}

/// How `amountOutMin` is chosen for router swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinOutPolicy {
    /// Submit with `amountOutMin = 0`; no on-chain slippage protection.
    #[default]
    Unprotected,
    /// Quote through `getAmountsOut` and subtract the slippage tolerance.
    FromQuote,
}

/// Wallet and swap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet provider. `None` means no provider.
    pub rpc_url: Option<String>,
    /// Router contract address.
    pub router_address: String,
    /// Symbol of the chain's native asset.
    pub native_symbol: String,
    /// Transaction deadline offset in seconds.
    pub deadline_secs: u64,
    /// Default slippage tolerance in percent.
    pub slippage_percent: f64,
    /// `amountOutMin` policy.
    pub min_out_policy: MinOutPolicy,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            router_address: "0x10ED43C718714eb63d5aA57B78B54704E256024E".to_string(),
            native_symbol: "BNB".to_string(),
            deadline_secs: 20 * 60,
            slippage_percent: 0.5,
            min_out_policy: MinOutPolicy::Unprotected,
        }
    }
}

/// Model run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Coin sent in the start-model request body.
    pub coin: String,
    /// Client-side duration estimate used by the progress bar.
    pub estimate_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coin: "BTC".to_string(),
            estimate_secs: 70,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Show status bar.
    pub show_status_bar: bool,
    /// Account whose recent posts feed the social tab.
    pub social_username: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: true,
            show_status_bar: true,
            social_username: "ivy_cboinn".to_string(),
        }
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Select/confirm.
    pub select: String,
    /// Cancel/back.
    pub back: String,
    /// Retry the current view's fetch.
    pub refresh: String,
    /// Switch to dashboard view.
    pub dashboard: String,
    /// Switch to strategy view.
    pub strategy: String,
    /// Switch to alerts view.
    pub alerts: String,
    /// Switch to calendar view.
    pub calendar: String,
    /// Switch to portfolio view.
    pub portfolio: String,
    /// Switch to news view.
    pub news: String,
    /// Switch to swap view.
    pub swap: String,
    /// Start the forecasting model.
    pub start_model: String,
    /// Stop the forecasting model.
    pub stop_model: String,
    /// Mark the selected alert as read.
    pub mark_read: String,
    /// Connect the wallet.
    pub connect: String,
    /// Log in, or log out when a session exists.
    pub login: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            select: "Enter".to_string(),
            back: "Esc".to_string(),
            refresh: "r".to_string(),
            dashboard: "1".to_string(),
            strategy: "2".to_string(),
            alerts: "3".to_string(),
            calendar: "4".to_string(),
            portfolio: "5".to_string(),
            news: "6".to_string(),
            swap: "7".to_string(),
            start_model: "m".to_string(),
            stop_model: "s".to_string(),
            mark_read: "x".to_string(),
            connect: "c".to_string(),
            login: "l".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_file() -> PathBuf {
        std::env::temp_dir().join("marketdeck-missing-config.toml")
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let config = Config::from_sources(&missing_file(), Some(HashMap::new())).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8001");
        assert_eq!(config.polling.predictions_secs, 300);
        assert_eq!(config.wallet.deadline_secs, 1200);
        assert_eq!(config.wallet.min_out_policy, MinOutPolicy::Unprotected);
        assert_eq!(config.analysis.estimate_secs, 70);
    }

    #[test]
    fn test_env_overrides_backend_origin() {
        let env = HashMap::from([(
            "MARKETDECK_API__BASE_URL".to_string(),
            "https://api.example.com".to_string(),
        )]);
        let config = Config::from_sources(&missing_file(), Some(env)).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("marketdeck-{}.toml", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.polling.alerts_secs = 15;
        config.wallet.min_out_policy = MinOutPolicy::FromQuote;
        config.save(Some(path.clone())).unwrap();

        let loaded = Config::from_sources(&path, Some(HashMap::new())).unwrap();
        assert_eq!(loaded.polling.alerts_secs, 15);
        assert_eq!(loaded.wallet.min_out_policy, MinOutPolicy::FromQuote);

        std::fs::remove_file(path).unwrap();
    }
}
