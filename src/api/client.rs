//! Backend HTTP client.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::Endpoint;

/// Builder for creating an API client.
pub struct ApiClientBuilder {
    config: ApiConfig,
}

impl ApiClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the backend origin.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<ApiClient> {
        ApiClient::new(self.config)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the dashboard backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Backend origin.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue the request and return the validated payload value.
    ///
    /// Non-2xx responses become [`Error::Server`] with the body's `detail`;
    /// an empty success body yields `Value::Null`.
    pub async fn send(&self, endpoint: &Endpoint) -> Result<Value> {
        let url = endpoint.url(&self.base_url);
        debug!(%endpoint, %url, "Sending request");

        let mut request = self.http.request(endpoint.method.clone(), &url);
        if let Some(body) = &endpoint.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        if !status.is_success() {
            debug!(%endpoint, status = status.as_u16(), "Request failed");
            return Err(Error::from_response(status.as_u16(), &text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| Error::shape(format!("{endpoint}: {e}")))?
        };
        endpoint.extract(body)
    }

    /// Issue the request and decode the payload as `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let value = self.send(endpoint).await?;
        serde_json::from_value(value).map_err(|e| Error::shape(format!("{endpoint}: {e}")))
    }

    /// Issue the request, ignoring any success body.
    pub async fn execute(&self, endpoint: &Endpoint) -> Result<()> {
        self.send(endpoint).await.map(|_| ())
    }

    /// Log in and return the username confirmed by the backend.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let body = self.send(&Endpoint::login(username, password)).await?;
        body.get("username")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::shape("login: `username` is not a string"))
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    //! Minimal one-shot HTTP server for client tests.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned response and return the base URL plus a handle
    /// resolving to the raw request text.
    pub async fn serve_once(
        status: u16,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + length
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;
    use crate::state::Alert;

    fn client(base_url: &str) -> ApiClient {
        ApiClientBuilder::new().base_url(base_url).build().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_unwraps_envelope() {
        let (url, server) = serve_once(
            200,
            r#"{"items":[{"id":1,"priority":"high","title":"BTC","timestamp":"2025-02-01T00:00:00Z"}]}"#,
        )
        .await;
        let alerts: Vec<Alert> = client(&url).fetch(&Endpoint::alerts()).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "1");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/alerts "));
    }

    #[tokio::test]
    async fn test_server_error_carries_detail() {
        let (url, _server) = serve_once(400, r#"{"detail":"coin is required"}"#).await;
        let err = client(&url)
            .execute(&Endpoint::start_model("BTC"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Server { status: 400, .. }));
        assert_eq!(err.user_message("generic"), "coin is required");
    }

    #[tokio::test]
    async fn test_missing_key_is_shape_error() {
        let (url, _server) = serve_once(200, r#"{"data":[]}"#).await;
        let err = client(&url)
            .fetch::<Vec<Value>>(&Endpoint::news())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let (url, server) = serve_once(200, "").await;
        tokio_test::assert_ok!(client(&url).execute(&Endpoint::start_model("ETH")).await);
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /model/sarima "));
        assert!(request.contains(r#"{"coin":"ETH"}"#));
    }

    #[tokio::test]
    async fn test_login_returns_username() {
        let (url, _server) = serve_once(200, r#"{"username":"satoshi"}"#).await;
        let username = client(&url).login("satoshi", "hunter2").await.unwrap();
        assert_eq!(username, "satoshi");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let err = client("http://127.0.0.1:9")
            .fetch::<Value>(&Endpoint::predictions())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
