//! Backend endpoint descriptors.

use reqwest::{Method, Url};
use serde_json::Value;

use crate::error::{Error, Result};

/// One backend request: method, path, optional JSON body, and the shape the
/// response must have.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: Method,
    /// Path appended to the configured origin.
    pub path: String,
    pub body: Option<Value>,
    /// Top-level keys the response object must contain.
    pub required_keys: &'static [&'static str],
    /// Key whose value is the payload; `None` means the whole body.
    pub data_key: Option<&'static str>,
}

/// Percent-encode `segment` for use as a single path segment.
fn path_segment(segment: &str) -> String {
    Url::parse("http://localhost/")
        .ok()
        .and_then(|mut url| {
            url.path_segments_mut().ok()?.pop_if_empty().push(segment);
            Some(url.path().trim_start_matches('/').to_string())
        })
        .unwrap_or_default()
}

impl Endpoint {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            required_keys: &[],
            data_key: None,
        }
    }

    fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body,
            required_keys: &[],
            data_key: None,
        }
    }

    fn require(mut self, keys: &'static [&'static str]) -> Self {
        self.required_keys = keys;
        self
    }

    fn unwrap_key(mut self, key: &'static str) -> Self {
        self.data_key = Some(key);
        self
    }

    /// `{ predictions, last_update? }`
    pub fn predictions() -> Self {
        Self::get("/api/market/predictions").require(&["predictions"])
    }

    /// Ask the model service to regenerate its predictions.
    pub fn update_predictions() -> Self {
        Self::get("/ai/predictions/update")
    }

    /// `{ signals }`
    pub fn signals() -> Self {
        Self::get("/market/signals")
            .require(&["signals"])
            .unwrap_key("signals")
    }

    /// `{ data }`
    pub fn analyzed_coins() -> Self {
        Self::get("/market/analyzed-coins")
            .require(&["data"])
            .unwrap_key("data")
    }

    /// `{ items }`
    pub fn alerts() -> Self {
        Self::get("/api/alerts").require(&["items"]).unwrap_key("items")
    }

    /// `{ coins }`
    pub fn coins() -> Self {
        Self::get("/market/coins").require(&["coins"]).unwrap_key("coins")
    }

    /// `{ articles }`
    pub fn news() -> Self {
        Self::get("/api/market/crypto-news")
            .require(&["articles"])
            .unwrap_key("articles")
    }

    /// `{ categories: [{ name, coins }] }`
    pub fn portfolio() -> Self {
        Self::get("/api/market/portfolio-coins").require(&["categories"])
    }

    /// `{ tweets }` for one account.
    pub fn social(username: &str) -> Self {
        Self::get(format!(
            "/social/twitter/recent-tweets/{}",
            path_segment(username)
        ))
            .require(&["tweets"])
            .unwrap_key("tweets")
    }

    /// `{ events }`
    pub fn calendar() -> Self {
        Self::get("/api/economic-calendar")
            .require(&["events"])
            .unwrap_key("events")
    }

    /// Start a model run for `coin`.
    pub fn start_model(coin: &str) -> Self {
        Self::post("/model/sarima", Some(serde_json::json!({ "coin": coin })))
    }

    /// Stop the running model job.
    pub fn stop_model() -> Self {
        Self::post("/model/stop", None)
    }

    /// `{ username }` on success.
    pub fn login(username: &str, password: &str) -> Self {
        Self::post(
            "/api/login",
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .require(&["username"])
    }

    /// Full URL against `origin`, by plain concatenation.
    pub fn url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.path)
    }

    /// Check the required keys and extract the payload value.
    pub fn extract(&self, body: Value) -> Result<Value> {
        if !self.required_keys.is_empty() {
            let object = body
                .as_object()
                .ok_or_else(|| Error::shape(format!("{self}: expected a JSON object")))?;
            if let Some(missing) = self.required_keys.iter().find(|k| !object.contains_key(**k)) {
                return Err(Error::shape(format!("{self}: missing key `{missing}`")));
            }
        }

        match self.data_key {
            Some(key) => match body {
                Value::Object(mut object) => object
                    .remove(key)
                    .ok_or_else(|| Error::shape(format!("{self}: missing key `{key}`"))),
                _ => Err(Error::shape(format!("{self}: expected a JSON object"))),
            },
            None => Ok(body),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
