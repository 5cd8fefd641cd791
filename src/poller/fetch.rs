//! Fetch sources for pollers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::api::{ApiClient, Endpoint};
use crate::error::Result;

/// A single fetch of one data domain.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Payload type stored in the poll result.
    type Output: Clone + Send + Sync + 'static;

    /// Perform one fetch.
    async fn fetch(&self) -> Result<Self::Output>;

    /// Human-readable source description for logs.
    fn describe(&self) -> String;
}

/// Fetch a backend endpoint and decode its payload as `T`.
pub struct HttpFetch<T> {
    client: ApiClient,
    endpoint: Endpoint,
    _payload: PhantomData<fn() -> T>,
}

impl<T> HttpFetch<T> {
    /// Create a fetch source for `endpoint`.
    pub fn new(client: ApiClient, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            _payload: PhantomData,
        }
    }

    /// The endpoint this source reads.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl<T> Fetch for HttpFetch<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Output = T;

    async fn fetch(&self) -> Result<T> {
        self.client.fetch(&self.endpoint).await
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
