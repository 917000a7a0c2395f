// HTTP request execution: transport port, reqwest adapter, JSON executor
//
// Module Organization:
// - types.rs: ApiRequest/RawResponse descriptors
// - reqwest_transport.rs: production transport
// - HttpTransport trait and HttpExecutor defined in this file

mod reqwest_transport;
#[cfg(test)]
pub mod scripted;
mod types;

pub use reqwest_transport::ReqwestTransport;
pub use types::*;

use crate::error::NetworkError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Longest body excerpt included in decode-failure logs
const MAX_LOGGED_BODY: usize = 512;

/// Performs one HTTP round trip
///
/// Implementations report transport failures as `UrlRequestError` and
/// unreadable responses as `InvalidResponse`. Status codes are not
/// interpreted here; that is the executor's job.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, NetworkError>;
}

/// Executes requests and decodes JSON bodies into typed results
///
/// Cheap to clone; all clones share the transport.
#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl HttpExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Send a request and return the body of a 2xx response
    pub async fn data(&self, request: ApiRequest) -> Result<Vec<u8>, NetworkError> {
        let method = request.method.as_str();
        let path = request.url.path().to_string();

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            e
        })?;

        if !response.is_success() {
            tracing::warn!("{} {} returned HTTP {}", method, path, response.status);
            return Err(NetworkError::HttpStatusCode(response.status));
        }

        response.body.ok_or_else(|| {
            tracing::warn!("{} {} returned no body", method, path);
            NetworkError::InvalidResponse
        })
    }

    /// Send a request and decode the 2xx body as `T`
    pub async fn object<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, NetworkError> {
        let path = request.url.path().to_string();
        let body = self.data(request).await?;

        serde_json::from_slice(&body).map_err(|e| {
            let raw = String::from_utf8_lossy(&body);
            let excerpt: String = raw.chars().take(MAX_LOGGED_BODY).collect();
            tracing::error!("Failed to decode response from {}: {}", path, e);
            tracing::debug!("Raw body: {}", excerpt);
            NetworkError::DecodingError(e)
        })
    }
}
