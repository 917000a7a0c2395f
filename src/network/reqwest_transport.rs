use super::types::{ApiRequest, HttpMethod, RawResponse, RequestBody};
use super::HttpTransport;
use crate::error::NetworkError;
use async_trait::async_trait;
use reqwest::{Client, Method};

/// Production transport backed by a shared reqwest client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, NetworkError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(RequestBody::Form(pairs)) = &request.body {
            builder = builder.form(pairs);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                NetworkError::InvalidRequest
            } else {
                NetworkError::UrlRequestError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!("Failed to read response body (HTTP {}): {}", status, e);
                None
            }
        };

        Ok(RawResponse { status, body })
    }
}
