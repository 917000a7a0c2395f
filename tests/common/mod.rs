// Shared helpers for integration tests
//
// The scripted transport and JSON fixtures come from the library's own
// test module, compiled here against the public API.

#![allow(dead_code)]

use imagefeed::network::{ApiRequest, HttpTransport, RawResponse};
use imagefeed::services::InMemoryTokenStore;
use imagefeed::{AppBuilder, AppDependencies, NetworkError, TokenStore, UnsplashConfig};
use std::sync::Arc;

#[path = "../../src/network/scripted.rs"]
mod scripted;

pub use scripted::*;

pub fn test_config() -> UnsplashConfig {
    UnsplashConfig::new("test-access", "test-secret")
        .with_api_base_url("https://api.test")
        .with_auth_base_url("https://auth.test")
}

/// Dependencies wired to a scripted transport and an in-memory token
pub fn test_deps(transport: &Arc<ScriptedTransport>, token: Option<&str>) -> AppDependencies {
    let tokens: Arc<dyn TokenStore> = match token {
        Some(token) => Arc::new(InMemoryTokenStore::with_token(token)),
        None => Arc::new(InMemoryTokenStore::new()),
    };

    AppBuilder::new()
        .with_config(test_config())
        .with_transport(transport.clone())
        .with_token_store(tokens)
        .build()
        .expect("failed to build test dependencies")
}

pub fn ids(range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|i| format!("p{}", i)).collect()
}
