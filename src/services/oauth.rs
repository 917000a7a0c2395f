// OAuth authorization-code exchange
//
// Trades the code from the authorize redirect for a bearer token and
// stores it. Repeating the code of an exchange that is still in flight is
// rejected with InvalidRequest; a different code cancels the earlier
// exchange.
//
// Token writes and `sign_out` take the same lock, and a write only happens
// while the exchange still holds the current gate ticket.

use super::request_gate::RequestGate;
use super::traits::TokenStore;
use crate::config::UnsplashConfig;
use crate::endpoints;
use crate::error::{ImageFeedError, NetworkError, Result};
use crate::models::TokenResponse;
use crate::network::HttpExecutor;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct OAuthService {
    executor: HttpExecutor,
    config: Arc<UnsplashConfig>,
    tokens: Arc<dyn TokenStore>,
    gate: Arc<RequestGate<String>>,
    store_lock: Arc<Mutex<()>>,
}

impl OAuthService {
    pub fn new(
        executor: HttpExecutor,
        config: Arc<UnsplashConfig>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            executor,
            config,
            tokens,
            gate: Arc::new(RequestGate::new("oauth")),
            store_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Exchange `code` for an access token
    ///
    /// On success the token is written to the token store before this
    /// returns. On failure the store is left as it was.
    pub async fn exchange(&self, code: &str) -> Result<String> {
        let request = endpoints::oauth_token(&self.config, code)?;
        let executor = self.executor.clone();
        let tokens = self.tokens.clone();
        let gate = self.gate.clone();
        let store_lock = self.store_lock.clone();

        let result = self
            .gate
            .run_with_ticket(
                &code.to_string(),
                move |ticket| async move {
                    let response: TokenResponse = executor.object(request).await?;

                    let _write = store_lock.lock().await;
                    if !gate.is_current(ticket) {
                        return Err(NetworkError::cancelled().into());
                    }
                    tokens.set_token(&response.access_token).await?;
                    Ok::<_, ImageFeedError>(response.access_token)
                },
                |_| tracing::info!("OAuth token received and stored"),
            )
            .await;

        if let Err(e) = &result {
            tracing::warn!("OAuth code exchange failed: {}", e);
        }
        result
    }

    /// True while an exchange is unresolved
    pub fn is_in_flight(&self) -> bool {
        self.gate.is_in_flight()
    }

    /// Cancel any in-flight exchange, then clear the stored token
    ///
    /// An exchange that already passed its ticket check finishes its write
    /// first, so the clear always lands last.
    pub async fn sign_out(&self) -> Result<()> {
        let _write = self.store_lock.lock().await;
        self.gate.reset();
        self.tokens.clear().await
    }
}
