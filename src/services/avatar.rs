// Avatar URL of a user
//
// Fetches `/users/{username}` (bearer attached when signed in) and keeps
// the small profile image URL. Announces it on the event bus (source
// "avatar").

use super::request_gate::RequestGate;
use super::traits::TokenStore;
use crate::config::UnsplashConfig;
use crate::endpoints;
use crate::error::{ImageFeedError, Result};
use crate::events::{Event, EventBus, EventKind, Subscription, AVATAR_SOURCE};
use crate::models::UserResult;
use crate::network::HttpExecutor;
use std::sync::{Arc, RwLock};

pub struct AvatarService {
    executor: HttpExecutor,
    config: Arc<UnsplashConfig>,
    tokens: Arc<dyn TokenStore>,
    events: Arc<EventBus>,
    gate: RequestGate<String>,
    avatar_url: RwLock<Option<String>>,
}

impl AvatarService {
    pub fn new(
        executor: HttpExecutor,
        config: Arc<UnsplashConfig>,
        tokens: Arc<dyn TokenStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            executor,
            config,
            tokens,
            events,
            gate: RequestGate::new("avatar"),
            avatar_url: RwLock::new(None),
        }
    }

    /// Fetch the avatar URL for `username`
    pub async fn fetch(&self, username: &str) -> Result<String> {
        let executor = self.executor.clone();
        let config = self.config.clone();
        let tokens = self.tokens.clone();
        let key = username.to_string();
        let target = key.clone();

        let result = self
            .gate
            .run(
                &key,
                async move {
                    let token = tokens.token().await;
                    let request = endpoints::user(&config, &target, token.as_deref())?;
                    let user: UserResult = executor.object(request).await?;
                    Ok::<_, ImageFeedError>(user.profile_image.small)
                },
                |url| self.store(Some(url.clone())),
            )
            .await;

        match &result {
            Ok(url) => {
                tracing::info!("Avatar loaded for {}", username);
                self.events
                    .notify(AVATAR_SOURCE, EventKind::AvatarChanged { url: url.clone() });
            }
            Err(e) => tracing::warn!("Avatar fetch failed for {}: {}", username, e),
        }
        result
    }

    /// Last fetched avatar URL
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar_url
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Cancel any in-flight fetch and forget the stored URL
    pub fn reset(&self) {
        self.gate.reset();
        self.store(None);
    }

    /// Register a callback for avatar change notifications
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.events.on(Some(AVATAR_SOURCE), callback)
    }

    fn store(&self, url: Option<String>) {
        match self.avatar_url.write() {
            Ok(mut guard) => *guard = url,
            Err(poisoned) => *poisoned.into_inner() = url,
        }
    }
}
