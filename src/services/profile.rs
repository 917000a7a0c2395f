// Current user's profile
//
// Fetches `/me` with an explicit token, keeps the last fetched profile for
// synchronous reads and announces it on the event bus (source "profile").

use super::request_gate::RequestGate;
use crate::config::UnsplashConfig;
use crate::endpoints;
use crate::error::{ImageFeedError, Result};
use crate::events::{Event, EventBus, EventKind, Subscription, PROFILE_SOURCE};
use crate::models::{Profile, ProfileResult};
use crate::network::HttpExecutor;
use std::sync::{Arc, RwLock};

pub struct ProfileService {
    executor: HttpExecutor,
    config: Arc<UnsplashConfig>,
    events: Arc<EventBus>,
    gate: RequestGate<String>,
    profile: RwLock<Option<Profile>>,
}

impl ProfileService {
    pub fn new(executor: HttpExecutor, config: Arc<UnsplashConfig>, events: Arc<EventBus>) -> Self {
        Self {
            executor,
            config,
            events,
            gate: RequestGate::new("profile"),
            profile: RwLock::new(None),
        }
    }

    /// Fetch the profile belonging to `token`
    ///
    /// A second fetch with the same token while the first is unresolved is
    /// rejected with InvalidRequest.
    pub async fn fetch(&self, token: &str) -> Result<Profile> {
        let request = endpoints::me(&self.config, token)?;
        let executor = self.executor.clone();

        let result = self
            .gate
            .run(
                &token.to_string(),
                async move {
                    let dto: ProfileResult = executor.object(request).await?;
                    Ok::<_, ImageFeedError>(Profile::from(dto))
                },
                |profile| self.store(Some(profile.clone())),
            )
            .await;

        match &result {
            Ok(profile) => {
                tracing::info!("Profile loaded for {}", profile.login_name);
                self.events.notify(
                    PROFILE_SOURCE,
                    EventKind::ProfileChanged {
                        profile: profile.clone(),
                    },
                );
            }
            Err(e) => tracing::warn!("Profile fetch failed: {}", e),
        }
        result
    }

    /// Last fetched profile
    pub fn profile(&self) -> Option<Profile> {
        self.profile
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Cancel any in-flight fetch and forget the stored profile
    pub fn reset(&self) {
        self.gate.reset();
        self.store(None);
    }

    /// Register a callback for profile change notifications
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.events.on(Some(PROFILE_SOURCE), callback)
    }

    fn store(&self, profile: Option<Profile>) {
        match self.profile.write() {
            Ok(mut guard) => *guard = profile,
            Err(poisoned) => *poisoned.into_inner() = profile,
        }
    }
}
