// AppBuilder pattern for dependency construction and injection
//
// Design Decision: Builder pattern with dependency injection for testability
//
// Production wiring talks to the real Unsplash API through reqwest and keeps
// the token on disk. Tests swap in a scripted transport and an in-memory
// token store. Every service shares one HttpExecutor, one token store and
// one event bus.
//
// Usage Example:
//     // Production
//     let deps = AppBuilder::new().with_production_deps()?.build()?;
//
//     // Testing
//     let deps = AppBuilder::new()
//         .with_config(config)
//         .with_transport(transport)
//         .with_token_store(Arc::new(InMemoryTokenStore::new()))
//         .build()?;

use crate::config::UnsplashConfig;
use crate::error::{ImageFeedError, Result};
use crate::events::EventBus;
use crate::models::Profile;
use crate::network::{HttpExecutor, HttpTransport, ReqwestTransport};
use crate::services::{
    AvatarService, FileSystem, FileTokenStore, OAuthService, PhotoFeedService, ProfileService,
    RealFileSystem, TokenStore,
};
use std::sync::Arc;

/// Builder for the service graph
pub struct AppBuilder {
    config: Option<UnsplashConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    token_store: Option<Arc<dyn TokenStore>>,
    event_bus: Option<Arc<EventBus>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
            token_store: None,
            event_bus: None,
        }
    }

    /// Use production dependencies
    ///
    /// - configuration from `.env` and the environment
    /// - reqwest transport
    /// - token persisted under the user's config directory
    ///
    /// # Errors
    ///
    /// Returns error if the configuration cannot be loaded or the config
    /// directory cannot be determined.
    pub fn with_production_deps(mut self) -> Result<Self> {
        let config = UnsplashConfig::load()?;

        let filesystem = Arc::new(RealFileSystem) as Arc<dyn FileSystem>;
        let token_store = Arc::new(FileTokenStore::new(
            filesystem,
            FileTokenStore::default_dir()?,
        )) as Arc<dyn TokenStore>;

        self.config = Some(config);
        self.transport = Some(Arc::new(ReqwestTransport::new()));
        self.token_store = Some(token_store);

        Ok(self)
    }

    pub fn with_config(mut self, config: UnsplashConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the HTTP transport (for testing)
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the token store (for testing)
    pub fn with_token_store(mut self, token_store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(token_store);
        self
    }

    /// Override event bus (for testing)
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Build the configured dependencies
    ///
    /// Starts the photo feed actor, so this must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if config, transport or token store is missing.
    pub fn build(self) -> Result<AppDependencies> {
        let config = Arc::new(
            self.config
                .ok_or_else(|| ImageFeedError::ConfigError("Config not configured".to_string()))?,
        );
        let transport = self
            .transport
            .ok_or_else(|| ImageFeedError::ConfigError("Transport not configured".to_string()))?;
        let tokens = self.token_store.ok_or_else(|| {
            ImageFeedError::ConfigError("Token store not configured".to_string())
        })?;
        let events = self.event_bus.unwrap_or_else(|| Arc::new(EventBus::new()));

        let executor = HttpExecutor::new(transport);

        Ok(AppDependencies {
            oauth: Arc::new(OAuthService::new(
                executor.clone(),
                config.clone(),
                tokens.clone(),
            )),
            profile: Arc::new(ProfileService::new(
                executor.clone(),
                config.clone(),
                events.clone(),
            )),
            avatar: Arc::new(AvatarService::new(
                executor.clone(),
                config.clone(),
                tokens.clone(),
                events.clone(),
            )),
            feed: PhotoFeedService::new(
                executor.clone(),
                config.clone(),
                tokens.clone(),
                events.clone(),
            ),
            config,
            tokens,
            executor,
            events,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all application dependencies
///
/// All fields use Arc (or are cheap handles) for sharing across tasks.
pub struct AppDependencies {
    pub config: Arc<UnsplashConfig>,
    pub tokens: Arc<dyn TokenStore>,
    pub executor: HttpExecutor,
    pub events: Arc<EventBus>,
    pub oauth: Arc<OAuthService>,
    pub profile: Arc<ProfileService>,
    pub avatar: Arc<AvatarService>,
    pub feed: PhotoFeedService,
}

impl AppDependencies {
    /// Exchange an authorization code and load the signed-in user
    pub async fn sign_in(&self, code: &str) -> Result<Profile> {
        self.oauth.exchange(code).await?;
        match self.load_session().await? {
            Some(profile) => Ok(profile),
            None => Err(ImageFeedError::StorageError(
                "Token missing right after sign-in".to_string(),
            )),
        }
    }

    /// Load profile and avatar for the stored token
    ///
    /// Returns None when signed out. An avatar failure is logged and does
    /// not fail the session.
    pub async fn load_session(&self) -> Result<Option<Profile>> {
        let Some(token) = self.tokens.token().await else {
            tracing::debug!("No stored token, session not loaded");
            return Ok(None);
        };

        let profile = self.profile.fetch(&token).await?;
        if let Err(e) = self.avatar.fetch(&profile.username).await {
            tracing::warn!("Continuing without avatar for {}: {}", profile.login_name, e);
        }

        Ok(Some(profile))
    }

    /// Sign out: reset every stateful service, then forget the token
    pub async fn logout(&self) -> Result<()> {
        self.profile.reset();
        self.avatar.reset();
        self.feed.reset().await?;
        self.oauth.sign_out().await?;

        tracing::info!("Logged out");
        Ok(())
    }
}
