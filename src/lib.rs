// Library interface for imagefeed
// Core of an Unsplash photo feed client:
// - authenticated HTTP execution with a fixed error taxonomy
// - OAuth code exchange, profile and avatar fetchers
// - paginated, deduplicated photo feed with likes
// - change notifications over an event bus

pub mod app_builder;
pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod events;
pub mod models;
pub mod network;
pub mod services;

// Re-export commonly used types for convenience
pub use app_builder::{AppBuilder, AppDependencies};
pub use config::UnsplashConfig;
pub use error::{ImageFeedError, NetworkError, Result};
pub use events::{Event, EventBus, EventKind, Subscription};
pub use models::{Photo, PhotoSize, Profile};
pub use network::{HttpExecutor, HttpTransport, ReqwestTransport};
pub use services::{
    AvatarService, FeedSnapshot, FileTokenStore, InMemoryTokenStore, OAuthService,
    PhotoFeedService, ProfileService, TokenStore,
};
