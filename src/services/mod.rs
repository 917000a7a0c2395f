// Service layer: stateful fetchers and the ports they depend on
//
// Architecture Pattern: Ports and Adapters
// - traits.rs defines the ports (FileSystem, TokenStore)
// - filesystem.rs / token_store.rs are the adapters
// - oauth, profile, avatar and feed hold the business logic and talk to
//   the network through HttpExecutor
//
// Usage Example:
//     let fs = Arc::new(RealFileSystem);
//     let tokens = Arc::new(FileTokenStore::new(fs, FileTokenStore::default_dir()?));
//     let oauth = OAuthService::new(executor, config, tokens);
//     oauth.exchange(&code).await?;

pub mod avatar;
pub mod feed;
pub mod filesystem;
#[cfg(test)]
pub mod mocks;
pub mod oauth;
pub mod profile;
pub mod request_gate;
pub mod token_store;
pub mod traits;

// Re-export commonly used types
pub use avatar::AvatarService;
pub use feed::{FeedSnapshot, PhotoFeedService};
pub use filesystem::RealFileSystem;
pub use oauth::OAuthService;
pub use profile::ProfileService;
pub use request_gate::{is_cancelled, RequestGate};
pub use token_store::{FileTokenStore, InMemoryTokenStore};
pub use traits::{FileSystem, TokenStore};
