// Port traits for infrastructure the services depend on
//
// All traits are Send + Sync so implementations can be shared as
// Arc<dyn Trait> across tokio tasks. Production adapters live next to this
// file; tests substitute mockall-generated mocks.

use crate::error::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::path::Path;

/// Filesystem abstraction for file I/O operations
///
/// Usage:
///     let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
///     let content = fs.read_to_string(Path::new("token.json")).await?;
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read entire file contents as a UTF-8 string
    async fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string content to a file (creates or overwrites)
    async fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a path exists (file or directory)
    ///
    /// Returns false on permission errors (cannot distinguish from non-existence)
    async fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories (like mkdir -p)
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Delete a file
    async fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Holder of the current bearer credential
///
/// Read by every fetcher when building requests. Written by the OAuth
/// exchange on success and cleared on logout.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, or None when signed out
    ///
    /// Read failures are logged and reported as "no token".
    async fn token(&self) -> Option<String>;

    /// Replace the current token
    async fn set_token(&self, token: &str) -> Result<()>;

    /// Forget the current token
    async fn clear(&self) -> Result<()>;
}
