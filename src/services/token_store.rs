// Token store implementations
//
// InMemoryTokenStore: process-lifetime credential, used by tests and
// short-lived sessions.
// FileTokenStore: JSON file in the user's config directory so a login
// survives restarts. A missing file means "signed out".

use super::traits::{FileSystem, TokenStore};
use crate::error::{ImageFeedError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

const TOKEN_FILE_NAME: &str = "token.json";

/// Token held in memory only
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn token(&self) -> Option<String> {
        self.token.read().map(|guard| guard.clone()).unwrap_or_else(|poisoned| {
            tracing::warn!("Token store lock poisoned, recovering");
            poisoned.into_inner().clone()
        })
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ImageFeedError::StorageError("Token store lock poisoned".to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ImageFeedError::StorageError("Token store lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Token persisted as JSON on disk
///
/// Usage:
///     let fs = Arc::new(RealFileSystem);
///     let store = FileTokenStore::new(fs, FileTokenStore::default_dir()?);
///     store.set_token("...").await?;
pub struct FileTokenStore {
    fs: Arc<dyn FileSystem>,
    base_path: PathBuf,
}

impl FileTokenStore {
    pub fn new(fs: Arc<dyn FileSystem>, base_path: PathBuf) -> Self {
        Self { fs, base_path }
    }

    /// `<config dir>/imagefeed`
    pub fn default_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("imagefeed"))
            .ok_or_else(|| {
                ImageFeedError::ConfigError("Could not determine config directory".to_string())
            })
    }

    fn token_path(&self) -> PathBuf {
        self.base_path.join(TOKEN_FILE_NAME)
    }

    async fn load(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !self.fs.exists(&path).await {
            return Ok(None);
        }

        let content = self.fs.read_to_string(&path).await?;
        let stored: StoredToken = serde_json::from_str(&content).map_err(|e| {
            ImageFeedError::StorageError(format!("Failed to deserialize token: {}", e))
        })?;

        Ok(Some(stored.access_token).filter(|token| !token.is_empty()))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn token(&self) -> Option<String> {
        match self.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        if !self.fs.exists(&self.base_path).await {
            self.fs.create_dir_all(&self.base_path).await?;
        }

        let content = serde_json::to_string_pretty(&StoredToken {
            access_token: token.to_string(),
        })?;

        self.fs.write(&self.token_path(), &content).await
    }

    async fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if self.fs.exists(&path).await {
            self.fs.remove_file(&path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mocks::test_helpers::create_mock_filesystem;
    use crate::services::traits::MockFileSystem;
    use crate::services::RealFileSystem;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryTokenStore::new();
        assert_eq!(store.token().await, None);

        store.set_token("abc").await.unwrap();
        assert_eq!(store.token().await.as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert_eq!(store.token().await, None);
    }

    #[tokio::test]
    async fn test_file_store_round_trip_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("imagefeed");
        let store = FileTokenStore::new(Arc::new(RealFileSystem), base.clone());

        assert_eq!(store.token().await, None);

        store.set_token("secret-token").await.unwrap();
        assert!(base.join("token.json").exists());
        assert_eq!(store.token().await.as_deref(), Some("secret-token"));

        store.clear().await.unwrap();
        assert_eq!(store.token().await, None);
        assert!(!base.join("token.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_clear_without_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(Arc::new(RealFileSystem), temp_dir.path().to_path_buf());
        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_reads_as_signed_out() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_read_to_string()
            .returning(|_| Ok("not json".to_string()));

        let store = FileTokenStore::new(Arc::new(fs), PathBuf::from("data"));
        assert_eq!(store.token().await, None);
    }

    #[tokio::test]
    async fn test_file_store_set_token_writes_json() {
        let mut fs = create_mock_filesystem();
        fs.expect_create_dir_all().times(1).returning(|_| Ok(()));
        fs.expect_write()
            .withf(|path, content| {
                path.ends_with("token.json") && content.contains("\"access_token\": \"tok\"")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let store = FileTokenStore::new(Arc::new(fs), PathBuf::from("data"));
        store.set_token("tok").await.unwrap();
    }
}
