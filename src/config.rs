// Configuration for the Unsplash API and OAuth flow
//
// Secrets (access/secret key) come from environment variables, optionally
// loaded from a .env file. Everything else has a default matching the public
// Unsplash endpoints. Loaded once at startup and immutable afterwards.

use crate::error::{ImageFeedError, Result};

pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const DEFAULT_ACCESS_SCOPE: &str = "public+read_user+write_likes";
pub const DEFAULT_API_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_AUTH_URL: &str = "https://unsplash.com";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Unsplash application credentials and endpoints
///
/// Usage:
///     let config = UnsplashConfig::load()?;
///     let url = auth::authorize_url(&config)?;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsplashConfig {
    /// Application access key (OAuth client_id)
    pub access_key: String,

    /// Application secret key (OAuth client_secret)
    pub secret_key: String,

    /// Redirect URI registered for the application
    pub redirect_uri: String,

    /// Requested OAuth scopes, `+`-separated
    pub access_scope: String,

    /// Base URL of the JSON API (`/photos`, `/me`, `/users/...`)
    pub api_base_url: String,

    /// Base URL of the OAuth host (`/oauth/authorize`, `/oauth/token`)
    pub auth_base_url: String,

    /// Number of photos requested per feed page
    pub page_size: u32,
}

impl UnsplashConfig {
    /// Build a configuration with default endpoints
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            access_scope: DEFAULT_ACCESS_SCOPE.to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load configuration from environment
    ///
    /// Environment Variables:
    /// - UNSPLASH_ACCESS_KEY (required)
    /// - UNSPLASH_SECRET_KEY (required)
    /// - UNSPLASH_REDIRECT_URI (optional)
    /// - UNSPLASH_ACCESS_SCOPE (optional)
    /// - UNSPLASH_API_URL (optional)
    /// - UNSPLASH_AUTH_URL (optional)
    /// - IMAGEFEED_PAGE_SIZE (optional, positive integer)
    ///
    /// # Errors
    /// - A required key is not set
    /// - IMAGEFEED_PAGE_SIZE is not a positive integer
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let access_key = required_var("UNSPLASH_ACCESS_KEY")?;
        let secret_key = required_var("UNSPLASH_SECRET_KEY")?;

        let mut config = Self::new(access_key, secret_key);

        if let Ok(uri) = std::env::var("UNSPLASH_REDIRECT_URI") {
            config.redirect_uri = uri;
        }
        if let Ok(scope) = std::env::var("UNSPLASH_ACCESS_SCOPE") {
            config.access_scope = scope;
        }
        if let Ok(url) = std::env::var("UNSPLASH_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var("UNSPLASH_AUTH_URL") {
            config.auth_base_url = url;
        }
        if let Ok(raw) = std::env::var("IMAGEFEED_PAGE_SIZE") {
            config.page_size = parse_page_size(&raw)?;
        }

        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ImageFeedError::ConfigError(format!(
            "{} environment variable not set",
            name
        ))),
    }
}

fn parse_page_size(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ImageFeedError::ConfigError(format!(
            "IMAGEFEED_PAGE_SIZE must be a positive integer, got '{}'",
            raw
        ))),
    }
}
