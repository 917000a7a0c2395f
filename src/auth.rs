// Helpers for the browser half of the OAuth flow
//
// The login UI itself is an external collaborator; it needs the URL to open
// and a way to recognise the redirect that carries the authorization code.

use crate::config::UnsplashConfig;
use crate::error::{ImageFeedError, Result};
use reqwest::Url;

/// Path of the redirect page that carries `?code=...`
pub const NATIVE_REDIRECT_PATH: &str = "/oauth/authorize/native";

/// URL of the authorization page the user signs in on
///
/// Scopes are `+`-separated in configuration and sent space-separated.
pub fn authorize_url(config: &UnsplashConfig) -> Result<Url> {
    let mut url = Url::parse(&config.auth_base_url)
        .and_then(|base| base.join("oauth/authorize"))
        .map_err(|e| ImageFeedError::ConfigError(format!("Invalid auth URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.access_key)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.access_scope.replace('+', " "));

    Ok(url)
}

/// Extract the authorization code from a navigation URL
///
/// Returns None unless the URL is the native redirect page with a
/// non-empty `code` parameter.
pub fn code_from_redirect(url: &Url) -> Option<String> {
    if url.path() != NATIVE_REDIRECT_PATH {
        return None;
    }

    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url() {
        let config = UnsplashConfig::new("access", "secret");
        let url = authorize_url(&config).unwrap();

        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "access".to_string())));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(url
            .query()
            .unwrap()
            .contains("scope=public+read_user+write_likes"));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "urn:ietf:wg:oauth:2.0:oob".to_string()
        )));
    }

    #[test]
    fn test_code_from_native_redirect() {
        let url = Url::parse("https://unsplash.com/oauth/authorize/native?code=xyz").unwrap();
        assert_eq!(code_from_redirect(&url).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_code_ignored_on_other_pages() {
        let url = Url::parse("https://unsplash.com/login?code=xyz").unwrap();
        assert_eq!(code_from_redirect(&url), None);

        let url = Url::parse("https://unsplash.com/oauth/authorize/native?state=1").unwrap();
        assert_eq!(code_from_redirect(&url), None);

        let url = Url::parse("https://unsplash.com/oauth/authorize/native?code=").unwrap();
        assert_eq!(code_from_redirect(&url), None);
    }
}
