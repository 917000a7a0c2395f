// Request builders for the remote API surface
//
// | Operation     | Method | Path                 | Auth              |
// |---------------|--------|----------------------|-------------------|
// | List photos   | GET    | /photos              | Bearer (optional) |
// | Like photo    | POST   | /photos/{id}/like    | Bearer            |
// | Unlike photo  | DELETE | /photos/{id}/like    | Bearer            |
// | Exchange code | POST   | /oauth/token         | none              |
// | Get profile   | GET    | /me                  | Bearer            |
// | Get user      | GET    | /users/{username}    | Bearer (optional) |
//
// Every builder fails with InvalidRequest instead of producing a malformed URL.

use crate::config::UnsplashConfig;
use crate::error::NetworkError;
use crate::network::{ApiRequest, HttpMethod};
use reqwest::Url;

/// Build `{base}/{segments...}`, percent-encoding each segment
fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, NetworkError> {
    let mut url = Url::parse(base).map_err(|e| {
        tracing::error!("Invalid base URL '{}': {}", base, e);
        NetworkError::InvalidRequest
    })?;

    url.path_segments_mut()
        .map_err(|_| NetworkError::InvalidRequest)?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn require_non_empty(value: &str) -> Result<&str, NetworkError> {
    if value.trim().is_empty() {
        Err(NetworkError::InvalidRequest)
    } else {
        Ok(value)
    }
}

/// `GET /photos?page=N&per_page=M`
pub fn photos_page(
    config: &UnsplashConfig,
    page: u32,
    per_page: u32,
    token: Option<&str>,
) -> Result<ApiRequest, NetworkError> {
    let mut url = endpoint_url(&config.api_base_url, &["photos"])?;
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("per_page", &per_page.to_string());

    Ok(ApiRequest::get(url).with_optional_bearer(token))
}

/// `POST` (like) or `DELETE` (unlike) `/photos/{id}/like`
pub fn change_like(
    config: &UnsplashConfig,
    photo_id: &str,
    is_liked: bool,
    token: Option<&str>,
) -> Result<ApiRequest, NetworkError> {
    let photo_id = require_non_empty(photo_id)?;
    let url = endpoint_url(&config.api_base_url, &["photos", photo_id, "like"])?;
    let method = if is_liked {
        HttpMethod::Post
    } else {
        HttpMethod::Delete
    };

    Ok(ApiRequest::new(method, url).with_optional_bearer(token))
}

/// `POST /oauth/token`, form-encoded authorization-code grant
pub fn oauth_token(config: &UnsplashConfig, code: &str) -> Result<ApiRequest, NetworkError> {
    let code = require_non_empty(code)?;
    let url = endpoint_url(&config.auth_base_url, &["oauth", "token"])?;

    let form = vec![
        ("client_id".to_string(), config.access_key.clone()),
        ("client_secret".to_string(), config.secret_key.clone()),
        ("redirect_uri".to_string(), config.redirect_uri.clone()),
        ("code".to_string(), code.to_string()),
        ("grant_type".to_string(), "authorization_code".to_string()),
    ];

    Ok(ApiRequest::post(url).with_form(form))
}

/// `GET /me`
pub fn me(config: &UnsplashConfig, token: &str) -> Result<ApiRequest, NetworkError> {
    let token = require_non_empty(token)?;
    let url = endpoint_url(&config.api_base_url, &["me"])?;
    Ok(ApiRequest::get(url).with_bearer(token))
}

/// `GET /users/{username}`
pub fn user(
    config: &UnsplashConfig,
    username: &str,
    token: Option<&str>,
) -> Result<ApiRequest, NetworkError> {
    let username = require_non_empty(username)?;
    let url = endpoint_url(&config.api_base_url, &["users", username])?;
    Ok(ApiRequest::get(url).with_optional_bearer(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RequestBody;

    fn config() -> UnsplashConfig {
        UnsplashConfig::new("access", "secret")
    }

    #[test]
    fn test_photos_page_request() {
        let request = photos_page(&config(), 3, 10, Some("tok")).unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.path(), "/photos");
        assert_eq!(request.query_param("page").as_deref(), Some("3"));
        assert_eq!(request.query_param("per_page").as_deref(), Some("10"));
        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_photos_page_without_token_has_no_auth() {
        let request = photos_page(&config(), 1, 10, None).unwrap();
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn test_like_and_unlike_methods() {
        let like = change_like(&config(), "abc", true, Some("tok")).unwrap();
        assert_eq!(like.method, HttpMethod::Post);
        assert_eq!(like.url.as_str(), "https://api.unsplash.com/photos/abc/like");

        let unlike = change_like(&config(), "abc", false, Some("tok")).unwrap();
        assert_eq!(unlike.method, HttpMethod::Delete);
        assert_eq!(unlike.url.path(), "/photos/abc/like");
    }

    #[test]
    fn test_path_segments_are_escaped() {
        let request = user(&config(), "a/b", None).unwrap();
        assert_eq!(request.url.path(), "/users/a%2Fb");
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let config = config().with_api_base_url("http://localhost:9000/api/");
        let request = me(&config, "tok").unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:9000/api/me");
    }

    #[test]
    fn test_oauth_token_form() {
        let request = oauth_token(&config(), "the-code").unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url.as_str(), "https://unsplash.com/oauth/token");
        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.form_field("client_id"), Some("access"));
        assert_eq!(request.form_field("client_secret"), Some("secret"));
        assert_eq!(request.form_field("redirect_uri"), Some("urn:ietf:wg:oauth:2.0:oob"));
        assert_eq!(request.form_field("code"), Some("the-code"));
        assert_eq!(request.form_field("grant_type"), Some("authorization_code"));
        assert!(matches!(request.body, Some(RequestBody::Form(ref pairs)) if pairs.len() == 5));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            change_like(&config(), "", true, None),
            Err(NetworkError::InvalidRequest)
        ));
        assert!(matches!(user(&config(), "  ", None), Err(NetworkError::InvalidRequest)));
        assert!(matches!(oauth_token(&config(), ""), Err(NetworkError::InvalidRequest)));

        let broken = config().with_api_base_url("not a url");
        assert!(matches!(photos_page(&broken, 1, 10, None), Err(NetworkError::InvalidRequest)));
    }
}
