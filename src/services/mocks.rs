// Mock test helpers and common mock patterns
//
// Two kinds of helpers:
// - mockall constructors with sensible defaults for the storage ports
// - ScriptedTransport and the JSON fixtures, re-exported from
//   network::scripted
//
// Usage:
//     use crate::services::mocks::test_helpers::*;
//     let transport = ScriptedTransport::new();
//     feed.fetch_next_page();
//     transport.next_request().await.respond_json(page_json(&["p1"]));

#[cfg(test)]
pub mod test_helpers {
    use super::super::traits::*;
    use crate::config::UnsplashConfig;

    pub use crate::network::scripted::*;

    /// Config pointing at unroutable test hosts
    pub fn test_config() -> UnsplashConfig {
        UnsplashConfig::new("test-access", "test-secret")
            .with_api_base_url("https://api.test")
            .with_auth_base_url("https://auth.test")
    }

    /// Create a mock filesystem with default "file not found" behavior
    pub fn create_mock_filesystem() -> MockFileSystem {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|_| false);
        mock
    }
}
