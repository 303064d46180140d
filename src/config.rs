// Client configuration: where the servlet lives and how long we wait for it.
// Values are compiled in; nothing is read from the environment.

use std::time::Duration;

/// Default deployment of the servlet demo application.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/servlet-demo";

/// Path of the choose endpoint, relative to the base URL.
pub const API_PATH: &str = "/api/choose";

/// Identification string sent as `User-Agent` with every request.
pub const CLIENT_ID: &str = "Rust Desktop Client/1.0";

/// Immutable settings for a `ServletClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_path: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Config pointing at another deployment, keeping the other defaults.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        }
    }

    /// Full URL of the choose endpoint. Plain concatenation, no slash fixups.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.api_path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.into(),
            api_path: API_PATH.into(),
            timeout: Duration::from_secs(10),
            user_agent: CLIENT_ID.into(),
        }
    }
}
