//! Client configuration

use std::time::Duration;
use url::Url;

/// Public GitHub REST API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version the client is written against
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Header selecting the REST API version
pub const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`AttestationClient`](crate::AttestationClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (e.g. `https://ghe.example.com/api/v3` for GitHub Enterprise)
    pub api_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Value of the `x-github-api-version` header
    pub api_version: String,
    /// Token sent as `authorization: Bearer <token>`
    pub token: Option<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Page size hint passed as `per_page`
    pub per_page: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("attestation-verify/", env!("CARGO_PKG_VERSION")).to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            timeout: Some(DEFAULT_TIMEOUT),
            per_page: None,
        }
    }
}

impl ClientConfig {
    /// Set the API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the page size hint
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Host of the GitHub server the API belongs to
    ///
    /// Repository and owner URIs in signing certificates use this host:
    /// `api.github.com` serves `github.com`, while GitHub Enterprise serves its
    /// API from the same host as its web UI.
    pub fn server_host(&self) -> Option<String> {
        let url = Url::parse(&self.api_url).ok()?;
        match url.host_str()? {
            "api.github.com" => Some("github.com".to_string()),
            host => Some(host.to_string()),
        }
    }
}
