//! Client configuration.
//!
//! Holds the service location, the API consumer key pair and the HTTP
//! identity presented on every call.  Built from environment variables with
//! [`ClientConfig::from_env`] or programmatically with the `with_*` setters.

use std::time::Duration;

/// Service host used when nothing else is configured.
pub const DEFAULT_SERVICE_URL: &str = "https://sandbox.evernote.com";

/// Global client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the service (scheme + host).
    pub service_url: String,
    /// API consumer key sent with identity/secret logins.
    pub consumer_key: String,
    /// API consumer secret sent with identity/secret logins.
    pub consumer_secret: String,
    /// `User-Agent` header and client name reported to `check_version`.
    pub user_agent: String,
    /// Extra headers sent with every request.
    pub custom_headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            user_agent: default_user_agent(),
            custom_headers: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                    | Default                        |
    /// |-----------------------------|--------------------------------|
    /// | `NOTESTORE_SERVICE_URL`     | `https://sandbox.evernote.com` |
    /// | `NOTESTORE_CONSUMER_KEY`    | empty                          |
    /// | `NOTESTORE_CONSUMER_SECRET` | empty                          |
    /// | `NOTESTORE_USER_AGENT`      | `notestore-sdk/<version>`      |
    /// | `NOTESTORE_TIMEOUT_SECS`    | `30`                           |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let request_timeout = std::env::var("NOTESTORE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(defaults.request_timeout, Duration::from_secs);

        Self {
            service_url: std::env::var("NOTESTORE_SERVICE_URL").unwrap_or(defaults.service_url),
            consumer_key: std::env::var("NOTESTORE_CONSUMER_KEY").unwrap_or_default(),
            consumer_secret: std::env::var("NOTESTORE_CONSUMER_SECRET").unwrap_or_default(),
            user_agent: std::env::var("NOTESTORE_USER_AGENT").unwrap_or(defaults.user_agent),
            custom_headers: Vec::new(),
            request_timeout,
        }
    }

    /// Point the client at another service host.
    #[must_use]
    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into();
        self
    }

    /// Set the API consumer key pair.
    #[must_use]
    pub fn with_consumer(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.consumer_key = key.into();
        self.consumer_secret = secret.into();
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn default_user_agent() -> String {
    format!("notestore-sdk/{}", env!("CARGO_PKG_VERSION"))
}
