//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// Default whole-request budget in seconds.
pub const DEFAULT_MAX_DURATION_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid listen address {addr}: {source}")]
    Listen {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("Invalid base URL {url}: {source}")]
    BaseUrl { url: String, source: url::ParseError },
    #[error("Base URL must be absolute: {0}")]
    RelativeBaseUrl(String),
    #[error("Max duration must be at least one second")]
    ZeroDuration,
}

/// Resolved settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the server binds to
    pub listen: SocketAddr,
    /// Base URL override for fetching `/config/models.json`
    pub base_url: Option<Url>,
    /// Time budget for a whole request
    pub max_duration: Duration,
    /// Read identity from `x-user-*` headers set by an auth proxy
    pub trusted_auth_headers: bool,
    /// Derive the base URL from `x-base-url` / `x-url` / `x-host` set by a proxy
    pub trusted_proxy_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            base_url: None,
            max_duration: Duration::from_secs(DEFAULT_MAX_DURATION_SECS),
            trusted_auth_headers: false,
            trusted_proxy_headers: false,
        }
    }
}

impl ServerConfig {
    /// Build a config from raw string settings, validating each one.
    ///
    /// An empty `base_url` is treated as unset.
    pub fn from_parts(
        listen: &str,
        base_url: Option<&str>,
        max_duration_secs: u64,
        trusted_auth_headers: bool,
    ) -> Result<Self, ConfigError> {
        let listen = listen.parse().map_err(|source| ConfigError::Listen {
            addr: listen.to_string(),
            source,
        })?;

        let base_url = match base_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => {
                let url = Url::parse(raw).map_err(|source| ConfigError::BaseUrl {
                    url: raw.to_string(),
                    source,
                })?;
                if !url.has_host() {
                    return Err(ConfigError::RelativeBaseUrl(raw.to_string()));
                }
                Some(url)
            }
            None => None,
        };

        if max_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        Ok(Self {
            listen,
            base_url,
            max_duration: Duration::from_secs(max_duration_secs),
            trusted_auth_headers,
            trusted_proxy_headers: false,
        })
    }

    /// Trust base URL headers from a fronting proxy.
    pub fn with_trusted_proxy_headers(mut self, trusted: bool) -> Self {
        self.trusted_proxy_headers = trusted;
        self
    }
}
