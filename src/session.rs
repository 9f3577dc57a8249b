use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, Url};

use crate::error::{Result, SetupError};

/// Wrapper around the configured HTTP client and the resolved probe URL.
#[derive(Debug, Clone)]
pub struct ApiSession {
    client: Client,
    completions_url: Url,
}

/// Minimal data required to build an API session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub extra_headers: &'static [(&'static str, &'static str)],
}

impl ApiSession {
    /// Build a session holding one client for the whole fan-out. Connection
    /// pooling stays inside reqwest.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);

        for (name, value) in config.extra_headers {
            default_headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }

        let client = ClientBuilder::new()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            completions_url: completions_url(&config.endpoint)?,
        })
    }

    /// Returns reference to the inner `reqwest::Client`.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fully resolved chat-completions URL.
    pub fn completions_url(&self) -> &Url {
        &self.completions_url
    }
}

fn completions_url(endpoint: &str) -> std::result::Result<Url, SetupError> {
    let base = endpoint.trim_end_matches('/');
    Url::parse(&format!("{base}/chat/completions")).map_err(|source| SetupError::InvalidEndpoint {
        url: endpoint.to_owned(),
        source,
    })
}
