//! HTTP client for downloading CSV payloads.

use bytes::Bytes;
use cddbars_types::CddError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("cddbars/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors that can occur while fetching a single URL.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never produced a response body.
    #[error("{url}: {source}")]
    Transport {
        /// URL that was requested.
        url: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// The server answered with something other than 200.
    #[error("CDD HTTP {status} at {url}")]
    Status {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Returns the URL the failed request targeted.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } => url,
        }
    }
}

impl From<FetchError> for CddError {
    fn from(err: FetchError) -> Self {
        Self::unavailable(err.url().to_string(), &err)
    }
}

/// Stateless HTTP fetch capability.
///
/// Cloning is cheap and shares the underlying connection pool. No request
/// state is kept between calls.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    config: ClientConfig,
}

impl FetchClient {
    /// Creates a new fetch client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Downloads `url` with a single GET, returning the body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] for any status other than 200 and
    /// [`FetchError::Transport`] if the request or body read fails.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.bytes().await.map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("cddbars/"));
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/a.csv");
                then.status(200).body("unix,open\n");
            })
            .await;

        let client = FetchClient::with_defaults().unwrap();
        let body = client.fetch(&server.url("/a.csv")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(&body[..], b"unix,open\n");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/moved.csv");
                then.status(204);
            })
            .await;

        let client = FetchClient::with_defaults().unwrap();
        let url = server.url("/moved.csv");
        let err = client.fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 204, .. }));
        assert_eq!(err.url(), url);

        let err: CddError = err.into();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("204"));
    }
}
