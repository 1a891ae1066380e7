use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Client, Url};

use crate::clients::errors::{Error, Result};
use crate::clients::fixtures::FixtureTransport;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches a response body for a fully built catalog URL.
pub trait Transport {
    /// Perform one GET and return the whole body.
    fn get(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// Talks to the live iTunes endpoints.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Wrap an already configured reqwest client.
    pub fn new(client: Client) -> Self {
        HttpTransport { client }
    }

    /// Build a client with this crate's user agent. Without a timeout
    /// reqwest waits as long as the OS lets it.
    pub fn try_default(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String> {
        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!("{status} from {url}");

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Where catalog data comes from: the live API or bundled fixtures.
#[derive(Debug, Clone)]
pub enum Source {
    /// Live iTunes API.
    Http(HttpTransport),
    /// Bundled JSON fixtures.
    Fixtures(FixtureTransport),
}

impl Transport for Source {
    async fn get(&self, url: &Url) -> Result<String> {
        match self {
            Source::Http(http) => http.get(url).await,
            Source::Fixtures(fixtures) => fixtures.get(url).await,
        }
    }
}
