use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use reqwest::Url;

use crate::clients::{
    errors::{Error, Result},
    fixtures::FixtureTransport,
    itunes::{self, ItunesClient},
    transport::{HttpTransport, Source},
};

const SEARCH_URL_VAR: &str = "ITUNES_SEARCH_URL";
const LOOKUP_URL_VAR: &str = "ITUNES_LOOKUP_URL";
const TIMEOUT_VAR: &str = "ITUNES_TIMEOUT_SECS";
const FIXTURES_DIR_VAR: &str = "ITUNES_FIXTURES_DIR";
const CONCURRENCY_VAR: &str = "ITUNES_CONCURRENCY";

const DEFAULT_CONCURRENCY: usize = 4;

/// Runtime settings for the catalog clients.
#[derive(Debug, Clone)]
pub struct Config {
    /// Album search endpoint.
    pub search_url: Url,
    /// Track lookup endpoint.
    pub lookup_url: Url,
    /// HTTP timeout; `None` keeps reqwest's default.
    pub timeout: Option<Duration>,
    /// Directory checked for offline fixtures.
    pub fixtures_dir: PathBuf,
    /// Track listings fetched at once.
    pub concurrency: usize,
    /// Serve fixtures instead of calling iTunes.
    pub offline: bool,
}

impl Config {
    /// Data source picked by `offline`.
    pub fn source(&self) -> Result<Source> {
        if self.offline {
            debug!("Using offline fixtures from {:?}", self.fixtures_dir);
            Ok(Source::Fixtures(FixtureTransport::new(&self.fixtures_dir)))
        } else {
            Ok(Source::Http(HttpTransport::try_default(self.timeout)?))
        }
    }

    /// Catalog client over the configured source and endpoints.
    pub fn client(&self) -> Result<ItunesClient<Source>> {
        Ok(ItunesClient::with_endpoints(
            self.source()?,
            self.search_url.clone(),
            self.lookup_url.clone(),
        ))
    }
}

/// Collects overrides; anything left unset comes from the environment or a default.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    search_url: Option<Url>,
    lookup_url: Option<Url>,
    timeout: Option<Duration>,
    fixtures_dir: Option<PathBuf>,
    concurrency: Option<usize>,
    offline: bool,
}

impl ConfigBuilder {
    /// Builder with nothing overridden.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the search endpoint.
    pub fn search_url(mut self, url: Url) -> Self {
        self.search_url = Some(url);
        self
    }

    /// Override the lookup endpoint.
    pub fn lookup_url(mut self, url: Url) -> Self {
        self.lookup_url = Some(url);
        self
    }

    /// Override the timeout when `Some`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self
    }

    /// Override the fixtures directory when `Some`.
    pub fn fixtures_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.fixtures_dir = dir;
        }
        self
    }

    /// Override the concurrency when `Some`.
    pub fn concurrency(mut self, concurrency: Option<usize>) -> Self {
        if concurrency.is_some() {
            self.concurrency = concurrency;
        }
        self
    }

    /// Serve bundled fixtures instead of the live API.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Resolve settings against the process environment.
    pub fn build(self) -> Result<Config> {
        self.build_with(|name| std::env::var(name).ok())
    }

    /// `build` with an injectable variable lookup.
    pub fn build_with(self, var: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let search_url = match self.search_url {
            Some(url) => url,
            None => itunes::parse_endpoint(
                var(SEARCH_URL_VAR).as_deref().unwrap_or(itunes::SEARCH_URL),
            )?,
        };
        let lookup_url = match self.lookup_url {
            Some(url) => url,
            None => itunes::parse_endpoint(
                var(LOOKUP_URL_VAR).as_deref().unwrap_or(itunes::LOOKUP_URL),
            )?,
        };
        let timeout = match self.timeout {
            Some(t) => Some(t),
            None => var(TIMEOUT_VAR)
                .map(|raw| parse_number::<u64>(TIMEOUT_VAR, &raw).map(Duration::from_secs))
                .transpose()?,
        };
        let fixtures_dir = match self.fixtures_dir {
            Some(dir) => dir,
            None => var(FIXTURES_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_fixtures_dir),
        };
        let concurrency = match self.concurrency {
            Some(c) => c,
            None => var(CONCURRENCY_VAR)
                .map(|raw| parse_number::<usize>(CONCURRENCY_VAR, &raw))
                .transpose()?
                .unwrap_or(DEFAULT_CONCURRENCY),
        };
        if concurrency == 0 {
            return Err(Error::Configuration(
                "Concurrency must be at least 1".into(),
            ));
        }

        Ok(Config {
            search_url,
            lookup_url,
            timeout,
            fixtures_dir,
            concurrency,
            offline: self.offline,
        })
    }
}

fn default_fixtures_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if data directory can't be determined
        .join(env!("CARGO_PKG_NAME"))
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Configuration(format!("{name}={raw:?} is not a valid number: {e}")))
}
