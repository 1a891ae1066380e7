use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use reqwest::Url;

use crate::clients::errors::{Error, Result};
use crate::clients::transport::Transport;

/// File answering album searches.
pub const ALBUMS_FIXTURE: &str = "stones.json";
/// File answering track lookups.
pub const SONGS_FIXTURE: &str = "songs.json";

const EMBEDDED_ALBUMS: &str = include_str!("../../fixtures/stones.json");
const EMBEDDED_SONGS: &str = include_str!("../../fixtures/songs.json");

/// Serves static response bodies from a directory, ignoring the query.
/// Used as an offline stand-in for the live API.
///
/// A file missing from the directory is answered with the copy built into
/// the binary, so offline mode works without installing anything.
#[derive(Debug, Clone)]
pub struct FixtureTransport {
    dir: PathBuf,
}

impl FixtureTransport {
    /// Serve fixtures from `dir`, falling back to the built-in copies.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FixtureTransport { dir: dir.into() }
    }

    /// Directory searched before the built-in copies.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // (file name, built-in body) for an endpoint
    fn fixture_for(url: &Url) -> Result<(&'static str, &'static str)> {
        let path = url.path();
        if path.ends_with("/search") {
            Ok((ALBUMS_FIXTURE, EMBEDDED_ALBUMS))
        } else if path.ends_with("/lookup") {
            Ok((SONGS_FIXTURE, EMBEDDED_SONGS))
        } else {
            Err(Error::Configuration(format!(
                "No fixture serves the endpoint {path}"
            )))
        }
    }
}

impl Transport for FixtureTransport {
    async fn get(&self, url: &Url) -> Result<String> {
        let (file, embedded) = Self::fixture_for(url)?;
        let fixture = self.dir.join(file);
        match tokio::fs::read_to_string(&fixture).await {
            Ok(body) => {
                debug!("Serving {url} from {fixture:?}");
                Ok(body)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No {fixture:?}, serving {url} from the built-in {file}");
                Ok(embedded.to_owned())
            }
            Err(e) => Err(e.into()),
        }
    }
}
