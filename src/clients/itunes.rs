use log::{debug, info};
use reqwest::Url;

use crate::clients::{
    entities::{Album, Song},
    envelope::decode_envelope,
    errors::{Error, Result},
    transport::Transport,
};

/// Live album search endpoint.
pub const SEARCH_URL: &str = "https://itunes.apple.com/search";
/// Live lookup endpoint.
pub const LOOKUP_URL: &str = "https://itunes.apple.com/lookup";

/// Client for the two iTunes catalog calls this crate needs.
#[derive(Debug, Clone)]
pub struct ItunesClient<S> {
    transport: S,
    search_url: Url,
    lookup_url: Url,
}

impl<S: Transport> ItunesClient<S> {
    /// Client against the live endpoints.
    pub fn try_default(transport: S) -> Result<Self> {
        Ok(Self::with_endpoints(
            transport,
            parse_endpoint(SEARCH_URL)?,
            parse_endpoint(LOOKUP_URL)?,
        ))
    }

    /// Client against custom search and lookup endpoints.
    pub fn with_endpoints(transport: S, search_url: Url, lookup_url: Url) -> Self {
        ItunesClient {
            transport,
            search_url,
            lookup_url,
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &S {
        &self.transport
    }

    /// Search albums by artist name, in the order iTunes returns them.
    ///
    /// The name is sent as typed, including an empty one.
    pub async fn search_albums(&self, artist_name: &str) -> Result<Vec<Album>> {
        let url = self.search_url_for(artist_name);
        info!("Searching albums for {artist_name:?} ...");
        let body = self.transport.get(&url).await?;
        let decoded = decode_envelope::<Album>(&body)?;
        debug!(
            "Search for {artist_name:?} returned {} albums ({} skipped)",
            decoded.records.len(),
            decoded.skipped
        );
        Ok(decoded.records)
    }

    /// Fetch the raw lookup results for an album. Filter with
    /// [`displayable`](crate::clients::entities::displayable) before listing.
    pub async fn fetch_tracks(&self, collection_id: u64) -> Result<Vec<Song>> {
        let url = self.lookup_url_for(collection_id);
        info!("Fetching tracks of collection {collection_id} ...");
        let body = self.transport.get(&url).await?;
        let decoded = decode_envelope::<Song>(&body)?;
        debug!(
            "Lookup of {collection_id} returned {} entries ({} skipped)",
            decoded.records.len(),
            decoded.skipped
        );
        Ok(decoded.records)
    }

    /// Search URL for an artist. `term` is form-encoded, so `&`, `=` and `#`
    /// can't leak into other params.
    pub fn search_url_for(&self, artist_name: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("term", artist_name)
            .append_pair("entity", "album");
        url
    }

    /// Lookup URL for an album's songs.
    pub fn lookup_url_for(&self, collection_id: u64) -> Url {
        let mut url = self.lookup_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &collection_id.to_string())
            .append_pair("entity", "song");
        url
    }
}

/// Parse an endpoint override, rejecting anything that can't carry a query.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("Invalid endpoint URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Configuration(format!(
            "Endpoint URL {raw:?} must be hierarchical"
        )));
    }
    Ok(url)
}
