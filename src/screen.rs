//! Screen state driven by presentation triggers.
//!
//! A screen owns exactly one "current result set". Every trigger performs one
//! fetch; a successful fetch replaces the set wholesale, a failed one leaves it
//! alone. Each fetch is tagged with a [`Ticket`] when it is issued, and only the
//! most recently issued ticket may replace the set, so a slow earlier request
//! can't overwrite the answer to a newer one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};

use crate::clients::{
    entities::{Album, Song, TrackRow, displayable},
    errors::Result,
    itunes::ItunesClient,
    transport::Transport,
};

/// What asked the screen to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The screen was first shown.
    Appear,
    /// The user asked to reload.
    Refresh,
    /// The user submitted new input.
    Commit,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Appear => "appear",
            Trigger::Refresh => "refresh",
            Trigger::Commit => "commit",
        })
    }
}

/// Sequence token handed out when a fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result set was replaced with this many records.
    Replaced(usize),
    /// A newer fetch was issued meanwhile; this result was dropped.
    Stale,
}

/// The single mutable "current result set" of a screen.
pub struct ResultSlot<T> {
    issued: AtomicU64,
    current: Mutex<Arc<[T]>>,
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        ResultSlot {
            issued: AtomicU64::new(0),
            current: Mutex::new(Vec::new().into()),
        }
    }
}

impl<T> ResultSlot<T> {
    /// Empty slot; no ticket issued yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next ticket. It supersedes every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply the outcome of the fetch issued as `ticket`.
    ///
    /// Errors are handed back untouched and never clear the current set.
    pub fn complete(&self, ticket: Ticket, result: Result<Vec<T>>) -> Result<Applied> {
        let items = result?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            debug!("Dropping stale result for {ticket:?}");
            return Ok(Applied::Stale);
        }
        let len = items.len();
        *current = items.into();
        Ok(Applied::Replaced(len))
    }

    /// Snapshot of the current set.
    pub fn current(&self) -> Arc<[T]> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Album search results for the artist currently typed in.
pub struct AlbumScreen<S> {
    client: Arc<ItunesClient<S>>,
    term: Mutex<String>,
    albums: ResultSlot<Album>,
}

impl<S: Transport> AlbumScreen<S> {
    /// Screen starting with `term` and no albums.
    pub fn new(client: Arc<ItunesClient<S>>, term: impl Into<String>) -> Self {
        AlbumScreen {
            client,
            term: Mutex::new(term.into()),
            albums: ResultSlot::new(),
        }
    }

    /// Search for the current term when first shown.
    pub async fn appear(&self) -> Result<Applied> {
        self.run(Trigger::Appear, None).await
    }

    /// Search for the current term again.
    pub async fn refresh(&self) -> Result<Applied> {
        self.run(Trigger::Refresh, None).await
    }

    /// Replace the search term and search for it.
    pub async fn commit(&self, term: impl Into<String>) -> Result<Applied> {
        self.run(Trigger::Commit, Some(term.into())).await
    }

    /// Current search term.
    pub fn term(&self) -> String {
        self.term
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Albums currently shown.
    pub fn albums(&self) -> Arc<[Album]> {
        self.albums.current()
    }

    async fn run(&self, trigger: Trigger, new_term: Option<String>) -> Result<Applied> {
        // term and ticket change together so a ticket always matches its term
        let (ticket, term) = {
            let mut term = self.term.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(new_term) = new_term {
                *term = new_term;
            }
            let ticket = self.albums.issue();
            (ticket, term.clone())
        };
        debug!("Album screen {trigger} for {term:?} as {ticket:?}");

        let result = self.client.search_albums(&term).await;
        let applied = self.albums.complete(ticket, result)?;
        if let Applied::Replaced(n) = applied {
            info!("Showing {n} albums for {term:?}");
        }
        Ok(applied)
    }
}

/// Track listing of one album.
pub struct TrackScreen<S> {
    client: Arc<ItunesClient<S>>,
    collection_id: u64,
    songs: ResultSlot<Song>,
}

impl<S: Transport> TrackScreen<S> {
    /// Screen for one album, with no tracks yet.
    pub fn new(client: Arc<ItunesClient<S>>, collection_id: u64) -> Self {
        TrackScreen {
            client,
            collection_id,
            songs: ResultSlot::new(),
        }
    }

    /// Album this screen lists.
    pub fn collection_id(&self) -> u64 {
        self.collection_id
    }

    /// Fetch the listing when first shown.
    pub async fn appear(&self) -> Result<Applied> {
        self.run(Trigger::Appear).await
    }

    /// Fetch the listing again.
    pub async fn refresh(&self) -> Result<Applied> {
        self.run(Trigger::Refresh).await
    }

    /// Everything the lookup returned, including rows that can't be listed.
    pub fn songs(&self) -> Arc<[Song]> {
        self.songs.current()
    }

    /// The songs that can be listed.
    pub fn rows(&self) -> Vec<TrackRow> {
        displayable(&self.songs.current())
    }

    async fn run(&self, trigger: Trigger) -> Result<Applied> {
        let ticket = self.songs.issue();
        debug!(
            "Track screen {trigger} for collection {} as {ticket:?}",
            self.collection_id
        );

        let result = self.client.fetch_tracks(self.collection_id).await;
        let applied = self.songs.complete(ticket, result)?;
        if let Applied::Replaced(n) = applied {
            info!("Loaded {n} entries for collection {}", self.collection_id);
        }
        Ok(applied)
    }
}
