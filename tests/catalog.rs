use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use itunes_lister::clients::{
    FixtureTransport, ItunesClient, Transport,
    entities::displayable,
    errors::{Error, Result},
};
use itunes_lister::screen::{AlbumScreen, Applied, TrackScreen};
use pretty_assertions::assert_eq;
use reqwest::Url;

/// Returns `body` until switched offline.
struct Stub {
    body: &'static str,
    offline: Arc<AtomicBool>,
}

impl Stub {
    fn new(body: &'static str) -> Self {
        Stub {
            body,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Transport for Stub {
    async fn get(&self, _url: &Url) -> Result<String> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".into()));
        }
        Ok(self.body.to_owned())
    }
}

fn bundled_fixtures() -> FixtureTransport {
    FixtureTransport::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures"))
}

#[tokio::test]
async fn search_returns_the_single_album() {
    let stub = Stub::new(
        r#"{ "results": [{"collectionId":1,"collectionName":"Sticky Fingers","artistName":"The Rolling Stones","artworkUrl100":"http://x/a.jpg"}] }"#,
    );
    let client = ItunesClient::try_default(stub).unwrap();

    let albums = client.search_albums("Rolling Stones").await.unwrap();

    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].collection_id, 1);
    assert_eq!(albums[0].collection_name, "Sticky Fingers");
}

#[tokio::test]
async fn track_screen_survives_going_offline() {
    let stub = Stub::new(
        r#"{ "results": [
            {"wrapperType":"collection","collectionId":1,"collectionName":"Sticky Fingers"},
            {"trackNumber":1,"trackName":"Brown Sugar","trackTimeMillis":229493},
            {"trackNumber":3,"trackName":"Wild Horses","trackTimeMillis":342413},
            {"trackName":"Liner notes"}
        ] }"#,
    );
    let offline = stub.offline.clone();
    let client = Arc::new(ItunesClient::try_default(stub).unwrap());
    let screen = TrackScreen::new(client, 1);

    assert_eq!(screen.appear().await.unwrap(), Applied::Replaced(4));
    let before = screen.rows();

    offline.store(true, Ordering::SeqCst);
    let err = screen.refresh().await.unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(screen.rows(), before);
    assert_eq!(screen.songs().len(), 4);
    assert_eq!(
        before.iter().map(|row| row.time.as_deref()).collect::<Vec<_>>(),
        [Some("3:49"), Some("5:42")]
    );
}

#[tokio::test]
async fn bundled_fixtures_serve_both_screens() {
    let client = Arc::new(ItunesClient::try_default(bundled_fixtures()).unwrap());

    let albums = AlbumScreen::new(client.clone(), "");
    albums.commit("The Rolling Stones").await.unwrap();
    let first = albums.albums()[0].clone();
    assert_eq!(first.collection_name, "Sticky Fingers (Remastered)");

    let tracks = TrackScreen::new(client, first.key());
    tracks.appear().await.unwrap();
    let rows = tracks.rows();

    assert_eq!(tracks.songs().len(), rows.len() + 1);
    assert_eq!(rows.first().map(|row| row.name.as_str()), Some("Brown Sugar"));
    assert_eq!(rows.last().map(|row| row.key()), Some(10));
}

#[tokio::test]
async fn fixture_lookup_filters_the_collection_row() {
    let client = ItunesClient::try_default(bundled_fixtures()).unwrap();

    let songs = client.fetch_tracks(1_440_852_373).await.unwrap();
    let rows = displayable(&songs);

    assert!(songs.len() >= rows.len());
    assert!(songs[0].track_name.is_none());
    assert_eq!(rows[2].time.as_deref(), Some("5:42"));
}
