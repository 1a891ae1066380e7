use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::stream::{StreamExt, iter};
use itunes_lister::clients::{
    Album, Source, TrackRow,
    entities::displayable,
    errors::Result,
};
use itunes_lister::config::{Config, ConfigBuilder};
use itunes_lister::screen::{AlbumScreen, Applied, TrackScreen};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "itunes-lister")]
#[command(version, about = "Search the iTunes catalog for albums and list their tracks", long_about = None)]
struct Cli {
    /// Read bundled JSON fixtures instead of calling iTunes
    #[arg(long, global = true)]
    offline: bool,

    /// Directory holding stones.json and songs.json
    #[arg(long, global = true, value_name = "DIR")]
    fixtures_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// How many track listings to fetch at once
    #[arg(long, global = true, value_name = "N")]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search albums by artist name
    Search { artist: String },
    /// List the tracks of one or more albums
    Tracks {
        #[arg(required = true, value_name = "COLLECTION_ID")]
        collection_ids: Vec<u64>,
    },
    /// Browse interactively: type an artist, `:open <id>`, `:r`, blank line to refresh, `:q`
    Browse { artist: Option<String> },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    info!("Building config ...");
    let config = ConfigBuilder::new()
        .offline(cli.offline)
        .fixtures_dir(cli.fixtures_dir)
        .timeout(cli.timeout.map(Duration::from_secs))
        .concurrency(cli.concurrency)
        .build()?;

    match cli.command {
        Commands::Search { artist } => search(&config, &artist).await,
        Commands::Tracks { collection_ids } => tracks(&config, &collection_ids).await,
        Commands::Browse { artist } => browse(&config, artist.unwrap_or_default()).await,
    }
}

async fn search(config: &Config, artist: &str) -> Result<()> {
    let client = config.client()?;
    let albums = client.search_albums(artist).await?;
    print_albums(&albums);
    Ok(())
}

// Listings are fetched concurrently but printed in argument order
async fn tracks(config: &Config, collection_ids: &[u64]) -> Result<()> {
    let client = config.client()?;
    let client = &client;

    let listings = iter(collection_ids.iter().copied())
        .map(|id| async move { (id, client.fetch_tracks(id).await) })
        .buffered(config.concurrency)
        .collect::<Vec<_>>()
        .await;

    let mut first_error = None;
    for (id, result) in listings {
        match result {
            Ok(songs) => {
                println!("Collection {id}");
                print_tracks(&displayable(&songs));
            }
            Err(e) => {
                warn!("Failed to fetch tracks of {id}: {e}");
                eprintln!("Collection {id}: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn browse(config: &Config, artist: String) -> Result<()> {
    let client = Arc::new(config.client()?);
    let albums = AlbumScreen::new(client.clone(), artist);
    let mut open: Option<TrackScreen<Source>> = None;

    show_albums(&albums, albums.appear().await)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match BrowseCommand::parse(&line) {
            BrowseCommand::Quit => break,
            BrowseCommand::RefreshAlbums => show_albums(&albums, albums.refresh().await)?,
            BrowseCommand::Search(term) => show_albums(&albums, albums.commit(term).await)?,
            BrowseCommand::Open(id) => {
                let screen = TrackScreen::new(client.clone(), id);
                show_tracks(&screen, screen.appear().await)?;
                open = Some(screen);
            }
            BrowseCommand::RefreshTracks => match &open {
                Some(screen) => show_tracks(screen, screen.refresh().await)?,
                None => eprintln!("No album is open, use :open <collection id>"),
            },
            BrowseCommand::Invalid(reason) => eprintln!("{reason}"),
        }
    }
    Ok(())
}

fn show_albums(screen: &AlbumScreen<Source>, outcome: Result<Applied>) -> Result<()> {
    if report(outcome)? {
        print_albums(&screen.albums());
    }
    Ok(())
}

fn show_tracks(screen: &TrackScreen<Source>, outcome: Result<Applied>) -> Result<()> {
    if report(outcome)? {
        println!("Collection {}", screen.collection_id());
        print_tracks(&screen.rows());
    }
    Ok(())
}

// A failed fetch keeps the previous list on screen; only broken config ends the loop
fn report(outcome: Result<Applied>) -> Result<bool> {
    match outcome {
        Ok(Applied::Replaced(_)) => Ok(true),
        Ok(Applied::Stale) => Ok(false),
        Err(e) if e.is_recoverable() => {
            warn!("Fetch failed: {e}");
            eprintln!("{e} (keeping the previous list)");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn print_albums(albums: &[Album]) {
    if albums.is_empty() {
        println!("No albums found");
    }
    for album in albums {
        println!("{}", album_line(album));
    }
}

fn print_tracks(rows: &[TrackRow]) {
    if rows.is_empty() {
        println!("No tracks found");
    }
    for row in rows {
        println!("{}", track_line(row));
    }
}

fn album_line(album: &Album) -> String {
    format!(
        "{}\t{} - {}",
        album.collection_id, album.collection_name, album.artist_name
    )
}

fn track_line(row: &TrackRow) -> String {
    match &row.time {
        Some(time) => format!("{:>2}. {}  {time}", row.number, row.name),
        None => format!("{:>2}. {}", row.number, row.name),
    }
}

/// One line of input in the browse loop.
#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand {
    Quit,
    RefreshAlbums,
    RefreshTracks,
    Open(u64),
    Search(String),
    Invalid(String),
}

impl BrowseCommand {
    fn parse(line: &str) -> Self {
        if line.trim().is_empty() {
            return BrowseCommand::RefreshAlbums;
        }
        let Some(command) = line.trim().strip_prefix(':') else {
            // search terms go out as typed
            return BrowseCommand::Search(line.to_owned());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("q" | "quit"), None) => BrowseCommand::Quit,
            (Some("r" | "refresh"), None) => BrowseCommand::RefreshTracks,
            (Some("open" | "o"), Some(id)) => match id.parse() {
                Ok(id) => BrowseCommand::Open(id),
                Err(_) => BrowseCommand::Invalid(format!("{id:?} is not a collection id")),
            },
            _ => BrowseCommand::Invalid(format!("Unknown command {line:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itunes_lister::clients::errors::Error;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", BrowseCommand::RefreshAlbums)]
    #[case("   ", BrowseCommand::RefreshAlbums)]
    #[case(":q", BrowseCommand::Quit)]
    #[case(":r", BrowseCommand::RefreshTracks)]
    #[case(":open 1440852373", BrowseCommand::Open(1_440_852_373))]
    #[case(" Rolling Stones", BrowseCommand::Search(" Rolling Stones".into()))]
    #[case("AC/DC & friends", BrowseCommand::Search("AC/DC & friends".into()))]
    fn browse_input_is_parsed(#[case] line: &str, #[case] expected: BrowseCommand) {
        assert_eq!(BrowseCommand::parse(line), expected);
    }

    #[rstest]
    #[case(":open sticky")]
    #[case(":open")]
    #[case(":play 1")]
    fn bad_browse_commands_are_reported(#[case] line: &str) {
        assert!(matches!(BrowseCommand::parse(line), BrowseCommand::Invalid(_)));
    }

    #[test]
    fn rows_render_with_optional_time() {
        let with_time = TrackRow {
            number: 3,
            name: "Wild Horses".into(),
            time: Some("5:42".into()),
        };
        let without_time = TrackRow {
            number: 12,
            name: "Moonlight Mile".into(),
            time: None,
        };

        assert_eq!(track_line(&with_time), " 3. Wild Horses  5:42");
        assert_eq!(track_line(&without_time), "12. Moonlight Mile");
    }

    #[test]
    fn albums_render_with_their_id() {
        let album = Album {
            collection_id: 1,
            collection_name: "Sticky Fingers".into(),
            artist_name: "The Rolling Stones".into(),
            artwork_url: "http://x/a.jpg".into(),
        };
        assert_eq!(album_line(&album), "1\tSticky Fingers - The Rolling Stones");
    }

    #[test]
    fn recoverable_failures_keep_the_loop_alive() {
        assert!(!report(Err(Error::Network("reset".into()))).unwrap());
        assert!(report(Ok(Applied::Replaced(0))).unwrap());
        assert!(report(Err(Error::Configuration("bad".into()))).is_err());
    }
}
