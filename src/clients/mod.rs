/// Album and song records
pub mod entities;
/// `{ "results": [...] }` response decoding
pub mod envelope;
/// Error types and result aliases
pub mod errors;
/// Offline fixture data source
pub mod fixtures;
/// iTunes search and lookup client
pub mod itunes;
/// HTTP transport seam
pub mod transport;

pub use entities::{Album, Song, TrackRow};
pub use fixtures::FixtureTransport;
pub use itunes::ItunesClient;
pub use transport::{HttpTransport, Source, Transport};
