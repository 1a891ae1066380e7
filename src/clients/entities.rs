use serde::{Deserialize, Serialize};

/// An album ("collection" in iTunes terms) returned by the search endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// iTunes collection id, used for track lookups.
    pub collection_id: u64,
    /// Album title.
    pub collection_name: String,
    /// Album artist.
    pub artist_name: String,
    /// 100x100 cover art URL.
    #[serde(rename = "artworkUrl100")]
    pub artwork_url: String,
}

impl Album {
    /// Stable identity for list rendering.
    pub fn key(&self) -> u64 {
        self.collection_id
    }
}

/// A lookup result entry. The API omits fields for non-audio entries
/// (and for the collection wrapper row), so everything is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Position on the album.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    /// Track title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    /// Length in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_time_millis: Option<u64>,
}

impl Song {
    /// Track length as `m:ss`. Minutes are not wrapped into hours.
    pub fn track_time(&self) -> Option<String> {
        self.track_time_millis.map(format_millis)
    }

    /// Returns the displayable form of this song, or `None` when it lacks a
    /// track number or name.
    pub fn to_row(&self) -> Option<TrackRow> {
        Some(TrackRow {
            number: self.track_number?,
            name: self.track_name.clone()?,
            time: self.track_time(),
        })
    }
}

/// A song that has everything needed to be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    /// Position on the album.
    pub number: u32,
    /// Track title.
    pub name: String,
    /// Length as `m:ss`, when known.
    pub time: Option<String>,
}

impl TrackRow {
    /// Stable identity within an album.
    pub fn key(&self) -> u32 {
        self.number
    }
}

/// Filters a raw lookup result down to the songs that can be displayed,
/// keeping upstream order.
pub fn displayable(songs: &[Song]) -> Vec<TrackRow> {
    songs.iter().filter_map(Song::to_row).collect()
}

fn format_millis(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis / 1000) % 60;
    format!("{minutes}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn song(number: Option<u32>, name: Option<&str>, millis: Option<u64>) -> Song {
        Song {
            track_number: number,
            track_name: name.map(str::to_owned),
            track_time_millis: millis,
        }
    }

    #[rstest]
    #[case(247_000, "4:07")]
    #[case(0, "0:00")]
    #[case(59_999, "0:59")]
    #[case(60_000, "1:00")]
    #[case(229_493, "3:49")]
    #[case(3_725_000, "62:05")]
    fn track_time_is_minutes_and_padded_seconds(#[case] millis: u64, #[case] expected: &str) {
        let s = song(Some(1), Some("Brown Sugar"), Some(millis));
        assert_eq!(s.track_time().as_deref(), Some(expected));
    }

    #[test]
    fn track_time_is_absent_without_millis() {
        assert_eq!(song(Some(1), Some("Sway"), None).track_time(), None);
    }

    #[test]
    fn incomplete_songs_are_not_displayed() {
        let raw = vec![
            Song::default(),
            song(Some(1), Some("Brown Sugar"), Some(229_493)),
            song(None, Some("Interview"), Some(61_000)),
            song(Some(3), None, None),
            song(Some(4), Some("Wild Horses"), None),
        ];

        let rows = displayable(&raw);

        assert_eq!(raw.len(), 5);
        assert_eq!(
            rows,
            vec![
                TrackRow {
                    number: 1,
                    name: "Brown Sugar".into(),
                    time: Some("3:49".into()),
                },
                TrackRow {
                    number: 4,
                    name: "Wild Horses".into(),
                    time: None,
                },
            ]
        );
        assert_eq!(rows.iter().map(TrackRow::key).collect::<Vec<_>>(), [1, 4]);
    }

    #[test]
    fn album_uses_itunes_field_names() {
        let album: Album = serde_json::from_str(
            r#"{"collectionId":1,"collectionName":"Sticky Fingers","artistName":"The Rolling Stones","artworkUrl100":"http://x/a.jpg","wrapperType":"collection"}"#,
        )
        .unwrap();
        assert_eq!(album.key(), 1);
        assert_eq!(album.artwork_url, "http://x/a.jpg");
    }
}
