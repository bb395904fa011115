use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub preview_url: Option<String>,
}

/// Title/artist pair sent to the chat page for each recommended track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
}

impl From<&Track> for SongInfo {
    fn from(track: &Track) -> Self {
        SongInfo {
            title: track.title.clone(),
            artist: track.artist.clone(),
        }
    }
}
