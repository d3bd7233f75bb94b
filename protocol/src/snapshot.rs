use serde::{Deserialize, Serialize};

use crate::util::{lenient_secs, null_as_default};

/// One push from the server describing what is playing right now.
///
/// A missing or empty `title` means nothing is playing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Base64 encoded image bytes.
    pub album_art_base64: Option<String>,
    #[serde(deserialize_with = "lenient_secs")]
    pub position_secs: f64,
    #[serde(deserialize_with = "lenient_secs")]
    pub length_secs: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub is_playing: bool,
}

impl SongInfo {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref().filter(|a| !a.is_empty())
    }

    pub fn album_art(&self) -> Option<&str> {
        self.album_art_base64.as_deref().filter(|a| !a.is_empty())
    }

    pub fn is_nothing_playing(&self) -> bool {
        self.title().is_none()
    }
}
