use protocol::SongInfo;
use tokio::time::Instant;

/// A [SongInfo] as accepted by the engine, stamped with when it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_art: Option<String>,
    pub position_secs: f64,
    pub length_secs: f64,
    pub is_playing: bool,
    pub received_at: Instant,
}

impl PlaybackSnapshot {
    pub fn received(info: SongInfo, received_at: Instant) -> Self {
        let title = info.title().map(str::to_string);
        let artist = info.artist().map(str::to_string);
        let album_art = info.album_art().map(str::to_string);
        Self {
            title,
            artist,
            album_art,
            position_secs: protocol::util::secs_or_zero(info.position_secs),
            length_secs: protocol::util::secs_or_zero(info.length_secs),
            is_playing: info.is_playing,
            received_at,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Artwork as something an image slot can show.
    pub fn art_source(&self) -> Option<String> {
        self.album_art
            .as_ref()
            .map(|b64| format!("data:image/png;base64,{}", b64))
    }
}
