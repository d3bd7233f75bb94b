pub mod config;
pub mod snapshot;
pub mod util;

pub use config::{Anchor, DisplayConfig, Theme, TransitionAnimation};
pub use snapshot::SongInfo;

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct MessageError(#[from] serde_json::Error);

impl SongInfo {
    pub fn serialize(&self) -> Result<String, MessageError> {
        serde_json::to_string(self).map_err(|e| e.into())
    }

    pub fn deserialize(text: &str) -> Result<Self, MessageError> {
        serde_json::from_str(text).map_err(|e| e.into())
    }
}

impl DisplayConfig {
    pub fn serialize(&self) -> Result<String, MessageError> {
        serde_json::to_string_pretty(self).map_err(|e| e.into())
    }

    pub fn deserialize(text: &str) -> Result<Self, MessageError> {
        serde_json::from_str(text).map_err(|e| e.into())
    }
}
