use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Emotion used when a scene does not name one.
pub const DEFAULT_EMOTION: &str = "default";

/// A member of the cast: display name plus emotion-keyed sprite assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: String,
    #[serde(alias = "display_name")]
    pub name: String,
    /// Emotion key to asset key.
    #[serde(default)]
    pub images: FxHashMap<String, String>,
}

impl CharacterRecord {
    /// The asset key for an emotion, falling back to the default emotion.
    pub fn image_for(&self, emotion: Option<&str>) -> Option<&str> {
        self.images
            .get(emotion.unwrap_or(DEFAULT_EMOTION))
            .map(String::as_str)
    }
}

/// An opaque reference to a loaded image. The presenter decides what
/// `location` means (a file path, a URL, an atlas entry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle {
    pub key: String,
    pub location: PathBuf,
}

pub type Cast = FxHashMap<String, CharacterRecord>;
pub type AssetCatalog = FxHashMap<String, ImageHandle>;
