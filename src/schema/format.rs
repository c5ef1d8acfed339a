/// Content file formats — RON and JSON, picked by file extension.
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported content format: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFormat {
    Ron,
    Json,
}

impl ContentFormat {
    /// Extensions tried, in order, when looking a file up by stem.
    pub const ALL: [ContentFormat; 2] = [ContentFormat::Ron, ContentFormat::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ron => "ron",
            Self::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<ContentFormat> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("ron") => Some(Self::Ron),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }

    pub fn parse<T: DeserializeOwned>(&self, input: &str) -> Result<T, FormatError> {
        match self {
            Self::Ron => Ok(ron::from_str(input)?),
            Self::Json => Ok(serde_json::from_str(input)?),
        }
    }

    /// Read and parse a file, choosing the format from its extension.
    pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, FormatError> {
        let format = Self::from_path(path)
            .ok_or_else(|| FormatError::Unsupported(path.display().to_string()))?;
        let contents = std::fs::read_to_string(path)?;
        format.parse(&contents)
    }
}
