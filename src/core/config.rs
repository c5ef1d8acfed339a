/// Engine configuration, read once at startup and passed in by value.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::format::{ContentFormat, FormatError};
use crate::schema::scene::{FileRef, StatMap};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Format(#[from] FormatError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Window geometry. The engine core never reads it; presenters do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub caption: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            caption: String::new(),
        }
    }
}

/// `start_chapter` may be a chapter number or a file identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChapterSpec {
    Number(u32),
    Name(String),
}

impl ChapterSpec {
    pub fn file(&self) -> FileRef {
        match self {
            Self::Number(n) => FileRef::chapter(*n),
            Self::Name(name) => FileRef::from_identifier(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub start_chapter: ChapterSpec,
    /// Default seconds per revealed character.
    pub text_speed: f64,
    #[serde(default)]
    pub debug_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub window: WindowConfig,
    pub engine_settings: EngineSettings,
    #[serde(default)]
    pub initial_scores: StatMap,
}

impl EngineConfig {
    /// A config starting at `start_chapter` with default everything else.
    pub fn new(start_chapter: &str, text_speed: f64) -> Self {
        Self {
            window: WindowConfig::default(),
            engine_settings: EngineSettings {
                start_chapter: ChapterSpec::Name(start_chapter.to_string()),
                text_speed,
                debug_mode: false,
            },
            initial_scores: StatMap::new(),
        }
    }

    pub fn with_initial_scores(mut self, scores: StatMap) -> Self {
        self.initial_scores = scores;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.engine_settings.debug_mode = debug_mode;
        self
    }

    pub fn load(path: &Path) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ContentFormat::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(format: ContentFormat, input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = format.parse(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let speed = self.engine_settings.text_speed;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "text_speed must be a positive number of seconds, got {speed}"
            )));
        }
        if let ChapterSpec::Name(name) = &self.engine_settings.start_chapter {
            if name.is_empty() {
                return Err(ConfigError::Invalid("start_chapter is empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn start_file(&self) -> FileRef {
        self.engine_settings.start_chapter.file()
    }

    pub fn text_speed(&self) -> f64 {
        self.engine_settings.text_speed
    }

    pub fn debug_mode(&self) -> bool {
        self.engine_settings.debug_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_original_json_shape() {
        let config = EngineConfig::parse(
            ContentFormat::Json,
            r#"{
                "window": {"width": 1280, "height": 720, "caption": "Torima"},
                "engine_settings": {"start_chapter": 1, "text_speed": 0.03, "debug_mode": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.start_file(), FileRef::chapter(1));
        assert!(config.debug_mode());
        assert!(config.initial_scores.is_empty());
        assert_eq!(config.window.caption, "Torima");
    }

    #[test]
    fn parse_ron_with_named_chapter_and_scores() {
        let config = EngineConfig::parse(
            ContentFormat::Ron,
            r#"(
                engine_settings: (start_chapter: "prologue", text_speed: 0.05),
                initial_scores: {"trust": 1},
            )"#,
        )
        .unwrap();
        assert_eq!(config.start_file(), FileRef::Chapter("prologue".to_string()));
        assert!(!config.debug_mode());
        assert_eq!(config.initial_scores.get("trust"), Some(&1));
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn missing_engine_settings_is_fatal() {
        let err = EngineConfig::parse(ContentFormat::Json, r#"{"window": {"width": 1, "height": 1}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Format(FormatError::Json(_))));
    }

    #[test]
    fn missing_text_speed_is_fatal() {
        assert!(EngineConfig::parse(
            ContentFormat::Json,
            r#"{"engine_settings": {"start_chapter": 1}}"#
        )
        .is_err());
    }

    #[test]
    fn zero_text_speed_is_invalid() {
        let err = EngineConfig::parse(
            ContentFormat::Json,
            r#"{"engine_settings": {"start_chapter": 1, "text_speed": 0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn builder_defaults() {
        let config = EngineConfig::new("chapter_3", 0.1).with_debug_mode(true);
        assert_eq!(config.start_file(), FileRef::chapter(3));
        assert!(config.validate().is_ok());
        assert!(config.debug_mode());
    }
}
