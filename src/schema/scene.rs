use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stat name to integer. Used for score deltas, requirement maps and
/// ledger snapshots.
pub type StatMap = BTreeMap<String, i64>;

/// File identifiers starting with this prefix live in the endings namespace.
pub const ENDING_PREFIX: &str = "ending";

/// Legacy marker: a `next_scene` of `chapter_<n>` means "jump to chapter n".
pub const CHAPTER_PREFIX: &str = "chapter_";

/// A loadable story file, tagged with the namespace it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileRef {
    Chapter(String),
    Ending(String),
}

impl FileRef {
    /// Classify a raw file identifier by its naming convention.
    pub fn from_identifier(identifier: &str) -> Self {
        if identifier.starts_with(ENDING_PREFIX) {
            Self::Ending(identifier.to_string())
        } else {
            Self::Chapter(identifier.to_string())
        }
    }

    /// The chapter file for a chapter number: `chapter_3`.
    pub fn chapter(number: u32) -> Self {
        Self::Chapter(format!("{CHAPTER_PREFIX}{number}"))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Chapter(name) | Self::Ending(name) => name,
        }
    }

    pub fn is_ending(&self) -> bool {
        matches!(self, Self::Ending(_))
    }

    /// The numbered chapter after this one, if this is a numbered chapter.
    pub fn next_chapter(&self) -> Option<FileRef> {
        match self {
            Self::Chapter(name) => chapter_number(name)
                .and_then(|n| n.checked_add(1))
                .map(Self::chapter),
            Self::Ending(_) => None,
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chapter(name) => write!(f, "chapter '{name}'"),
            Self::Ending(name) => write!(f, "ending '{name}'"),
        }
    }
}

/// Parse the number out of a `chapter_<n>` identifier.
pub fn chapter_number(identifier: &str) -> Option<u32> {
    identifier.strip_prefix(CHAPTER_PREFIX)?.parse().ok()
}

/// Where progression goes next. Decoded once, when content is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// The destination carries no instruction.
    Stay,
    /// Another scene of the same story document.
    Scene(String),
    /// A scene of another file; `None` means that file's start scene.
    File { file: FileRef, scene: Option<String> },
}

impl Destination {
    /// Decode the `next_file` / `next_scene` pair of a content record.
    ///
    /// `is_local` answers whether a scene id exists in the document being
    /// loaded, so a real scene named like a chapter marker is not mistaken
    /// for a chapter jump.
    pub fn decode(
        next_file: Option<&str>,
        next_scene: Option<&str>,
        is_local: &dyn Fn(&str) -> bool,
    ) -> Destination {
        match (next_file, next_scene) {
            (Some(file), scene) => Destination::File {
                file: FileRef::from_identifier(file),
                scene: scene.map(str::to_string),
            },
            (None, Some(scene)) if chapter_number(scene).is_some() && !is_local(scene) => {
                Destination::File {
                    file: FileRef::Chapter(scene.to_string()),
                    scene: None,
                }
            }
            (None, Some(scene)) => Destination::Scene(scene.to_string()),
            (None, None) => Destination::Stay,
        }
    }

    pub fn is_stay(&self) -> bool {
        matches!(self, Destination::Stay)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stay => write!(f, "(no destination)"),
            Destination::Scene(id) => write!(f, "scene '{id}'"),
            Destination::File { file, scene: Some(id) } => write!(f, "scene '{id}' of {file}"),
            Destination::File { file, scene: None } => write!(f, "start of {file}"),
        }
    }
}

/// A selectable option presented at the end of a dialogue scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub score_change: StatMap,
    pub destination: Destination,
}

/// One guarded arm of a score check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub requires: StatMap,
    pub destination: Destination,
}

/// The transition-bearing part of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneBody {
    Dialogue {
        next: Option<Destination>,
        choices: Vec<Choice>,
    },
    ScoreCheck {
        conditions: Vec<Condition>,
        default: Option<Destination>,
    },
    Checkpoint {
        requires: StatMap,
        pass: Destination,
        fail: Destination,
    },
    Ending {
        name: String,
    },
}

/// How the progression state machine handles a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKind {
    Dialogue,
    ScoreCheck,
    Checkpoint,
    Ending,
    /// A dialogue scene with neither a next scene nor choices.
    Malformed,
}

impl SceneKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::ScoreCheck => "score_check",
            Self::Checkpoint => "checkpoint",
            Self::Ending => "ending",
            Self::Malformed => "malformed",
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::ScoreCheck | Self::Checkpoint)
    }
}

/// One node of the story graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub speaker: Option<String>,
    /// Raw text; may contain pause markers.
    pub text: String,
    pub emotion: Option<String>,
    pub background: Option<String>,
    /// Seconds per character, overriding the configured default.
    pub text_speed: Option<f64>,
    pub fade: bool,
    pub zoom: Option<f32>,
    /// The declared `type` when it was not one the engine knows; such a
    /// scene is played as dialogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_type: Option<String>,
    pub body: SceneBody,
}

impl Scene {
    pub fn kind(&self) -> SceneKind {
        match &self.body {
            SceneBody::Dialogue { next: None, choices } if choices.is_empty() => {
                SceneKind::Malformed
            }
            SceneBody::Dialogue { .. } => SceneKind::Dialogue,
            SceneBody::ScoreCheck { .. } => SceneKind::ScoreCheck,
            SceneBody::Checkpoint { .. } => SceneKind::Checkpoint,
            SceneBody::Ending { .. } => SceneKind::Ending,
        }
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.body {
            SceneBody::Dialogue { choices, .. } => choices,
            _ => &[],
        }
    }

    /// Every destination this scene can lead to, in declaration order.
    pub fn destinations(&self) -> Vec<&Destination> {
        match &self.body {
            SceneBody::Dialogue { next, choices } => next
                .iter()
                .chain(choices.iter().map(|c| &c.destination))
                .collect(),
            SceneBody::ScoreCheck {
                conditions,
                default,
            } => conditions
                .iter()
                .map(|c| &c.destination)
                .chain(default.iter())
                .collect(),
            SceneBody::Checkpoint { pass, fail, .. } => vec![pass, fail],
            SceneBody::Ending { .. } => Vec::new(),
        }
    }

    /// A branch scene with nothing to show is resolved on entry.
    pub fn resolves_on_entry(&self) -> bool {
        self.kind().is_branch() && self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue(next: Option<Destination>, choices: Vec<Choice>) -> Scene {
        Scene {
            id: "s".to_string(),
            speaker: None,
            text: "Hello".to_string(),
            emotion: None,
            background: None,
            text_speed: None,
            fade: false,
            zoom: None,
            unknown_type: None,
            body: SceneBody::Dialogue { next, choices },
        }
    }

    #[test]
    fn file_ref_namespaces() {
        assert_eq!(
            FileRef::from_identifier("ending_good"),
            FileRef::Ending("ending_good".to_string())
        );
        assert_eq!(
            FileRef::from_identifier("chapter_2"),
            FileRef::Chapter("chapter_2".to_string())
        );
        assert!(FileRef::from_identifier("ending_bad").is_ending());
    }

    #[test]
    fn next_chapter_increments_number() {
        assert_eq!(FileRef::chapter(1).next_chapter(), Some(FileRef::chapter(2)));
        assert_eq!(FileRef::Chapter("prologue".to_string()).next_chapter(), None);
        assert_eq!(FileRef::Ending("ending_1".to_string()).next_chapter(), None);
    }

    #[test]
    fn decode_plain_scene() {
        let d = Destination::decode(None, Some("hallway"), &|_| false);
        assert_eq!(d, Destination::Scene("hallway".to_string()));
    }

    #[test]
    fn decode_legacy_chapter_marker() {
        let d = Destination::decode(None, Some("chapter_2"), &|_| false);
        assert_eq!(
            d,
            Destination::File {
                file: FileRef::chapter(2),
                scene: None
            }
        );
    }

    #[test]
    fn decode_chapter_marker_shadowed_by_local_scene() {
        let d = Destination::decode(None, Some("chapter_2"), &|id| id == "chapter_2");
        assert_eq!(d, Destination::Scene("chapter_2".to_string()));
    }

    #[test]
    fn decode_ending_file_with_scene() {
        let d = Destination::decode(Some("ending_true"), Some("epilogue"), &|_| false);
        assert_eq!(
            d,
            Destination::File {
                file: FileRef::Ending("ending_true".to_string()),
                scene: Some("epilogue".to_string())
            }
        );
    }

    #[test]
    fn decode_nothing_is_stay() {
        assert!(Destination::decode(None, None, &|_| true).is_stay());
    }

    #[test]
    fn dialogue_without_transitions_is_malformed() {
        assert_eq!(dialogue(None, Vec::new()).kind(), SceneKind::Malformed);
        assert_eq!(
            dialogue(Some(Destination::Scene("b".to_string())), Vec::new()).kind(),
            SceneKind::Dialogue
        );
    }

    #[test]
    fn destinations_cover_next_and_choices() {
        let scene = dialogue(
            Some(Destination::Scene("b".to_string())),
            vec![Choice {
                text: "Go".to_string(),
                score_change: StatMap::new(),
                destination: Destination::Scene("c".to_string()),
            }],
        );
        assert_eq!(scene.destinations().len(), 2);
        assert_eq!(scene.choices().len(), 1);
        assert!(!scene.resolves_on_entry());
    }
}
