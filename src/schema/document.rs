/// Story documents — the scene table of one chapter or ending file.
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::format::{ContentFormat, FormatError};
use super::scene::{Choice, Condition, Destination, Scene, SceneBody, StatMap};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("invalid story document: {0}")]
    Invalid(String),
}

/// All scenes of one loaded file. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryDocument {
    /// Scene ids in file order; the first one is the start scene.
    order: Vec<String>,
    scenes: FxHashMap<String, Scene>,
}

impl StoryDocument {
    /// Build a document from typed scenes. The first scene is the start.
    pub fn from_scenes(scenes: Vec<Scene>) -> Result<StoryDocument, DocumentError> {
        if scenes.is_empty() {
            return Err(DocumentError::Invalid("document has no scenes".to_string()));
        }
        let mut order = Vec::with_capacity(scenes.len());
        let mut table = FxHashMap::default();
        for scene in scenes {
            if table.contains_key(&scene.id) {
                return Err(DocumentError::Invalid(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
            order.push(scene.id.clone());
            table.insert(scene.id.clone(), scene);
        }
        Ok(StoryDocument {
            order,
            scenes: table,
        })
    }

    pub fn parse(format: ContentFormat, input: &str) -> Result<StoryDocument, DocumentError> {
        let raw: RawDocument = format.parse(input)?;
        Self::from_raw(raw)
    }

    pub fn parse_ron(input: &str) -> Result<StoryDocument, DocumentError> {
        Self::parse(ContentFormat::Ron, input)
    }

    pub fn parse_json(input: &str) -> Result<StoryDocument, DocumentError> {
        Self::parse(ContentFormat::Json, input)
    }

    pub fn load_from_path(path: &Path) -> Result<StoryDocument, DocumentError> {
        let raw: RawDocument = ContentFormat::read_file(path)?;
        Self::from_raw(raw)
    }

    /// The canonical start scene id: the first scene declared in the file.
    pub fn start(&self) -> &str {
        // from_scenes guarantees at least one entry
        self.order.first().map(String::as_str).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Scenes in file order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.order.iter().filter_map(|id| self.scenes.get(id))
    }

    fn from_raw(raw: RawDocument) -> Result<StoryDocument, DocumentError> {
        let ids: FxHashSet<String> = raw.0.iter().map(|(id, _)| id.clone()).collect();
        let is_local = |id: &str| ids.contains(id);

        let mut scenes = Vec::with_capacity(raw.0.len());
        for (id, scene) in raw.0 {
            scenes.push(scene.into_scene(id, &is_local)?);
        }
        Self::from_scenes(scenes)
    }
}

// Content files use a flatter shape than the typed schema (the `type` tag,
// `next_scene`/`next_file` pairs), so they go through these raw structs.

/// Scene table that keeps file order, which a plain map would lose.
struct RawDocument(Vec<(String, RawScene)>);

impl<'de> Deserialize<'de> for RawDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SceneTable;

        impl<'de> Visitor<'de> for SceneTable {
            type Value = RawDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from scene id to scene")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawDocument, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, RawScene>()? {
                    entries.push(entry);
                }
                Ok(RawDocument(entries))
            }
        }

        deserializer.deserialize_map(SceneTable)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDestination {
    #[serde(default)]
    next_scene: Option<String>,
    #[serde(default)]
    next_file: Option<String>,
}

impl RawDestination {
    fn decode(&self, is_local: &dyn Fn(&str) -> bool) -> Destination {
        Destination::decode(
            self.next_file.as_deref(),
            self.next_scene.as_deref(),
            is_local,
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    text: String,
    #[serde(default, alias = "scores")]
    score_change: StatMap,
    #[serde(default)]
    next_scene: Option<String>,
    #[serde(default)]
    next_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    #[serde(default)]
    requires: StatMap,
    #[serde(default)]
    next_scene: Option<String>,
    #[serde(default)]
    next_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawScene {
    #[serde(default, rename = "type", alias = "kind")]
    kind: Option<String>,
    #[serde(default)]
    speaker: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default, alias = "sprites")]
    emotion: Option<String>,
    #[serde(default, alias = "bg_image")]
    background: Option<String>,
    #[serde(default)]
    next_scene: Option<String>,
    #[serde(default)]
    next_file: Option<String>,
    #[serde(default)]
    choices: Vec<RawChoice>,
    #[serde(default)]
    text_speed: Option<f64>,
    #[serde(default)]
    fade: bool,
    #[serde(default)]
    zoom: Option<f32>,
    #[serde(default)]
    conditions: Vec<RawCondition>,
    #[serde(default)]
    default: Option<RawDestination>,
    #[serde(default)]
    requires: StatMap,
    #[serde(default)]
    pass: Option<RawDestination>,
    #[serde(default)]
    fail: Option<RawDestination>,
    #[serde(default)]
    name: Option<String>,
}

impl RawScene {
    fn into_scene(self, id: String, is_local: &dyn Fn(&str) -> bool) -> Result<Scene, DocumentError> {
        if let Some(speed) = self.text_speed {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(DocumentError::Invalid(format!(
                    "scene '{id}' has non-positive text_speed {speed}"
                )));
            }
        }

        let mut unknown_type = None;
        let body = match self.kind.as_deref().unwrap_or("dialogue") {
            "score_check" => SceneBody::ScoreCheck {
                conditions: self
                    .conditions
                    .into_iter()
                    .map(|c| Condition {
                        destination: Destination::decode(
                            c.next_file.as_deref(),
                            c.next_scene.as_deref(),
                            is_local,
                        ),
                        requires: c.requires,
                    })
                    .collect(),
                default: self.default.map(|d| d.decode(is_local)),
            },
            "checkpoint" => match (self.pass, self.fail) {
                (Some(pass), Some(fail)) => SceneBody::Checkpoint {
                    requires: self.requires,
                    pass: pass.decode(is_local),
                    fail: fail.decode(is_local),
                },
                _ => {
                    return Err(DocumentError::Invalid(format!(
                        "checkpoint '{id}' needs both a pass and a fail destination"
                    )))
                }
            },
            "ending" => SceneBody::Ending {
                name: self.name.unwrap_or_else(|| id.clone()),
            },
            other => {
                if other != "dialogue" {
                    tracing::warn!(scene = %id, kind = other, "unknown scene type, treating as dialogue");
                    unknown_type = Some(other.to_string());
                }
                let next = Destination::decode(
                    self.next_file.as_deref(),
                    self.next_scene.as_deref(),
                    is_local,
                );
                SceneBody::Dialogue {
                    next: (!next.is_stay()).then_some(next),
                    choices: self
                        .choices
                        .into_iter()
                        .map(|c| Choice {
                            destination: Destination::decode(
                                c.next_file.as_deref(),
                                c.next_scene.as_deref(),
                                is_local,
                            ),
                            text: c.text,
                            score_change: c.score_change,
                        })
                        .collect(),
                }
            }
        };

        Ok(Scene {
            id,
            speaker: self.speaker,
            text: self.text,
            emotion: self.emotion,
            background: self.background,
            text_speed: self.text_speed,
            fade: self.fade,
            zoom: self.zoom,
            unknown_type,
            body,
        })
    }
}
