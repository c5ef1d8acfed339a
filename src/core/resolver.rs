/// Scene graph lookup and classification.
use thiserror::Error;

use crate::schema::document::StoryDocument;
use crate::schema::scene::{Scene, SceneKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("scene '{0}' not found in the loaded story document")]
    SceneNotFound(String),
}

/// Look a scene up by id. A miss is a content error; nothing is substituted.
pub fn resolve<'a>(document: &'a StoryDocument, scene_id: &str) -> Result<&'a Scene, ResolveError> {
    document
        .get(scene_id)
        .ok_or_else(|| ResolveError::SceneNotFound(scene_id.to_string()))
}

pub fn classify(scene: &Scene) -> SceneKind {
    scene.kind()
}
