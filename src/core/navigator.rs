/// Navigator — applies destinations, loading other chapter and ending files
/// through the content store when a destination leaves the current one.
use std::sync::Arc;
use thiserror::Error;

use crate::core::content::{ContentError, ContentStore};
use crate::core::resolver::{resolve, ResolveError};
use crate::schema::document::StoryDocument;
use crate::schema::scene::{Destination, FileRef, Scene};

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("failed to load story file: {0}")]
    Load(#[from] ContentError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl NavigationError {
    pub fn is_transient(&self) -> bool {
        match self {
            NavigationError::Load(e) => e.is_transient(),
            NavigationError::Resolve(_) => false,
        }
    }
}

/// Where the player is: a loaded file and a scene that exists in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub file: FileRef,
    pub document: Arc<StoryDocument>,
    pub scene: String,
}

impl Position {
    pub fn scene(&self) -> Result<&Scene, ResolveError> {
        resolve(&self.document, &self.scene)
    }
}

/// Result of applying one destination.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Moved(Position),
    /// The destination carried no instruction.
    Stayed,
}

pub struct Navigator<'a, S: ContentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ContentStore + ?Sized> Navigator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load `file` and point at `scene`, or at the file's start scene.
    pub fn open(&self, file: &FileRef, scene: Option<&str>) -> Result<Position, NavigationError> {
        let document = self.store.load(file)?;
        let scene = match scene {
            Some(id) => resolve(&document, id)?.id.clone(),
            None => document.start().to_string(),
        };
        Ok(Position {
            file: file.clone(),
            document: Arc::new(document),
            scene,
        })
    }

    /// Compute the position `destination` leads to from `current`.
    ///
    /// Nothing is committed here: on error the caller still holds `current`
    /// untouched, which is what makes a failed navigation a full rejection.
    pub fn navigate(
        &self,
        current: &Position,
        destination: &Destination,
    ) -> Result<Navigation, NavigationError> {
        match destination {
            Destination::Stay => Ok(Navigation::Stayed),
            Destination::Scene(id) => {
                resolve(&current.document, id)?;
                Ok(Navigation::Moved(Position {
                    file: current.file.clone(),
                    document: Arc::clone(&current.document),
                    scene: id.clone(),
                }))
            }
            Destination::File { file, scene } => {
                self.open(file, scene.as_deref()).map(Navigation::Moved)
            }
        }
    }
}
