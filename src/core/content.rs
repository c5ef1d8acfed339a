/// Content store — where story documents, the cast and image handles come from.
use rustc_hash::{FxHashMap, FxHashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::character::{AssetCatalog, Cast, CharacterRecord, ImageHandle};
use crate::schema::document::{DocumentError, StoryDocument};
use crate::schema::format::{ContentFormat, FormatError};
use crate::schema::scene::FileRef;

/// Image extensions picked up by the asset walk.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{what} is unavailable: {source}")]
    Unavailable {
        what: String,
        #[source]
        source: io::Error,
    },
    #[error("{what} is invalid: {source}")]
    Invalid {
        what: String,
        #[source]
        source: DocumentError,
    },
    #[error("character file {what} is invalid: {source}")]
    Character {
        what: String,
        #[source]
        source: FormatError,
    },
    #[error("'{0}' is not a valid file identifier")]
    BadIdentifier(String),
}

impl ContentError {
    /// Transient failures may succeed if the same load is attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(self, ContentError::Unavailable { .. })
    }
}

/// Supplies parsed story content by key.
pub trait ContentStore {
    fn load_chapter(&self, identifier: &str) -> Result<StoryDocument, ContentError>;

    fn load_ending(&self, identifier: &str) -> Result<StoryDocument, ContentError>;

    fn load_characters(&self) -> Result<Cast, ContentError>;

    fn load_assets(&self) -> Result<AssetCatalog, ContentError>;

    /// Load a file from the namespace its reference names.
    fn load(&self, file: &FileRef) -> Result<StoryDocument, ContentError> {
        match file {
            FileRef::Chapter(name) => self.load_chapter(name),
            FileRef::Ending(name) => self.load_ending(name),
        }
    }
}

/// Content laid out on disk:
///
/// ```text
/// <root>/story/chapter_1.ron        chapters (.ron or .json)
/// <root>/story/endings/<id>.ron     endings
/// <root>/characters/*.ron           one CharacterRecord per file
/// <root>/assets/**/<key>.png        images, keyed by file stem
/// ```
#[derive(Debug, Clone)]
pub struct DirContentStore {
    root: PathBuf,
}

impl DirContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn story_dir(&self) -> PathBuf {
        self.root.join("story")
    }

    pub fn endings_dir(&self) -> PathBuf {
        self.story_dir().join("endings")
    }

    /// Identifiers of every chapter and ending file present on disk.
    pub fn list_files(&self) -> Result<Vec<FileRef>, ContentError> {
        let mut files: Vec<FileRef> = list_stems(&self.story_dir())?
            .into_iter()
            .map(FileRef::Chapter)
            .collect();
        files.extend(list_stems(&self.endings_dir())?.into_iter().map(FileRef::Ending));
        Ok(files)
    }

    fn load_document(&self, dir: &Path, identifier: &str, what: String) -> Result<StoryDocument, ContentError> {
        if identifier.is_empty()
            || identifier.contains(|c: char| c == '/' || c == '\\')
            || identifier.starts_with('.')
        {
            return Err(ContentError::BadIdentifier(identifier.to_string()));
        }

        for format in ContentFormat::ALL {
            let path = dir.join(format!("{identifier}.{}", format.extension()));
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ContentError::Unavailable { what, source }),
            }
            tracing::debug!(path = %path.display(), "loading story document");
            return StoryDocument::load_from_path(&path).map_err(|e| match e {
                DocumentError::Format(FormatError::Io(source)) => {
                    if source.kind() == io::ErrorKind::NotFound {
                        ContentError::NotFound(what)
                    } else {
                        ContentError::Unavailable { what, source }
                    }
                }
                source => ContentError::Invalid { what, source },
            });
        }
        Err(ContentError::NotFound(what))
    }
}

impl ContentStore for DirContentStore {
    fn load_chapter(&self, identifier: &str) -> Result<StoryDocument, ContentError> {
        let what = FileRef::Chapter(identifier.to_string()).to_string();
        self.load_document(&self.story_dir(), identifier, what)
    }

    fn load_ending(&self, identifier: &str) -> Result<StoryDocument, ContentError> {
        let what = FileRef::Ending(identifier.to_string()).to_string();
        self.load_document(&self.endings_dir(), identifier, what)
    }

    fn load_characters(&self) -> Result<Cast, ContentError> {
        let dir = self.root.join("characters");
        let mut cast = Cast::default();
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no characters directory");
            return Ok(cast);
        }

        let entries = std::fs::read_dir(&dir).map_err(|source| ContentError::Unavailable {
            what: dir.display().to_string(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| ContentFormat::from_path(path).is_some())
            .collect();
        paths.sort();

        for path in paths {
            let record: CharacterRecord =
                ContentFormat::read_file(&path).map_err(|source| ContentError::Character {
                    what: path.display().to_string(),
                    source,
                })?;
            cast.insert(record.id.clone(), record);
        }
        Ok(cast)
    }

    fn load_assets(&self) -> Result<AssetCatalog, ContentError> {
        let mut catalog = AssetCatalog::default();
        collect_images(&self.root.join("assets"), &mut catalog)?;
        Ok(catalog)
    }
}

fn list_stems(dir: &Path) -> Result<Vec<String>, ContentError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| ContentError::Unavailable {
        what: dir.display().to_string(),
        source,
    })?;
    let mut stems: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && ContentFormat::from_path(path).is_some())
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    stems.sort();
    stems.dedup();
    Ok(stems)
}

/// Walk `dir` recursively, registering every image under its file stem.
fn collect_images(dir: &Path, catalog: &mut AssetCatalog) -> Result<(), ContentError> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| ContentError::Unavailable {
        what: dir.display().to_string(),
        source,
    })?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_images(&path, catalog)?;
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            catalog.insert(
                stem.to_string(),
                ImageHandle {
                    key: stem.to_string(),
                    location: path.clone(),
                },
            );
        }
    }
    Ok(())
}

/// In-memory content, for tests and for hosts that embed their story.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    chapters: FxHashMap<String, StoryDocument>,
    endings: FxHashMap<String, StoryDocument>,
    cast: Cast,
    assets: AssetCatalog,
    unavailable: FxHashSet<String>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapter(mut self, identifier: &str, document: StoryDocument) -> Self {
        self.chapters.insert(identifier.to_string(), document);
        self
    }

    pub fn with_ending(mut self, identifier: &str, document: StoryDocument) -> Self {
        self.endings.insert(identifier.to_string(), document);
        self
    }

    pub fn with_character(mut self, record: CharacterRecord) -> Self {
        self.cast.insert(record.id.clone(), record);
        self
    }

    /// Register an image handle whose location is its key.
    pub fn with_asset(mut self, key: &str) -> Self {
        self.assets.insert(
            key.to_string(),
            ImageHandle {
                key: key.to_string(),
                location: PathBuf::from(key),
            },
        );
        self
    }

    /// Make loads of `identifier` fail as if storage were momentarily down.
    pub fn set_unavailable(&mut self, identifier: &str, unavailable: bool) {
        if unavailable {
            self.unavailable.insert(identifier.to_string());
        } else {
            self.unavailable.remove(identifier);
        }
    }

    fn fetch(
        &self,
        table: &FxHashMap<String, StoryDocument>,
        file: FileRef,
    ) -> Result<StoryDocument, ContentError> {
        if self.unavailable.contains(file.name()) {
            return Err(ContentError::Unavailable {
                what: file.to_string(),
                source: io::Error::new(io::ErrorKind::WouldBlock, "storage busy"),
            });
        }
        table
            .get(file.name())
            .cloned()
            .ok_or_else(|| ContentError::NotFound(file.to_string()))
    }
}

impl ContentStore for MemoryContentStore {
    fn load_chapter(&self, identifier: &str) -> Result<StoryDocument, ContentError> {
        self.fetch(&self.chapters, FileRef::Chapter(identifier.to_string()))
    }

    fn load_ending(&self, identifier: &str) -> Result<StoryDocument, ContentError> {
        self.fetch(&self.endings, FileRef::Ending(identifier.to_string()))
    }

    fn load_characters(&self) -> Result<Cast, ContentError> {
        Ok(self.cast.clone())
    }

    fn load_assets(&self) -> Result<AssetCatalog, ContentError> {
        Ok(self.assets.clone())
    }
}
