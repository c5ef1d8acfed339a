/// Static checks over a whole story: every file, every destination, the cast.
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use crate::schema::character::Cast;
use crate::schema::document::StoryDocument;
use crate::schema::scene::{Destination, FileRef, SceneBody, SceneKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub file: FileRef,
    pub scene: Option<String>,
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scene {
            Some(scene) => write!(f, "{} / {}: {}", self.file, scene, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn error(&mut self, file: &FileRef, scene: &str, message: String) {
        self.errors.push(LintIssue {
            file: file.clone(),
            scene: Some(scene.to_string()),
            message,
        });
    }

    fn warning(&mut self, file: &FileRef, scene: &str, message: String) {
        self.warnings.push(LintIssue {
            file: file.clone(),
            scene: Some(scene.to_string()),
            message,
        });
    }
}

/// Check every scene of every file against the rest of the story.
///
/// Errors are things that would stop a playthrough: destinations that do
/// not resolve, dead ends, score checks that can fall through. Warnings are
/// suspicious but playable: unreachable scenes, unknown scene types,
/// speakers missing from the cast, choices that lead nowhere.
pub fn lint_story(files: &[(FileRef, StoryDocument)], cast: &Cast) -> LintReport {
    let mut report = LintReport::default();
    let by_file: FxHashMap<&FileRef, &StoryDocument> =
        files.iter().map(|(file, doc)| (file, doc)).collect();

    // Scenes entered from other files, which count as reachable roots.
    let mut entry_points: FxHashMap<&FileRef, FxHashSet<&str>> = FxHashMap::default();

    for (file, document) in files {
        for scene in document.scenes() {
            match scene.kind() {
                SceneKind::Malformed => report.error(
                    file,
                    &scene.id,
                    "dead end: no next scene, choices or ending".to_string(),
                ),
                SceneKind::ScoreCheck => {
                    if let SceneBody::ScoreCheck {
                        conditions,
                        default: None,
                    } = &scene.body
                    {
                        let catch_all = conditions.last().is_some_and(|c| c.requires.is_empty());
                        if !catch_all {
                            report.error(
                                file,
                                &scene.id,
                                "score check has no default destination".to_string(),
                            );
                        }
                    }
                }
                _ => {}
            }

            if let Some(kind) = &scene.unknown_type {
                report.warning(file, &scene.id, format!("unknown scene type '{kind}'"));
            }

            if let Some(speaker) = &scene.speaker {
                if !cast.contains_key(speaker) {
                    report.warning(file, &scene.id, format!("unknown speaker '{speaker}'"));
                }
            }

            for choice in scene.choices() {
                if choice.destination.is_stay() {
                    report.warning(
                        file,
                        &scene.id,
                        format!("choice '{}' has no destination", choice.text),
                    );
                }
            }

            for destination in scene.destinations() {
                match destination {
                    Destination::Stay => {}
                    Destination::Scene(id) => {
                        if !document.contains(id) {
                            report.error(file, &scene.id, format!("dangling destination {destination}"));
                        }
                    }
                    Destination::File { file: target, scene: entry } => {
                        let Some(target_doc) = by_file.get(target) else {
                            report.error(file, &scene.id, format!("unresolved destination {destination}"));
                            continue;
                        };
                        let entry = entry.as_deref().unwrap_or(target_doc.start());
                        if target_doc.contains(entry) {
                            entry_points.entry(target).or_default().insert(entry);
                        } else {
                            report.error(file, &scene.id, format!("dangling destination {destination}"));
                        }
                    }
                }
            }
        }
    }

    for (file, document) in files {
        let mut roots: Vec<&str> = vec![document.start()];
        if let Some(entries) = entry_points.get(file) {
            roots.extend(entries.iter().copied());
        }
        let reachable = reachable_scenes(document, roots);
        for scene in document.scenes() {
            if !reachable.contains(scene.id.as_str()) {
                report.warning(file, &scene.id, "scene is unreachable".to_string());
            }
        }
    }

    report
}

/// Scenes reachable from `roots` by same-file moves.
fn reachable_scenes<'a>(document: &'a StoryDocument, roots: Vec<&'a str>) -> FxHashSet<&'a str> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut stack = roots;
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(scene) = document.get(id) else {
            continue;
        };
        for destination in scene.destinations() {
            if let Destination::Scene(next) = destination {
                stack.push(next.as_str());
            }
        }
    }
    seen
}
