/// Progression state machine — owns the playthrough state and drives the
/// ledger, typewriter, branch evaluator and navigator from input and ticks.
///
/// Phases:
///
/// ```text
/// Revealing ──click, text incomplete──────────▶ Revealing (skip to end)
/// Revealing ──click, complete, has choices────▶ AwaitingChoice
/// Revealing ──click, complete, next / branch──▶ Revealing (new scene)
/// Revealing ──click, complete, ending─────────▶ Terminal
/// Revealing ──click, complete, dead end───────▶ Terminal (reported)
/// AwaitingChoice ──choice─────────────────────▶ Revealing (new scene)
/// ```
///
/// Every move is planned first and committed only when it fully succeeds.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::branch::{self, BranchError};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::content::{ContentError, ContentStore};
use crate::core::input::{InputEvent, KeyCode};
use crate::core::ledger::ScoreLedger;
use crate::core::navigator::{Navigation, NavigationError, Navigator, Position};
use crate::core::presenter::{ChoiceLayout, Presenter, RenderSnapshot};
use crate::core::resolver::{self, ResolveError};
use crate::core::typewriter::{self, Typewriter};
use crate::schema::character::{AssetCatalog, Cast};
use crate::schema::scene::{Choice, Destination, FileRef, Scene, SceneBody, SceneKind, StatMap};

/// Longest chain of branch scenes followed within one move.
pub const MAX_BRANCH_HOPS: usize = 32;

/// Fade level lost per second after entering a fading scene.
pub const FADE_DECAY_PER_SECOND: f32 = 2.0;

/// Display name for a speaker id missing from the cast.
pub const UNKNOWN_SPEAKER: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Revealing,
    AwaitingChoice,
    Terminal,
}

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Branch(#[from] BranchError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("scene '{scene}' of {file} has no next scene, choices or ending")]
    DeadEnd { file: FileRef, scene: String },
    #[error("more than {hops} chained branch scenes after '{scene}'")]
    BranchLoop { scene: String, hops: usize },
    #[error("branch scene '{0}' chose a destination with no scene or file")]
    EmptyBranch(String),
}

impl ProgressionError {
    /// Transient errors leave the machine where it was; the rest end the run.
    pub fn is_transient(&self) -> bool {
        match self {
            ProgressionError::Navigation(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Failures that stop the engine from being built at all.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot load start content: {0}")]
    Content(#[from] ContentError),
    #[error("cannot enter start scene: {0}")]
    Progression(#[from] ProgressionError),
}

/// An operator-visible event, drained by the host with `take_reports`.
#[derive(Debug)]
pub enum Report {
    Warning(String),
    Failure(ProgressionError),
    ScoreDump(StatMap),
}

impl Report {
    pub fn level(&self) -> &'static str {
        match self {
            Report::Warning(_) => "warning",
            Report::Failure(e) if e.is_transient() => "warning",
            Report::Failure(_) => "error",
            Report::ScoreDump(_) => "info",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Warning(message) => f.write_str(message),
            Report::Failure(error) => write!(f, "{error}"),
            Report::ScoreDump(scores) => {
                f.write_str("scores:")?;
                if scores.is_empty() {
                    return f.write_str(" (none)");
                }
                for (stat, value) in scores {
                    write!(f, " {stat}={value}")?;
                }
                Ok(())
            }
        }
    }
}

/// What a click on the current scene should do, decided before mutating.
enum Step {
    Reveal,
    Offer(Vec<Choice>),
    Go(Destination),
    Finish(String),
    Fail(ProgressionError),
}

pub struct ProgressionStateMachine<S: ContentStore> {
    config: EngineConfig,
    store: S,
    cast: Cast,
    assets: AssetCatalog,
    ledger: ScoreLedger,
    position: Position,
    typewriter: Typewriter,
    pending: Vec<Choice>,
    hover: Option<usize>,
    fade: f32,
    zoom: f32,
    phase: Phase,
    reports: Vec<Report>,
}

impl<S: ContentStore> ProgressionStateMachine<S> {
    /// Validate the config, load the cast and the start chapter, and enter
    /// its start scene.
    pub fn new(config: EngineConfig, store: S) -> Result<Self, StartupError> {
        config.validate()?;
        let cast = store.load_characters()?;
        let assets = store.load_assets()?;
        let ledger = ScoreLedger::from_initial(&config.initial_scores);

        let start_file = config.start_file();
        let position = {
            let navigator = Navigator::new(&store);
            let opened = navigator.open(&start_file, None).map_err(|e| match e {
                NavigationError::Load(e) => StartupError::Content(e),
                other => StartupError::Progression(other.into()),
            })?;
            settle(&navigator, &ledger, opened)?
        };
        tracing::info!(
            file = %position.file,
            scene = %position.scene,
            characters = cast.len(),
            assets = assets.len(),
            "engine started"
        );

        let mut machine = Self {
            config,
            store,
            cast,
            assets,
            ledger,
            position,
            typewriter: Typewriter::new(),
            pending: Vec::new(),
            hover: None,
            fade: 0.0,
            zoom: 1.0,
            phase: Phase::Revealing,
            reports: Vec::new(),
        };
        machine.reset_scene_state();
        Ok(machine)
    }

    /// Process one frame: input in arrival order, then the clock, then draw.
    pub fn frame<P: Presenter + ?Sized>(
        &mut self,
        delta: f64,
        events: &[InputEvent],
        presenter: &mut P,
    ) {
        for event in events {
            self.handle_input(*event, &*presenter);
        }
        self.tick(delta);
        presenter.present(&self.snapshot());
    }

    pub fn handle_input<L: ChoiceLayout + ?Sized>(&mut self, event: InputEvent, layout: &L) {
        match (event, self.phase) {
            (_, Phase::Terminal) => {}
            (InputEvent::PointerMove { x, y }, Phase::AwaitingChoice) => {
                self.hover(layout.hit_test(self.pending.len(), x, y));
            }
            (InputEvent::PointerMove { .. }, Phase::Revealing) => {}
            (InputEvent::PointerDown { x, y }, Phase::AwaitingChoice) => {
                if let Some(index) = layout.hit_test(self.pending.len(), x, y) {
                    self.select_choice(index);
                }
            }
            (InputEvent::PointerDown { .. }, Phase::Revealing) => self.advance(),
            (InputEvent::KeyDown(key), _) => {
                if !self.config.debug_mode() {
                    return;
                }
                match key {
                    KeyCode::Space => self.force_next_chapter(),
                    KeyCode::Char('s') => self.dump_scores(),
                    KeyCode::Char(_) => {}
                }
            }
        }
    }

    /// The click: finish the reveal, or act on a fully revealed scene.
    pub fn advance(&mut self) {
        if self.phase != Phase::Revealing {
            return;
        }
        let step = match self.position.scene() {
            Err(e) => Step::Fail(e.into()),
            Ok(scene) if !self.typewriter.is_complete(&scene.text) => Step::Reveal,
            Ok(scene) => self.step_for(scene),
        };

        match step {
            Step::Reveal => {
                if let Ok(scene) = self.position.scene() {
                    self.typewriter.skip_to_end(&scene.text);
                }
            }
            Step::Offer(choices) => {
                self.pending = choices;
                self.hover = None;
                self.phase = Phase::AwaitingChoice;
            }
            Step::Go(destination) => self.travel(&destination),
            Step::Finish(name) => {
                tracing::info!(file = %self.position.file, ending = %name, "story finished");
                self.phase = Phase::Terminal;
            }
            Step::Fail(error) => self.fail(error),
        }
    }

    fn step_for(&self, scene: &Scene) -> Step {
        match (&scene.body, resolver::classify(scene)) {
            (_, SceneKind::Malformed) => Step::Fail(ProgressionError::DeadEnd {
                file: self.position.file.clone(),
                scene: scene.id.clone(),
            }),
            (SceneBody::Dialogue { choices, .. }, _) if !choices.is_empty() => {
                Step::Offer(choices.clone())
            }
            (SceneBody::Dialogue { next: Some(next), .. }, _) => Step::Go(next.clone()),
            (SceneBody::Ending { name }, _) => Step::Finish(name.clone()),
            _ => match branch::evaluate(scene, &self.ledger) {
                Ok(Destination::Stay) => Step::Fail(ProgressionError::EmptyBranch(scene.id.clone())),
                Ok(destination) => {
                    tracing::debug!(scene = %scene.id, to = %destination, "branch evaluated");
                    Step::Go(destination.clone())
                }
                Err(e) => Step::Fail(e.into()),
            },
        }
    }

    /// Pick a pending choice: apply its score change, then follow it.
    /// The score change stays applied even if the move fails.
    pub fn select_choice(&mut self, index: usize) {
        if self.phase != Phase::AwaitingChoice {
            return;
        }
        let Some(choice) = self.pending.get(index).cloned() else {
            return;
        };
        tracing::debug!(scene = %self.position.scene, choice = %choice.text, "choice selected");
        self.ledger.apply(&choice.score_change);
        self.travel(&choice.destination);
    }

    /// Set the hovered choice. Ignored unless a choice is pending.
    pub fn hover(&mut self, index: Option<usize>) {
        if self.phase == Phase::AwaitingChoice {
            self.hover = index.filter(|i| *i < self.pending.len());
        }
    }

    /// Advance the reveal and the fade by `delta` seconds.
    pub fn tick(&mut self, delta: f64) {
        if self.phase == Phase::Revealing {
            if let Ok(scene) = self.position.scene() {
                let speed = scene.text_speed.unwrap_or(self.config.text_speed());
                self.typewriter.tick(delta, &scene.text, speed);
            }
        }
        if self.typewriter.revealed() > 1 {
            self.fade = 0.0;
        } else if delta.is_finite() && delta > 0.0 {
            self.fade = (self.fade - FADE_DECAY_PER_SECOND * delta as f32).max(0.0);
        }
    }

    /// Debug affordance: jump to the start of the next numbered chapter.
    /// A failure is only a warning; the current scene is kept.
    pub fn force_next_chapter(&mut self) {
        if self.phase == Phase::Terminal {
            return;
        }
        let Some(next) = self.position.file.next_chapter() else {
            self.warn(format!("{} is not a numbered chapter", self.position.file));
            return;
        };
        let destination = Destination::File {
            file: next.clone(),
            scene: None,
        };
        match self.plan(&destination) {
            Ok(Some(position)) => self.commit(position),
            Ok(None) => {}
            Err(e) => self.warn(format!("cannot skip to {next}: {e}")),
        }
    }

    /// Debug affordance: queue the current scores as a report.
    pub fn dump_scores(&mut self) {
        let scores = self.ledger.snapshot();
        tracing::info!(?scores, "score dump");
        self.reports.push(Report::ScoreDump(scores));
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let scene = self.position.scene().ok();
        let raw = scene.map(|s| s.text.as_str()).unwrap_or_default();
        let speaker = scene.and_then(|s| s.speaker.as_deref());
        let record = speaker.and_then(|id| self.cast.get(id));

        let speaker_name = match (speaker, record) {
            (None, _) => String::new(),
            (Some(_), Some(record)) => record.name.clone(),
            (Some(_), None) => UNKNOWN_SPEAKER.to_string(),
        };
        let sprite = record
            .and_then(|r| r.image_for(scene.and_then(|s| s.emotion.as_deref())))
            .and_then(|key| self.assets.get(key))
            .cloned();
        let background = scene
            .and_then(|s| s.background.as_deref())
            .and_then(|key| self.assets.get(key))
            .cloned();
        let ending = match scene.map(|s| &s.body) {
            Some(SceneBody::Ending { name }) if self.phase == Phase::Terminal => Some(name.clone()),
            _ => None,
        };

        RenderSnapshot {
            phase: self.phase,
            file: self.position.file.name().to_string(),
            scene_id: self.position.scene.clone(),
            display_text: typewriter::display_text(raw),
            visible_text: typewriter::visible_prefix(raw, self.typewriter.revealed()),
            revealed: self.typewriter.revealed(),
            reveal_complete: self.typewriter.is_complete(raw),
            speaker_name,
            sprite,
            background,
            fade_level: self.fade,
            zoom: self.zoom,
            pending_choices: self.pending.iter().map(|c| c.text.clone()).collect(),
            hover_index: self.hover,
            ending,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scene_id(&self) -> &str {
        &self.position.scene
    }

    pub fn file(&self) -> &FileRef {
        &self.position.file
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.position.scene().ok()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn revealed(&self) -> usize {
        self.typewriter.revealed()
    }

    pub fn pending_choices(&self) -> &[Choice] {
        &self.pending
    }

    pub fn hover_index(&self) -> Option<usize> {
        self.hover
    }

    pub fn fade_level(&self) -> f32 {
        self.fade
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cast(&self) -> &Cast {
        &self.cast
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Later navigations read from the store as modified.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Drain the queued reports, oldest first.
    pub fn take_reports(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }

    /// Follow `destination` and any branch scenes it lands on, then commit.
    fn travel(&mut self, destination: &Destination) {
        match self.plan(destination) {
            Ok(Some(position)) => self.commit(position),
            Ok(None) => self.warn(format!(
                "scene '{}' of {} points nowhere; staying put",
                self.position.scene, self.position.file
            )),
            Err(e) => self.fail(e),
        }
    }

    fn plan(&self, destination: &Destination) -> Result<Option<Position>, ProgressionError> {
        let navigator = Navigator::new(&self.store);
        match navigator.navigate(&self.position, destination)? {
            Navigation::Stayed => Ok(None),
            Navigation::Moved(position) => settle(&navigator, &self.ledger, position).map(Some),
        }
    }

    fn commit(&mut self, position: Position) {
        if position.file != self.position.file {
            tracing::info!(file = %position.file, scene = %position.scene, "entered story file");
        } else {
            tracing::debug!(file = %position.file, from = %self.position.scene, to = %position.scene, "scene change");
        }
        self.position = position;
        self.reset_scene_state();
    }

    fn reset_scene_state(&mut self) {
        self.typewriter.reset();
        self.pending.clear();
        self.hover = None;
        self.phase = Phase::Revealing;
        let (fade, zoom) = match self.position.scene() {
            Ok(scene) => (scene.fade, scene.zoom.unwrap_or(1.0)),
            Err(_) => (false, 1.0),
        };
        self.fade = if fade { 1.0 } else { 0.0 };
        self.zoom = zoom;
    }

    fn fail(&mut self, error: ProgressionError) {
        if error.is_transient() {
            tracing::warn!(scene = %self.position.scene, %error, "transient failure, state kept");
        } else {
            tracing::error!(file = %self.position.file, scene = %self.position.scene, %error, "content error, stopping");
            self.pending.clear();
            self.hover = None;
            self.phase = Phase::Terminal;
        }
        self.reports.push(Report::Failure(error));
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.reports.push(Report::Warning(message));
    }
}

/// Evaluate branch scenes that resolve on entry until a scene that waits
/// for the player is reached.
fn settle<S: ContentStore + ?Sized>(
    navigator: &Navigator<'_, S>,
    ledger: &ScoreLedger,
    mut position: Position,
) -> Result<Position, ProgressionError> {
    let entry = position.scene.clone();
    for _ in 0..=MAX_BRANCH_HOPS {
        let next = {
            let scene = position.scene()?;
            if !scene.resolves_on_entry() {
                return Ok(position);
            }
            let destination = branch::evaluate(scene, ledger)?;
            tracing::debug!(scene = %scene.id, to = %destination, "branch resolved on entry");
            match navigator.navigate(&position, destination)? {
                Navigation::Moved(next) => next,
                Navigation::Stayed => return Err(ProgressionError::EmptyBranch(scene.id.clone())),
            }
        };
        position = next;
    }
    Err(ProgressionError::BranchLoop {
        scene: entry,
        hops: MAX_BRANCH_HOPS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::MemoryContentStore;
    use crate::core::presenter::StackedChoiceLayout;
    use crate::schema::character::CharacterRecord;
    use crate::schema::document::StoryDocument;
    use rustc_hash::FxHashMap;

    fn doc(json: &str) -> StoryDocument {
        StoryDocument::parse_json(json).unwrap()
    }

    fn machine(chapter: &str) -> ProgressionStateMachine<MemoryContentStore> {
        let store = MemoryContentStore::new().with_chapter("chapter_1", doc(chapter));
        ProgressionStateMachine::new(EngineConfig::new("chapter_1", 0.1), store).unwrap()
    }

    #[test]
    fn click_skips_then_advances() {
        let mut m = machine(r#"{"a": {"text": "Hello", "next_scene": "b"}, "b": {"text": "Bye", "next_scene": "a"}}"#);
        m.tick(0.1);
        assert_eq!(m.revealed(), 1);
        m.advance();
        assert_eq!(m.revealed(), 5);
        assert_eq!(m.scene_id(), "a");
        m.advance();
        assert_eq!(m.scene_id(), "b");
        assert_eq!(m.revealed(), 0);
        assert_eq!(m.phase(), Phase::Revealing);
    }

    #[test]
    fn choices_wait_for_selection() {
        let mut m = machine(
            r#"{
                "ask": {"text": "?", "choices": [
                    {"text": "Yes", "score_change": {"trust": 2}, "next_scene": "ask"},
                    {"text": "No", "next_scene": "end"}
                ]},
                "end": {"type": "ending", "name": "Fin"}
            }"#,
        );
        m.advance();
        m.advance();
        assert_eq!(m.phase(), Phase::AwaitingChoice);
        assert_eq!(m.pending_choices().len(), 2);

        // the same click again is a no-op while a choice is pending
        m.advance();
        assert_eq!(m.phase(), Phase::AwaitingChoice);

        m.select_choice(0);
        assert_eq!(m.ledger().get("trust"), 2);
        assert_eq!(m.phase(), Phase::Revealing);
        assert!(m.pending_choices().is_empty());
    }

    #[test]
    fn ending_click_is_terminal() {
        let mut m = machine(r#"{"end": {"type": "ending", "name": "Fin", "text": "Over."}}"#);
        m.advance();
        assert_eq!(m.phase(), Phase::Revealing);
        m.advance();
        assert_eq!(m.phase(), Phase::Terminal);
        assert_eq!(m.snapshot().ending.as_deref(), Some("Fin"));
        m.advance();
        assert_eq!(m.phase(), Phase::Terminal);
        assert!(m.take_reports().is_empty());
    }

    #[test]
    fn dead_end_is_reported() {
        let mut m = machine(r#"{"stuck": {"text": ""}}"#);
        m.advance();
        assert_eq!(m.phase(), Phase::Terminal);
        let reports = m.take_reports();
        assert_eq!(reports.len(), 1);
        assert!(matches!(
            reports[0],
            Report::Failure(ProgressionError::DeadEnd { .. })
        ));
        assert_eq!(reports[0].level(), "error");
    }

    #[test]
    fn choice_without_destination_warns_and_keeps_the_choice() {
        let mut m = machine(
            r#"{
                "ask": {"text": "?", "choices": [
                    {"text": "Wait", "score_change": {"patience": 1}},
                    {"text": "Go", "next_scene": "ask"}
                ]}
            }"#,
        );
        m.advance();
        m.advance();
        m.select_choice(0);

        assert_eq!(m.phase(), Phase::AwaitingChoice);
        assert_eq!(m.scene_id(), "ask");
        assert_eq!(m.pending_choices().len(), 2);
        assert_eq!(m.ledger().get("patience"), 1);
        let reports = m.take_reports();
        assert!(matches!(&reports[..], [Report::Warning(_)]), "{reports:?}");
    }

    #[test]
    fn branch_with_text_and_empty_destination_stops() {
        let mut m = machine(
            r#"{
                "gate": {"type": "checkpoint", "text": "gate", "requires": {"trust": 1}, "pass": {}, "fail": {}}
            }"#,
        );
        m.advance();
        assert_eq!(m.phase(), Phase::Revealing);
        m.advance();
        assert_eq!(m.phase(), Phase::Terminal);
        let reports = m.take_reports();
        assert!(
            matches!(&reports[..], [Report::Failure(ProgressionError::EmptyBranch(id))] if id == "gate"),
            "{reports:?}"
        );

        // nothing further happens once stopped
        m.advance();
        assert!(m.take_reports().is_empty());
    }

    #[test]
    fn empty_branch_on_entry_fails_startup() {
        let store = MemoryContentStore::new().with_chapter(
            "chapter_1",
            doc(r#"{"gate": {"type": "score_check", "conditions": [], "default": {}}}"#),
        );
        let err = ProgressionStateMachine::new(EngineConfig::new("chapter_1", 0.1), store)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            StartupError::Progression(ProgressionError::EmptyBranch(_))
        ));
    }

    #[test]
    fn dangling_scene_stops_with_state_unchanged() {
        let mut m = machine(r#"{"a": {"text": "Hello", "next_scene": "missing"}}"#);
        m.advance();
        assert_eq!(m.revealed(), 5);

        m.advance();
        assert_eq!(m.phase(), Phase::Terminal);
        assert_eq!(m.scene_id(), "a");
        assert_eq!(m.file(), &FileRef::chapter(1));
        assert_eq!(m.revealed(), 5);
        let reports = m.take_reports();
        assert!(matches!(
            &reports[..],
            [Report::Failure(ProgressionError::Navigation(NavigationError::Resolve(
                ResolveError::SceneNotFound(id)
            )))] if id == "missing"
        ));
    }

    #[test]
    fn branch_chain_that_never_settles_is_a_loop() {
        let store = MemoryContentStore::new().with_chapter(
            "chapter_1",
            doc(r#"{
                "a": {"type": "checkpoint", "pass": {"next_scene": "b"}, "fail": {"next_scene": "b"}},
                "b": {"type": "checkpoint", "pass": {"next_scene": "a"}, "fail": {"next_scene": "a"}}
            }"#),
        );
        let err = ProgressionStateMachine::new(EngineConfig::new("chapter_1", 0.1), store)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            StartupError::Progression(ProgressionError::BranchLoop { .. })
        ));
    }

    #[test]
    fn fade_decays_and_is_dropped_after_first_character() {
        let mut m = machine(r#"{"a": {"text": "Hello", "fade": true, "zoom": 1.5, "next_scene": "a"}}"#);
        assert_eq!(m.fade_level(), 1.0);
        assert_eq!(m.zoom(), 1.5);
        m.tick(0.1);
        assert!((m.fade_level() - 0.8).abs() < 1e-6);
        m.tick(0.1);
        assert_eq!(m.revealed(), 2);
        assert_eq!(m.fade_level(), 0.0);
    }

    #[test]
    fn speaker_and_sprite_resolution() {
        let store = MemoryContentStore::new()
            .with_chapter(
                "chapter_1",
                doc(r#"{
                    "a": {"speaker": "mira", "sprites": "worried", "bg_image": "street", "text": "Hm", "next_scene": "b"},
                    "b": {"speaker": "ghost", "text": "Boo", "next_scene": "c"},
                    "c": {"text": "...", "next_scene": "a"}
                }"#),
            )
            .with_character(CharacterRecord {
                id: "mira".to_string(),
                name: "Mira".to_string(),
                images: FxHashMap::from_iter([("worried".to_string(), "mira_worried".to_string())]),
            })
            .with_asset("mira_worried")
            .with_asset("street");
        let mut m = ProgressionStateMachine::new(EngineConfig::new("chapter_1", 0.1), store).unwrap();

        let snap = m.snapshot();
        assert_eq!(snap.speaker_name, "Mira");
        assert_eq!(snap.sprite.map(|h| h.key).as_deref(), Some("mira_worried"));
        assert_eq!(snap.background.map(|h| h.key).as_deref(), Some("street"));

        m.advance();
        m.advance();
        assert_eq!(m.snapshot().speaker_name, UNKNOWN_SPEAKER);
        assert!(m.snapshot().sprite.is_none());

        m.advance();
        m.advance();
        assert_eq!(m.snapshot().speaker_name, "");
    }

    #[test]
    fn pointer_events_use_layout() {
        let mut m = machine(
            r#"{
                "ask": {"text": "", "choices": [
                    {"text": "Left", "next_scene": "left"},
                    {"text": "Right", "next_scene": "right"}
                ]},
                "left": {"text": "L", "next_scene": "ask"},
                "right": {"text": "R", "next_scene": "ask"}
            }"#,
        );
        let layout = StackedChoiceLayout::new(1280.0, 720.0);
        let boxes = layout.choice_hitboxes(2);

        m.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 }, &layout);
        assert_eq!(m.phase(), Phase::AwaitingChoice);

        m.handle_input(
            InputEvent::PointerMove {
                x: boxes[1].x + 5.0,
                y: boxes[1].y + 5.0,
            },
            &layout,
        );
        assert_eq!(m.hover_index(), Some(1));
        assert_eq!(m.snapshot().hover_index, Some(1));

        // off every box: nothing happens
        m.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 }, &layout);
        assert_eq!(m.phase(), Phase::AwaitingChoice);

        m.handle_input(
            InputEvent::PointerDown {
                x: boxes[1].x + 5.0,
                y: boxes[1].y + 5.0,
            },
            &layout,
        );
        assert_eq!(m.scene_id(), "right");
        assert_eq!(m.hover_index(), None);
    }

    #[test]
    fn debug_keys_need_debug_mode() {
        let mut m = machine(r#"{"a": {"text": "x", "next_scene": "a"}}"#);
        let layout = StackedChoiceLayout::new(1280.0, 720.0);
        m.handle_input(InputEvent::KeyDown(KeyCode::Char('s')), &layout);
        assert!(m.take_reports().is_empty());
    }

    #[test]
    fn report_display() {
        let dump = Report::ScoreDump(StatMap::from_iter([("trust".to_string(), 3)]));
        assert_eq!(dump.to_string(), "scores: trust=3");
        assert_eq!(dump.level(), "info");
        assert_eq!(Report::ScoreDump(StatMap::new()).to_string(), "scores: (none)");
    }
}
