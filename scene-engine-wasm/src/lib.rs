//! WASM bindings for scene-engine — plays the bundled story in the browser.

use wasm_bindgen::prelude::*;

use scene_engine::core::config::EngineConfig;
use scene_engine::core::content::MemoryContentStore;
use scene_engine::core::input::{InputEvent, KeyCode};
use scene_engine::core::machine::ProgressionStateMachine;
use scene_engine::core::presenter::{ChoiceLayout, StackedChoiceLayout};
use scene_engine::schema::character::CharacterRecord;
use scene_engine::schema::document::StoryDocument;
use scene_engine::schema::format::ContentFormat;

// ---------------------------------------------------------------------------
// Embedded story data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const CONFIG: &str = include_str!("../../story_data/game_config.ron");

    pub const CHARACTERS: &[&str] = &[
        include_str!("../../story_data/characters/mira.ron"),
        include_str!("../../story_data/characters/kenji.ron"),
    ];

    pub const CHAPTERS: &[(&str, &str)] = &[
        ("chapter_1", include_str!("../../story_data/story/chapter_1.ron")),
        ("chapter_2", include_str!("../../story_data/story/chapter_2.ron")),
    ];

    pub const ENDINGS: &[(&str, &str)] = &[
        (
            "ending_together",
            include_str!("../../story_data/story/endings/ending_together.ron"),
        ),
        (
            "ending_alone",
            include_str!("../../story_data/story/endings/ending_alone.ron"),
        ),
        (
            "ending_adrift",
            include_str!("../../story_data/story/endings/ending_adrift.ron"),
        ),
    ];
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct ReportInfo {
    level: &'static str,
    message: String,
}

/// Parse the embedded story into an in-memory store. Image keys are
/// registered as-is; the page maps them to URLs.
fn build_store() -> Result<MemoryContentStore, JsError> {
    let mut store = MemoryContentStore::new();
    let mut image_keys: Vec<String> = Vec::new();

    for source in data::CHARACTERS {
        let record: CharacterRecord = ContentFormat::Ron
            .parse(source)
            .map_err(|e| JsError::new(&format!("Character parse error: {e}")))?;
        image_keys.extend(record.images.values().cloned());
        store = store.with_character(record);
    }

    for (id, source) in data::CHAPTERS {
        let document = StoryDocument::parse_ron(source)
            .map_err(|e| JsError::new(&format!("Chapter '{id}' parse error: {e}")))?;
        image_keys.extend(document.scenes().filter_map(|s| s.background.clone()));
        store = store.with_chapter(id, document);
    }

    for (id, source) in data::ENDINGS {
        let document = StoryDocument::parse_ron(source)
            .map_err(|e| JsError::new(&format!("Ending '{id}' parse error: {e}")))?;
        image_keys.extend(document.scenes().filter_map(|s| s.background.clone()));
        store = store.with_ending(id, document);
    }

    image_keys.sort();
    image_keys.dedup();
    for key in &image_keys {
        store = store.with_asset(key);
    }
    Ok(store)
}

// ---------------------------------------------------------------------------
// StoryPlayer — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryPlayer {
    engine: ProgressionStateMachine<MemoryContentStore>,
    layout: StackedChoiceLayout,
}

#[wasm_bindgen]
impl StoryPlayer {
    /// Start the bundled story from its configured first chapter.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<StoryPlayer, JsError> {
        let config = EngineConfig::parse(ContentFormat::Ron, data::CONFIG)
            .map_err(|e| JsError::new(&format!("Config error: {e}")))?;
        let layout = StackedChoiceLayout::for_window(&config.window);
        let engine = ProgressionStateMachine::new(config, build_store()?)
            .map_err(|e| JsError::new(&format!("Startup error: {e}")))?;
        Ok(StoryPlayer { engine, layout })
    }

    /// Advance the clock by `delta` seconds.
    pub fn tick(&mut self, delta: f64) {
        self.engine.tick(delta);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.engine
            .handle_input(InputEvent::PointerMove { x, y }, &self.layout);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.engine
            .handle_input(InputEvent::PointerDown { x, y }, &self.layout);
    }

    /// Forward a `KeyboardEvent.key` value. Unknown keys are ignored.
    pub fn key_down(&mut self, key: &str) {
        if let Some(code) = KeyCode::from_name(key) {
            self.engine.handle_input(InputEvent::KeyDown(code), &self.layout);
        }
    }

    /// The click, for pages that do their own hit-testing.
    pub fn advance(&mut self) {
        self.engine.advance();
    }

    pub fn select_choice(&mut self, index: usize) {
        self.engine.select_choice(index);
    }

    /// Return the current render snapshot as JSON.
    pub fn snapshot(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.engine.snapshot())
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return JSON array of choice button rectangles for the pending choices.
    pub fn choice_hitboxes(&self) -> Result<String, JsError> {
        let boxes = self
            .layout
            .choice_hitboxes(self.engine.pending_choices().len());
        serde_json::to_string(&boxes)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return the score ledger as a JSON object.
    pub fn scores(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.engine.ledger().snapshot())
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Drain queued reports as a JSON array of `{level, message}`.
    pub fn take_reports(&mut self) -> Result<String, JsError> {
        let reports: Vec<ReportInfo> = self
            .engine
            .take_reports()
            .into_iter()
            .map(|r| ReportInfo {
                level: r.level(),
                message: r.to_string(),
            })
            .collect();
        serde_json::to_string(&reports)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Restart the story from the beginning with fresh scores.
    pub fn reset(&mut self) -> Result<(), JsError> {
        *self = StoryPlayer::new()?;
        Ok(())
    }
}
