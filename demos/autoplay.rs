/// Autoplay demo — plays the bundled story headlessly, once per route.
///
/// Each run feeds the engine 60 fps frames, clicks once the text is fully
/// revealed, and answers every choice from a fixed list of picks.
///
/// Run with: cargo run --example autoplay

use scene_engine::core::config::EngineConfig;
use scene_engine::core::content::DirContentStore;
use scene_engine::core::input::InputEvent;
use scene_engine::core::machine::{Phase, ProgressionStateMachine};
use scene_engine::core::presenter::{ChoiceLayout, Presenter, Rect, RenderSnapshot, StackedChoiceLayout};
use std::path::Path;

const FRAME: f64 = 1.0 / 60.0;
const MAX_FRAMES: usize = 60 * 60 * 5;

/// Prints each scene once, when it first appears.
struct TranscriptPresenter {
    layout: StackedChoiceLayout,
    last_scene: Option<(String, String)>,
    last: Option<RenderSnapshot>,
}

impl ChoiceLayout for TranscriptPresenter {
    fn choice_hitboxes(&self, count: usize) -> Vec<Rect> {
        self.layout.choice_hitboxes(count)
    }
}

impl Presenter for TranscriptPresenter {
    fn present(&mut self, snapshot: &RenderSnapshot) {
        let key = (snapshot.file.clone(), snapshot.scene_id.clone());
        if self.last_scene.as_ref() != Some(&key) {
            let speaker = if snapshot.speaker_name.is_empty() {
                String::new()
            } else {
                format!("{}: ", snapshot.speaker_name)
            };
            println!("  [{}/{}] {}{}", key.0, key.1, speaker, snapshot.display_text);
            self.last_scene = Some(key);
        }
        self.last = Some(snapshot.clone());
    }
}

fn main() {
    let data = Path::new("story_data");
    let config = EngineConfig::load(&data.join("game_config.ron"))
        .expect("Failed to load story_data/game_config.ron");

    let routes: [(&str, [usize; 2]); 4] = [
        ("together", [0, 0]),
        ("bold", [0, 1]),
        ("trusting from afar", [1, 0]),
        ("alone", [1, 1]),
    ];

    for (name, picks) in routes {
        println!("=== Route: {} ===", name);
        let mut engine = ProgressionStateMachine::new(config.clone(), DirContentStore::new(data))
            .expect("Failed to start engine");
        let mut presenter = TranscriptPresenter {
            layout: StackedChoiceLayout::for_window(&config.window),
            last_scene: None,
            last: None,
        };
        let mut picks = picks.iter().copied();

        for _ in 0..MAX_FRAMES {
            let events = match presenter.last.as_ref() {
                Some(snap) if snap.phase == Phase::AwaitingChoice => {
                    let index = picks.next().unwrap_or(0);
                    let boxes = presenter.choice_hitboxes(snap.pending_choices.len());
                    println!("  > {}", snap.pending_choices[index]);
                    let target = boxes[index];
                    vec![InputEvent::PointerDown {
                        x: target.x + target.width / 2.0,
                        y: target.y + target.height / 2.0,
                    }]
                }
                Some(snap) if snap.reveal_complete => vec![InputEvent::PointerDown { x: 0.0, y: 0.0 }],
                _ => Vec::new(),
            };
            engine.frame(FRAME, &events, &mut presenter);

            for report in engine.take_reports() {
                println!("  [{}] {}", report.level(), report);
            }
            if engine.phase() == Phase::Terminal {
                break;
            }
        }

        let ending = engine.snapshot().ending.unwrap_or_else(|| "(none)".to_string());
        println!("Ending: {}", ending);
        println!("Scores: {:?}\n", engine.ledger().snapshot());
    }
}
