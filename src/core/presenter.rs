/// The presentation boundary: what the engine hands a renderer every frame,
/// and the hit-test geometry a renderer hands back.
use serde::{Deserialize, Serialize};

use crate::core::config::WindowConfig;
use crate::core::machine::Phase;
use crate::schema::character::ImageHandle;

/// Axis-aligned rectangle in presenter coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Geometry of the choice buttons. Owned by the presenter; the engine only
/// uses it to turn pointer coordinates into a choice index.
pub trait ChoiceLayout {
    fn choice_hitboxes(&self, count: usize) -> Vec<Rect>;

    /// Index of the first hitbox containing the point.
    fn hit_test(&self, count: usize, x: f32, y: f32) -> Option<usize> {
        self.choice_hitboxes(count)
            .iter()
            .position(|rect| rect.contains(x, y))
    }
}

/// Draws render snapshots.
pub trait Presenter: ChoiceLayout {
    fn present(&mut self, snapshot: &RenderSnapshot);
}

/// Read-only view of the engine state for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub phase: Phase,
    pub file: String,
    pub scene_id: String,
    /// The scene text with pause markers stripped.
    pub display_text: String,
    /// The part of `display_text` revealed so far.
    pub visible_text: String,
    pub revealed: usize,
    pub reveal_complete: bool,
    pub speaker_name: String,
    pub sprite: Option<ImageHandle>,
    pub background: Option<ImageHandle>,
    /// 1.0 is fully faded out, 0.0 fully visible.
    pub fade_level: f32,
    pub zoom: f32,
    pub pending_choices: Vec<String>,
    pub hover_index: Option<usize>,
    /// Display name of the ending once the story has reached one.
    pub ending: Option<String>,
}

/// Choice buttons stacked vertically, centred in the area above the text box.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedChoiceLayout {
    pub width: f32,
    pub height: f32,
    pub box_height: f32,
    pub spacing: f32,
    /// Height reserved for the text box at the bottom of the window.
    pub textbox_height: f32,
}

impl StackedChoiceLayout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            box_height: 60.0,
            spacing: 20.0,
            textbox_height: 220.0,
        }
    }

    pub fn for_window(window: &WindowConfig) -> Self {
        Self::new(window.width as f32, window.height as f32)
    }
}

impl ChoiceLayout for StackedChoiceLayout {
    fn choice_hitboxes(&self, count: usize) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let box_width = self.width * 0.6;
        let x = (self.width - box_width) / 2.0;
        let stack = count as f32 * self.box_height + (count - 1) as f32 * self.spacing;
        let area = (self.height - self.textbox_height).max(stack);
        let top = (area - stack) / 2.0;

        (0..count)
            .map(|i| Rect {
                x,
                y: top + i as f32 * (self.box_height + self.spacing),
                width: box_width,
                height: self.box_height,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect {
            x: 10.0,
            y: 10.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(19.9, 19.9));
        assert!(!r.contains(20.0, 15.0));
        assert!(!r.contains(5.0, 15.0));
    }

    #[test]
    fn stacked_boxes_do_not_overlap() {
        let layout = StackedChoiceLayout::new(1280.0, 720.0);
        let boxes = layout.choice_hitboxes(3);
        assert_eq!(boxes.len(), 3);
        for pair in boxes.windows(2) {
            assert!(pair[0].y + pair[0].height <= pair[1].y);
        }
        assert!(boxes[2].y + boxes[2].height <= 720.0 - 220.0);
    }

    #[test]
    fn hit_test_finds_box_under_pointer() {
        let layout = StackedChoiceLayout::new(1280.0, 720.0);
        let boxes = layout.choice_hitboxes(2);
        let second = boxes[1];
        assert_eq!(
            layout.hit_test(2, second.x + 1.0, second.y + 1.0),
            Some(1)
        );
        assert_eq!(layout.hit_test(2, 0.0, 0.0), None);
        assert_eq!(layout.hit_test(0, 640.0, 300.0), None);
    }
}
