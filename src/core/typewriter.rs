//! Typewriter reveal — turns elapsed time into a visible character count.
//!
//! Text may embed pause markers (`|`). Markers are stripped from what the
//! player sees but still drive pacing: each marker directly before a
//! visible character makes that character wait `PAUSE_DELAY` instead of
//! the base per-character delay. Markers never count as revealed
//! characters, and markers at the very end of the text are ignored.

pub const PAUSE_MARKER: char = '|';

/// Seconds one pause marker holds back the next character.
pub const PAUSE_DELAY: f64 = 0.5;

/// Frame deltas are summed in floating point; boundaries within this many
/// seconds count as reached.
const TIMER_EPSILON: f64 = 1e-9;

/// The text as displayed, with pause markers removed.
pub fn display_text(raw: &str) -> String {
    raw.chars().filter(|c| *c != PAUSE_MARKER).collect()
}

pub fn display_len(raw: &str) -> usize {
    raw.chars().filter(|c| *c != PAUSE_MARKER).count()
}

/// The first `revealed` displayable characters.
pub fn visible_prefix(raw: &str, revealed: usize) -> String {
    raw.chars()
        .filter(|c| *c != PAUSE_MARKER)
        .take(revealed)
        .collect()
}

/// Seconds needed to reveal the whole text at `speed` seconds per character.
pub fn total_duration(raw: &str, speed: f64) -> f64 {
    pauses_before_each(raw)
        .into_iter()
        .map(|pauses| char_delay(pauses, speed))
        .sum()
}

/// For every displayable character, how many markers directly precede it.
fn pauses_before_each(raw: &str) -> Vec<u32> {
    let mut pacing = Vec::with_capacity(raw.len());
    let mut pending = 0u32;
    for c in raw.chars() {
        if c == PAUSE_MARKER {
            pending += 1;
        } else {
            pacing.push(pending);
            pending = 0;
        }
    }
    pacing
}

fn char_delay(pauses: u32, speed: f64) -> f64 {
    if pauses == 0 {
        speed
    } else {
        f64::from(pauses) * PAUSE_DELAY
    }
}

/// Reveal progress for the current scene's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Typewriter {
    revealed: usize,
    timer: f64,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of displayable characters currently visible.
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn is_complete(&self, raw: &str) -> bool {
        self.revealed >= display_len(raw)
    }

    /// Advance by `delta` seconds, revealing one character at a time.
    /// Returns how many characters this call revealed.
    pub fn tick(&mut self, delta: f64, raw: &str, speed: f64) -> usize {
        let pacing = pauses_before_each(raw);
        if self.revealed >= pacing.len() {
            return 0;
        }
        if !(speed.is_finite() && speed > 0.0) {
            let before = self.revealed;
            self.skip_to_end(raw);
            return self.revealed - before;
        }
        if delta.is_finite() && delta > 0.0 {
            self.timer += delta;
        }

        let before = self.revealed;
        while let Some(&pauses) = pacing.get(self.revealed) {
            let delay = char_delay(pauses, speed);
            if self.timer + TIMER_EPSILON < delay {
                break;
            }
            self.revealed += 1;
            self.timer = (self.timer - delay).max(0.0);
        }
        if self.revealed >= pacing.len() {
            self.timer = 0.0;
        }
        self.revealed - before
    }

    /// Show everything at once. Idempotent.
    pub fn skip_to_end(&mut self, raw: &str) {
        self.revealed = display_len(raw);
        self.timer = 0.0;
    }

    pub fn reset(&mut self) {
        self.revealed = 0;
        self.timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn markers_are_stripped_for_display() {
        assert_eq!(display_text("Hi|there"), "Hithere");
        assert_eq!(display_len("||a|b|"), 2);
        assert_eq!(visible_prefix("Hi|there", 3), "Hit");
        assert_eq!(visible_prefix("Hi", 10), "Hi");
    }

    #[test]
    fn one_character_per_base_delay() {
        let mut tw = Typewriter::new();
        assert_eq!(tw.tick(0.1, "Hi|there", 0.1), 1);
        assert_eq!(visible_prefix("Hi|there", tw.revealed()), "H");
    }

    #[test]
    fn pause_marker_holds_next_character() {
        let text = "Hi|there";
        let mut tw = Typewriter::new();
        for _ in 0..2 {
            tw.tick(0.1, text, 0.1);
        }
        assert_eq!(tw.revealed(), 2);

        for _ in 0..4 {
            tw.tick(0.1, text, 0.1);
        }
        assert_eq!(tw.revealed(), 2, "still inside the pause");

        tw.tick(0.1, text, 0.1);
        assert_eq!(tw.revealed(), 3);

        for _ in 0..4 {
            tw.tick(0.1, text, 0.1);
        }
        assert_eq!(tw.revealed(), 7);
        assert!(tw.is_complete(text));
        assert_eq!(visible_prefix(text, tw.revealed()), "Hithere");
    }

    #[test]
    fn total_duration_counts_pauses() {
        assert!((total_duration("Hi|there", 0.1) - 1.1).abs() < 1e-9);
        assert!((total_duration("a||b", 0.1) - 1.1).abs() < 1e-9);
        assert!((total_duration("ab|", 0.1) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn large_delta_reveals_everything_in_one_tick() {
        let mut tw = Typewriter::new();
        assert_eq!(tw.tick(5.0, "Hi|there", 0.1), 7);
        assert!(tw.is_complete("Hi|there"));
    }

    #[test]
    fn skip_is_absorbing() {
        let mut tw = Typewriter::new();
        tw.tick(0.05, "Hello", 0.1);
        tw.skip_to_end("Hello");
        assert_eq!(tw.revealed(), 5);
        tw.skip_to_end("Hello");
        assert_eq!(tw.tick(10.0, "Hello", 0.1), 0);
        assert_eq!(tw.revealed(), 5);
    }

    #[test]
    fn empty_text_is_complete_immediately() {
        let mut tw = Typewriter::new();
        assert!(tw.is_complete(""));
        assert!(tw.is_complete("||"));
        assert_eq!(tw.tick(1.0, "", 0.1), 0);
    }

    #[test]
    fn reset_starts_over() {
        let mut tw = Typewriter::new();
        tw.skip_to_end("Hello");
        tw.reset();
        assert_eq!(tw.revealed(), 0);
        assert_eq!(tw.tick(0.05, "Hello", 0.1), 0);
    }

    #[test]
    fn negative_delta_does_not_rewind() {
        let mut tw = Typewriter::new();
        tw.tick(0.25, "Hello", 0.1);
        assert_eq!(tw.revealed(), 2);
        tw.tick(-1.0, "Hello", 0.1);
        assert_eq!(tw.revealed(), 2);
    }

    #[test]
    fn non_positive_speed_reveals_instantly() {
        let mut tw = Typewriter::new();
        assert_eq!(tw.tick(0.0, "abc", 0.0), 3);
    }

    fn random_text(rng: &mut StdRng, with_markers: bool) -> String {
        let len = rng.gen_range(0..40);
        (0..len)
            .map(|_| {
                if with_markers && rng.gen_bool(0.15) {
                    PAUSE_MARKER
                } else {
                    rng.gen_range('a'..='z')
                }
            })
            .collect()
    }

    #[test]
    fn enough_time_reveals_all_and_count_never_decreases() {
        let mut rng = StdRng::seed_from_u64(42);
        for round in 0..300 {
            let text = random_text(&mut rng, round % 2 == 0);
            let speed = rng.gen_range(0.01..0.2);
            let budget = total_duration(&text, speed) + 0.01;

            let mut tw = Typewriter::new();
            let mut elapsed = 0.0;
            let mut last = 0;
            while elapsed <= budget {
                let delta = rng.gen_range(0.0..0.05);
                elapsed += delta;
                tw.tick(delta, &text, speed);
                assert!(tw.revealed() >= last);
                assert!(tw.revealed() <= display_len(&text));
                last = tw.revealed();
            }
            assert_eq!(tw.revealed(), display_len(&text), "text {text:?} speed {speed}");
        }
    }

    #[test]
    fn marker_free_text_completes_within_length_times_speed() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let text = random_text(&mut rng, false);
            let speed = rng.gen_range(0.01..0.2);
            let mut tw = Typewriter::new();
            let steps = 20;
            let delta = (text.len() as f64 * speed + 0.001) / steps as f64;
            for _ in 0..steps {
                tw.tick(delta, &text, speed);
            }
            assert!(tw.is_complete(&text));
        }
    }
}
