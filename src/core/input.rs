/// Discrete input events, as reported by the host's input source.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    KeyDown(KeyCode),
}

/// Keys the engine reacts to. Only debug affordances are bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Space,
    Char(char),
}

impl KeyCode {
    /// Map a host key name (`" "`, `"Space"`, `"s"`) to a key code.
    pub fn from_name(name: &str) -> Option<KeyCode> {
        match name {
            " " | "Space" | "space" => Some(KeyCode::Space),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyCode::Char(c)),
                    _ => None,
                }
            }
        }
    }
}
