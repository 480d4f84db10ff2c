//! Input sampling
//!
//! The host forwards raw key-down/key-up edges; the simulation reads a
//! snapshot of what is held at the start of each tick.

use serde::{Deserialize, Serialize};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` / `.code` value to a game key
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "d" | "D" | "KeyD" => Some(Key::Right),
            "ArrowUp" | "w" | "W" | "KeyW" => Some(Key::Up),
            "ArrowDown" | "s" | "S" | "KeyS" => Some(Key::Down),
            " " | "Space" | "Spacebar" => Some(Key::Fire),
            _ => None,
        }
    }
}

/// Snapshot of held keys at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl ControlIntent {
    /// Net horizontal direction: -1, 0 or 1 (opposite keys cancel)
    pub fn horizontal(&self) -> f32 {
        axis(self.right, self.left)
    }

    /// Net vertical direction: -1, 0 or 1 (opposite keys cancel)
    pub fn vertical(&self) -> f32 {
        axis(self.up, self.down)
    }
}

#[inline]
fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Tracks held state for the four directions and the fire key
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    held: ControlIntent,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key edge
    pub fn set_held(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.held.left = held,
            Key::Right => self.held.right = held,
            Key::Up => self.held.up = held,
            Key::Down => self.held.down = held,
            Key::Fire => self.held.fire = held,
        }
    }

    /// Record a raw DOM key edge. Unrecognized keys are ignored.
    ///
    /// Returns whether the key was one the game uses, so the host can
    /// decide whether to `preventDefault`.
    pub fn set_held_dom(&mut self, dom_key: &str, held: bool) -> bool {
        match Key::from_dom(dom_key) {
            Some(key) => {
                self.set_held(key, held);
                true
            }
            None => false,
        }
    }

    /// Release everything (focus loss, reset)
    pub fn release_all(&mut self) {
        self.held = ControlIntent::default();
    }

    pub fn sample(&self) -> ControlIntent {
        self.held
    }
}
