//! Per-frame input collaborator.

use std::collections::HashSet;

use crate::math::{Point2, Vector2};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Named keys the editing core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Delete,
    /// Additive selection modifier.
    Shift,
    /// Grid-snap modifier, and the history chord prefix.
    Control,
    X,
    Y,
    Z,
}

/// Input state as seen during one frame.
///
/// `pressed`/`released` are edge-triggered (true only on the transition
/// frame); `down` is level-triggered.
pub trait InputSource {
    fn pressed(&self, button: MouseButton) -> bool;
    fn released(&self, button: MouseButton) -> bool;
    fn down(&self, button: MouseButton) -> bool;
    fn key_pressed(&self, key: Key) -> bool;
    fn key_down(&self, key: Key) -> bool;
    /// Pointer position in pixels of the focused viewport.
    fn pointer(&self) -> Point2;
    /// Viewport under the pointer, if any.
    fn focused_viewport(&self) -> Option<Viewport>;
    /// Pixel size of the focused viewport.
    fn screen_size(&self) -> Vector2;
}

/// A plain snapshot of one frame's input.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    pub pointer: Point2,
    pub viewport: Option<Viewport>,
    pub screen_size: Vector2,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_down: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,
    pub keys_pressed: HashSet<Key>,
    pub keys_down: HashSet<Key>,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            pointer: Point2::origin(),
            viewport: None,
            screen_size: Vector2::zeros(),
            buttons_pressed: HashSet::new(),
            buttons_down: HashSet::new(),
            buttons_released: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_down: HashSet::new(),
        }
    }
}

impl FrameInput {
    /// A frame with the pointer at `pointer` over `viewport` and nothing held.
    #[must_use]
    pub fn at(viewport: Viewport, pointer: Point2, screen_size: Vector2) -> Self {
        Self {
            pointer,
            viewport: Some(viewport),
            screen_size,
            ..Self::default()
        }
    }

    /// Button goes down this frame.
    #[must_use]
    pub fn press(mut self, button: MouseButton) -> Self {
        self.buttons_pressed.insert(button);
        self.buttons_down.insert(button);
        self
    }

    /// Button is held (pressed on an earlier frame).
    #[must_use]
    pub fn hold(mut self, button: MouseButton) -> Self {
        self.buttons_down.insert(button);
        self
    }

    /// Button goes up this frame.
    #[must_use]
    pub fn release(mut self, button: MouseButton) -> Self {
        self.buttons_down.remove(&button);
        self.buttons_released.insert(button);
        self
    }

    /// Key goes down this frame.
    #[must_use]
    pub fn key_press(mut self, key: Key) -> Self {
        self.keys_pressed.insert(key);
        self.keys_down.insert(key);
        self
    }

    /// Key is held.
    #[must_use]
    pub fn key_hold(mut self, key: Key) -> Self {
        self.keys_down.insert(key);
        self
    }
}

impl InputSource for FrameInput {
    fn pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    fn released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    fn down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn pointer(&self) -> Point2 {
        self.pointer
    }

    fn focused_viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn screen_size(&self) -> Vector2 {
        self.screen_size
    }
}
