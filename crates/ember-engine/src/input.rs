//! Input collaborator interface.
//!
//! The core only asks two questions of the input source: is a key held, and
//! was it pressed this frame. The windowing layer refreshes that state once
//! per frame through [`Platform::pump_events`] before any system runs.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
}

/// Read-only per-frame key state.
pub trait InputState {
    /// Whether `key` is currently held.
    fn is_pressed(&self, key: KeyCode) -> bool;
    /// Whether `key` went down since the previous frame.
    fn is_just_pressed(&self, key: KeyCode) -> bool;
}

/// The windowing collaborator: input state plus the per-frame event pump.
pub trait Platform: InputState {
    /// Process pending window events and refresh key state.
    ///
    /// Returns `false` once the window has been asked to close.
    fn pump_events(&mut self) -> bool;
}

// ---------------------------------------------------------------------------
// KeyboardState
// ---------------------------------------------------------------------------

/// In-memory key state with edge detection against the previous frame.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    held_last_frame: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current state as "previous" before new events arrive.
    pub fn begin_frame(&mut self) {
        self.held_last_frame.clone_from(&self.held);
    }

    pub fn press(&mut self, key: KeyCode) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

impl InputState for KeyboardState {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    fn is_just_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key) && !self.held_last_frame.contains(&key)
    }
}

// ---------------------------------------------------------------------------
// HeadlessPlatform
// ---------------------------------------------------------------------------

/// A key event scripted for a [`HeadlessPlatform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(KeyCode),
    Released(KeyCode),
}

/// A windowless platform fed from a script of per-frame key events.
///
/// Each call to [`pump_events`](Platform::pump_events) applies the next
/// frame's events. The platform requests close after `frame_limit` pumps,
/// or when the script runs dry if no limit is set.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    keyboard: KeyboardState,
    script: VecDeque<Vec<KeyEvent>>,
    frame_limit: Option<u64>,
    frames_pumped: u64,
}

impl HeadlessPlatform {
    /// A platform that runs for exactly `frames` frames with no input.
    pub fn for_frames(frames: u64) -> Self {
        Self {
            frame_limit: Some(frames),
            ..Default::default()
        }
    }

    /// A platform that replays `script`, one entry per frame, then closes.
    pub fn scripted(script: Vec<Vec<KeyEvent>>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }

    /// Number of frames pumped so far.
    pub fn frames_pumped(&self) -> u64 {
        self.frames_pumped
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }
}

impl InputState for HeadlessPlatform {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.keyboard.is_pressed(key)
    }

    fn is_just_pressed(&self, key: KeyCode) -> bool {
        self.keyboard.is_just_pressed(key)
    }
}

impl Platform for HeadlessPlatform {
    fn pump_events(&mut self) -> bool {
        match self.frame_limit {
            Some(limit) if self.frames_pumped >= limit => return false,
            None if self.script.is_empty() => return false,
            _ => {}
        }
        self.keyboard.begin_frame();
        if let Some(events) = self.script.pop_front() {
            for event in events {
                match event {
                    KeyEvent::Pressed(key) => self.keyboard.press(key),
                    KeyEvent::Released(key) => self.keyboard.release(key),
                }
            }
        }
        self.frames_pumped += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn just_pressed_lasts_one_frame() {
        let mut kb = KeyboardState::new();
        kb.begin_frame();
        kb.press(KeyCode::Space);
        assert!(kb.is_pressed(KeyCode::Space));
        assert!(kb.is_just_pressed(KeyCode::Space));

        kb.begin_frame();
        assert!(kb.is_pressed(KeyCode::Space));
        assert!(!kb.is_just_pressed(KeyCode::Space));

        kb.release(KeyCode::Space);
        assert!(!kb.is_pressed(KeyCode::Space));
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::W);
        kb.press(KeyCode::Left);
        kb.release_all();
        assert!(!kb.is_pressed(KeyCode::W));
        assert!(!kb.is_pressed(KeyCode::Left));
        assert!(!kb.is_just_pressed(KeyCode::W));
    }

    #[test]
    fn scripted_platform_applies_events_then_closes() {
        let mut platform = HeadlessPlatform::scripted(vec![
            vec![KeyEvent::Pressed(KeyCode::D)],
            vec![],
            vec![KeyEvent::Released(KeyCode::D)],
        ]);

        assert!(platform.pump_events());
        assert!(platform.is_just_pressed(KeyCode::D));
        assert!(platform.pump_events());
        assert!(platform.is_pressed(KeyCode::D));
        assert!(!platform.is_just_pressed(KeyCode::D));
        assert!(platform.pump_events());
        assert!(!platform.is_pressed(KeyCode::D));
        assert!(!platform.pump_events());
        assert_eq!(platform.frames_pumped(), 3);
    }

    #[test]
    fn platform_exposes_its_keyboard() {
        let mut platform = HeadlessPlatform::scripted(vec![vec![KeyEvent::Pressed(KeyCode::A)]]);
        assert!(!platform.keyboard().is_pressed(KeyCode::A));
        assert!(platform.pump_events());
        assert!(platform.keyboard().is_pressed(KeyCode::A));
        assert!(platform.keyboard().is_just_pressed(KeyCode::A));
    }

    #[test]
    fn frame_limited_platform_closes_on_time() {
        let mut platform = HeadlessPlatform::for_frames(2);
        assert!(platform.pump_events());
        assert!(platform.pump_events());
        assert!(!platform.pump_events());
    }
}
