//! Held-key tracking for terminal environments.
//!
//! Many terminals never report key releases; they only auto-repeat presses
//! while a key is down. [`KeyboardState`] therefore treats an action as held
//! until either a release event arrives or no press for it has been seen for
//! `release_timeout`.

use std::time::{Duration, Instant};

use crate::map::KeyInput;
use crate::types::{ActionState, GameAction, InputSource};

// Must exceed the terminal's initial auto-repeat delay, or a held key
// flickers released between the first press and the first repeat.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

#[derive(Debug, Clone)]
pub struct KeyboardState {
    actions: ActionState,
    last_seen: [Option<Instant>; GameAction::ALL.len()],
    release_timeout: Duration,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self {
            actions: ActionState::new(),
            last_seen: [None; GameAction::ALL.len()],
            release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    pub fn release_timeout(&self) -> Duration {
        self.release_timeout
    }

    /// Record a classified key event observed at `now`.
    pub fn apply(&mut self, input: KeyInput, now: Instant) {
        match input {
            KeyInput::Press(action) => self.press(action, now),
            KeyInput::Release(action) => self.release(action),
            KeyInput::Quit | KeyInput::Ignored => {}
        }
    }

    pub fn press(&mut self, action: GameAction, now: Instant) {
        self.actions.press(action);
        self.last_seen[action as usize] = Some(now);
    }

    pub fn release(&mut self, action: GameAction) {
        self.actions.release(action);
        self.last_seen[action as usize] = None;
    }

    /// Release every action not refreshed within the timeout.
    pub fn expire(&mut self, now: Instant) {
        for action in GameAction::ALL {
            let Some(seen) = self.last_seen[action as usize] else {
                continue;
            };
            if now.saturating_duration_since(seen) > self.release_timeout {
                self.release(action);
            }
        }
    }

    /// Forget this frame's key-down edges; call after the frame consumed them.
    pub fn end_frame(&mut self) {
        self.actions.end_frame();
    }

    /// Drop all held keys, e.g. after losing focus.
    pub fn reset(&mut self) {
        self.actions.release_all();
        self.actions.end_frame();
        self.last_seen = [None; GameAction::ALL.len()];
    }
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for KeyboardState {
    fn is_held(&self, action: GameAction) -> bool {
        self.actions.is_held(action)
    }

    fn was_pressed(&self, action: GameAction) -> bool {
        self.actions.was_pressed(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_held_and_edge_once() {
        let now = Instant::now();
        let mut kb = KeyboardState::new();
        kb.apply(KeyInput::Press(GameAction::MoveLeft), now);
        assert!(kb.is_held(GameAction::MoveLeft));
        assert!(kb.was_pressed(GameAction::MoveLeft));

        kb.end_frame();
        // Terminal auto-repeat: still held, but no new edge.
        kb.apply(KeyInput::Press(GameAction::MoveLeft), now);
        assert!(kb.is_held(GameAction::MoveLeft));
        assert!(!kb.was_pressed(GameAction::MoveLeft));
    }

    #[test]
    fn test_release_event_clears_hold() {
        let now = Instant::now();
        let mut kb = KeyboardState::new();
        kb.apply(KeyInput::Press(GameAction::SoftDrop), now);
        kb.apply(KeyInput::Release(GameAction::SoftDrop), now);
        assert!(!kb.is_held(GameAction::SoftDrop));
    }

    #[test]
    fn test_auto_release_after_timeout_without_release_events() {
        let start = Instant::now();
        let mut kb = KeyboardState::new().with_release_timeout(Duration::from_millis(50));
        kb.press(GameAction::MoveRight, start);

        kb.expire(start + Duration::from_millis(40));
        assert!(kb.is_held(GameAction::MoveRight));

        kb.expire(start + Duration::from_millis(51));
        assert!(!kb.is_held(GameAction::MoveRight));
    }

    #[test]
    fn test_other_keys_do_not_refresh_stale_key() {
        let start = Instant::now();
        let mut kb = KeyboardState::new().with_release_timeout(Duration::from_millis(50));
        kb.press(GameAction::MoveLeft, start);
        kb.press(GameAction::RotateCw, start + Duration::from_millis(45));

        kb.expire(start + Duration::from_millis(60));
        assert!(!kb.is_held(GameAction::MoveLeft));
        assert!(kb.is_held(GameAction::RotateCw));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut kb = KeyboardState::new();
        kb.press(GameAction::MoveLeft, Instant::now());
        kb.reset();
        assert!(!kb.is_held(GameAction::MoveLeft));
        assert!(!kb.was_pressed(GameAction::MoveLeft));
    }
}
