//! Key mapping from terminal events to game actions.
//!
//! Arrows, WASD and HJKL move; Up/W/K rotate clockwise, Z/Y rotate
//! counter-clockwise; Space hard-drops and P pauses.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a single terminal key event means to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Key went down (or the terminal auto-repeated it)
    Press(GameAction),
    /// Key came up; only reported by terminals with release events
    Release(GameAction),
    Quit,
    Ignored,
}

/// Classify a key event by action and press/release kind.
pub fn classify_key_event(key: KeyEvent) -> KeyInput {
    if should_quit(key) && key.kind != KeyEventKind::Release {
        return KeyInput::Quit;
    }
    match (handle_key_event(key), key.kind) {
        (Some(action), KeyEventKind::Release) => KeyInput::Release(action),
        (Some(action), _) => KeyInput::Press(action),
        (None, _) => KeyInput::Ignored,
    }
}

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(GameAction::MoveLeft)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(GameAction::MoveRight)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(GameAction::SoftDrop)
        }

        // Rotation
        KeyCode::Up
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W') => Some(GameAction::RotateCw),
        KeyCode::Char('z')
        | KeyCode::Char('Z')
        | KeyCode::Char('y')
        | KeyCode::Char('Y') => Some(GameAction::RotateCcw),

        // Actions
        KeyCode::Char(' ') => Some(GameAction::HardDrop),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameAction::Pause),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
