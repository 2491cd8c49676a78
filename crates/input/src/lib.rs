//! Terminal input module.
//!
//! This crate is independent of the simulation. It maps `crossterm` key
//! events into [`crate::types::GameAction`]s and tracks which actions are
//! held, exposing them through the [`crate::types::InputSource`] trait the
//! playground consumes. Terminals without key-release events are handled
//! with a release timeout.

pub mod keyboard;
pub mod map;

pub use brickfall_types as types;

pub use keyboard::KeyboardState;
pub use map::{classify_key_event, handle_key_event, should_quit, KeyInput};
