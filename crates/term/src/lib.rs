//! Terminal renderer for the playground.
//!
//! A small, game-oriented rendering layer: snapshots are drawn into a plain
//! framebuffer ([`fb`]) by [`game_view`], then flushed to the terminal as
//! cell diffs by [`renderer`]. No widget toolkit.
//!
//! - Keeps `core` free of I/O
//! - Lets the view control aspect ratio (2 columns per grid cell by default)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use brickfall_core as core;
pub use brickfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
