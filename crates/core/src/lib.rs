//! Core simulation - pure, deterministic, and testable
//!
//! This crate contains the whole falling-block simulation: grid, pieces,
//! scheduler, scoring and the playground state machine. It has **no
//! dependencies** on terminals or input devices:
//!
//! - **Deterministic**: Same seed and same inputs replay the same game
//! - **Frame-driven**: Callers hand in elapsed wall-clock time; the crate
//!   splits it into bounded ticks
//! - **Observable**: State changes are emitted as events and full snapshots
//!   are available at any time
//!
//! # Module Structure
//!
//! - [`tetromino`]: Shape matrices, free-space margins and SRS kick tables
//! - [`grid`]: Cell matrix with neighbour links and the brick arena
//! - [`brick`]: One occupied cell and its pending animation targets
//! - [`figure`]: Active piece: spawn, moves, rotations, hard drop
//! - [`stream`]: Scheduler tree, frame clock and timed transitions
//! - [`repeat`]: Auto-repeat for held movement keys
//! - [`scoring`]: Color-group scoring and level progression
//! - [`playground`]: The orchestration state machine
//! - [`events`] / [`snapshot`]: What renderers observe
//! - [`config`]: Tunables and construction errors
//!
//! # Example
//!
//! ```
//! use brickfall_core::{Playground, PlaygroundConfig, Phase};
//! use brickfall_core::types::{GameAction, NoInput};
//!
//! let config = PlaygroundConfig::default().with_seed(42);
//! let mut playground = Playground::new(config).unwrap();
//! assert_eq!(playground.phase(), Phase::WaitingStart);
//!
//! // The first figure spawns shortly after the start delay.
//! for _ in 0..20 {
//!     playground.frame(60.0, &NoInput);
//! }
//! assert!(playground.figure().is_some());
//!
//! playground.apply_action(GameAction::HardDrop);
//! assert_eq!(playground.phase(), Phase::Dropping);
//! ```
//!
//! # Timing
//!
//! - **Tick**: 60 ms, at most 100 ms accounted per frame
//! - **Gravity**: 1000 ms at level 1, 50 ms faster per level
//! - **Hard drop**: 100 ms interpolation
//! - **Line clear**: score published after 200 ms, collapse over the next 100 ms

pub mod brick;
pub mod config;
pub mod events;
pub mod figure;
pub mod grid;
pub mod playground;
pub mod repeat;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod stream;
pub mod tetromino;

pub use brickfall_types as types;

// Re-export commonly used types for convenience
pub use brick::{Brick, BrickId};
pub use config::{ConfigError, PlaygroundConfig, RepeatTiming};
pub use events::{BrickShift, PlaygroundEvent, PlaygroundObserver};
pub use figure::{Figure, FigureId};
pub use grid::{CellId, Direction, Grid};
pub use playground::{Phase, Playground};
pub use repeat::KeyMoveController;
pub use rng::SimpleRng;
pub use scoring::{calculate_level, calculate_score_groups, ScoreGroup, ScoreReport};
pub use snapshot::{CellView, FigureView, GameSnapshot, QueuedView};
pub use stream::{Delay, FrameClock, StreamId, StreamTree, TimedTransition};
pub use tetromino::{Catalog, CatalogError, FreeSpaces, Tetromino, TetrominoSet};
