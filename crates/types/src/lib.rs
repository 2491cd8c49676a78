//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no behaviour beyond conversions, making them
//! usable in any context (simulation, terminal rendering, scripted drivers).
//!
//! # Grid Dimensions
//!
//! - **Rows**: 20 (indexed 0-19, top to bottom)
//! - **Columns**: 10 (indexed 0-9, left to right)
//!
//! # Timing Constants
//!
//! All durations are milliseconds stored as `f64` so that partial ticks
//! accumulate without rounding:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 60 | Logical tick size used by the frame clock |
//! | `MAX_FRAME_MS` | 100 | Longest wall-clock frame accounted for |
//! | `START_DELAY_MS` | 1000 | Pause before the first piece spawns |
//! | `BASE_GRAVITY_MS` | 1000 | Gravity interval at level 1 |
//! | `GRAVITY_STEP_MS` | 50 | Gravity speed-up per level |
//! | `HARD_DROP_MS` | 100 | Hard-drop interpolation length |
//! | `CLEAR_DELAY_MS` | 200 | Delay before score publication and collapse |
//! | `COLLAPSE_MS` | 100 | Collapse interpolation length |
//!
//! # Examples
//!
//! ```
//! use brickfall_types::{GameAction, PieceKind, Rotation, GRID_COLS, GRID_ROWS};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Rotation::North.tag(), "0");
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//!
//! assert_eq!(GRID_ROWS, 20);
//! assert_eq!(GRID_COLS, 10);
//! ```

use serde::Serialize;

/// Grid height in cells (20 rows)
pub const GRID_ROWS: u8 = 20;

/// Grid width in cells (10 columns)
pub const GRID_COLS: u8 = 10;

/// Number of upcoming pieces kept in the spawn queue
pub const QUEUE_DEPTH: usize = 3;

/// Logical tick size in milliseconds
pub const TICK_MS: f64 = 60.0;

/// Upper bound on the wall-clock time accounted for in a single frame
pub const MAX_FRAME_MS: f64 = 100.0;

/// Delay between playground creation and the first spawn
pub const START_DELAY_MS: f64 = 1000.0;

/// Gravity interval at level 1
pub const BASE_GRAVITY_MS: f64 = 1000.0;

/// Gravity interval reduction per level
pub const GRAVITY_STEP_MS: f64 = 50.0;

/// Destroyed rows needed to advance one level
pub const ROWS_PER_LEVEL: u32 = 10;

/// Duration of the hard-drop interpolation
pub const HARD_DROP_MS: f64 = 100.0;

/// Delay between a line clear and both score publication and collapse start
pub const CLEAR_DELAY_MS: f64 = 200.0;

/// Duration of the post-clear collapse interpolation
pub const COLLAPSE_MS: f64 = 100.0;

/// Points per brick in a scoring group
pub const SCORE_PER_BRICK: u32 = 5;

/// Auto-repeat: delay before the first repeat
pub const REPEAT_BASE_MS: f64 = 80.0;

/// Auto-repeat: delay reduction per repeat already fired
pub const REPEAT_STEP_MS: f64 = 13.0;

/// Auto-repeat: shortest delay between repeats
pub const REPEAT_FLOOR_MS: f64 = 15.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_defaults() {
        assert_eq!(TICK_MS, 60.0);
        assert_eq!(MAX_FRAME_MS, 100.0);
        assert_eq!(START_DELAY_MS, 1000.0);
        assert_eq!(HARD_DROP_MS, 100.0);
        assert_eq!(CLEAR_DELAY_MS, 200.0);
        assert_eq!(COLLAPSE_MS, 100.0);
        assert!(REPEAT_FLOOR_MS < REPEAT_BASE_MS);
    }

    #[test]
    fn rotation_cycle_round_trips() {
        for r in Rotation::ALL {
            assert_eq!(r.rotate_cw().rotate_ccw(), r);
            assert_eq!(Rotation::from_index(r.index()), r);
        }
    }

    #[test]
    fn action_state_edges_clear_at_end_of_frame() {
        let mut state = ActionState::new();
        state.press(GameAction::MoveLeft);
        assert!(state.is_held(GameAction::MoveLeft));
        assert!(state.was_pressed(GameAction::MoveLeft));

        // Pressing again while held is not a new edge.
        state.end_frame();
        state.press(GameAction::MoveLeft);
        assert!(!state.was_pressed(GameAction::MoveLeft));

        state.release(GameAction::MoveLeft);
        assert!(!state.is_held(GameAction::MoveLeft));
    }

    #[test]
    fn palette_has_seven_distinct_colors() {
        let mut seen = Vec::new();
        for color in BrickColor::PALETTE {
            assert!(!seen.contains(&color.rgb()));
            seen.push(color.rgb());
        }
        assert_eq!(seen.len(), 7);
    }
}

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in catalog order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use brickfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Position of this kind in [`PieceKind::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// - **North**: Spawn orientation, tagged `0`
/// - **East**: Rotated 90° clockwise, tagged `R`
/// - **South**: Rotated 180°, tagged `2`
/// - **West**: Rotated 90° counter-clockwise, tagged `L`
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Every state, in clockwise order from spawn
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use brickfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Index in clockwise order (North = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Inverse of [`Rotation::index`], wrapping modulo 4
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// SRS state tag (`0`, `R`, `2`, `L`)
    pub fn tag(&self) -> &'static str {
        match self {
            Rotation::North => "0",
            Rotation::East => "R",
            Rotation::South => "2",
            Rotation::West => "L",
        }
    }

    /// Parse rotation from string
    ///
    /// Accepts full names, single letters or SRS tags (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "0" => Some(Rotation::North),
            "east" | "e" | "r" => Some(Rotation::East),
            "south" | "s" | "2" => Some(Rotation::South),
            "west" | "w" | "l" => Some(Rotation::West),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Logical player actions
///
/// Input collaborators report these as held/pressed; the playground decides
/// what each one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameAction {
    /// Move piece one cell left (auto-repeats while held)
    MoveLeft,
    /// Move piece one cell right (auto-repeats while held)
    MoveRight,
    /// Move piece one cell down and reset gravity (auto-repeats while held)
    SoftDrop,
    /// Animate the piece down to its landing position
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Toggle pause state
    Pause,
}

impl GameAction {
    pub const ALL: [GameAction; 7] = [
        GameAction::MoveLeft,
        GameAction::MoveRight,
        GameAction::SoftDrop,
        GameAction::HardDrop,
        GameAction::RotateCw,
        GameAction::RotateCcw,
        GameAction::Pause,
    ];

    /// Parse action from string (case-insensitive camelCase)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "pause" => Some(GameAction::Pause),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Pause => "pause",
        }
    }

    #[inline]
    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// One entry of the seven-color brick palette
///
/// Colors are chosen independently of the piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BrickColor(u8);

impl BrickColor {
    pub const PALETTE: [BrickColor; 7] = [
        BrickColor(0),
        BrickColor(1),
        BrickColor(2),
        BrickColor(3),
        BrickColor(4),
        BrickColor(5),
        BrickColor(6),
    ];

    const RGB: [(u8, u8, u8); 7] = [
        (0, 135, 160),
        (242, 204, 3),
        (210, 39, 87),
        (99, 51, 183),
        (46, 98, 171),
        (249, 139, 31),
        (1, 149, 133),
    ];

    /// Palette entry by index, wrapping modulo the palette size
    pub fn from_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// 24-bit color for presentation layers
    pub fn rgb(&self) -> (u8, u8, u8) {
        Self::RGB[self.index() % Self::RGB.len()]
    }
}

/// Capability set the playground needs from an input device.
///
/// Implementations report logical actions only; device specifics (key codes,
/// release detection) stay on the implementor's side.
pub trait InputSource {
    /// True while the action is being held down.
    fn is_held(&self, action: GameAction) -> bool;

    /// True if the action went from released to pressed during this frame.
    fn was_pressed(&self, action: GameAction) -> bool;
}

/// Held/pressed bookkeeping for [`GameAction`]s.
///
/// Drivers call [`ActionState::press`] and [`ActionState::release`] as device
/// events arrive and [`ActionState::end_frame`] after the playground consumed
/// the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    held: u8,
    pressed: u8,
}

impl ActionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an action held; records a key-down edge if it was released.
    pub fn press(&mut self, action: GameAction) {
        if self.held & action.bit() == 0 {
            self.pressed |= action.bit();
        }
        self.held |= action.bit();
    }

    pub fn release(&mut self, action: GameAction) {
        self.held &= !action.bit();
    }

    pub fn release_all(&mut self) {
        self.held = 0;
    }

    /// Forget this frame's key-down edges.
    pub fn end_frame(&mut self) {
        self.pressed = 0;
    }
}

impl InputSource for ActionState {
    fn is_held(&self, action: GameAction) -> bool {
        self.held & action.bit() != 0
    }

    fn was_pressed(&self, action: GameAction) -> bool {
        self.pressed & action.bit() != 0
    }
}

/// An input source with nothing pressed, for headless stepping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_held(&self, _action: GameAction) -> bool {
        false
    }

    fn was_pressed(&self, _action: GameAction) -> bool {
        false
    }
}
