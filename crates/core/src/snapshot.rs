//! Read-only views of playground state for renderers and drivers.

use serde::Serialize;

use crate::figure::FigureId;
use crate::playground::Phase;
use crate::types::{BrickColor, PieceKind, Rotation};

/// Active figure as seen from outside
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureView {
    pub id: FigureId,
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    pub color: BrickColor,
    /// Absolute `(x, y)` of every brick, in brick order
    pub cells: Vec<(i32, i32)>,
    pub finish_y: i32,
    pub falling: bool,
    pub fall_progress: f64,
}

/// Queued figure: only what a preview panel needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuedView {
    pub kind: PieceKind,
    pub color: BrickColor,
}

/// Contents of one occupied cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub color: BrickColor,
    /// Owned by the active figure
    pub active: bool,
    /// `(x, y)` the brick is animating toward
    pub target: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major, `cells[y][x]`
    pub cells: Vec<Vec<Option<CellView>>>,
    pub active: Option<FigureView>,
    pub queue: Vec<QueuedView>,
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub destroyed_rows: u32,
    /// Post-clear collapse progress, 0 when idle
    pub collapse_progress: f64,
    pub paused: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn cell(&self, x: usize, y: usize) -> Option<CellView> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }

    /// Number of occupied cells
    pub fn brick_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}
