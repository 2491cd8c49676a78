//! Grid module - the cell matrix and the brick arena
//!
//! The grid is a `rows x cols` matrix of cells stored flat in row-major
//! order. Neighbour links are wired once at construction and never change.
//! Coordinates: (x, y) where x is the column (left to right) and y the row
//! (top to bottom).
//!
//! Every brick lives in the grid's arena and is addressed by [`BrickId`].
//! A cell refers to at most one brick and the brick refers back to its
//! cell. Moves keep that link consistent: a brick leaving a cell only clears
//! it if the cell still points at that brick, so a figure can shift its
//! bricks one after another through cells its siblings are still leaving.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::warn;

use crate::brick::{Brick, BrickId};
use crate::figure::FigureId;
use crate::types::BrickColor;

/// Flat index of a cell (`row * cols + col`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellId(pub u16);

/// Neighbour direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// `(dx, dy)` of one step in this direction
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn slot(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

/// One grid cell with its fixed neighbour links
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    neighbors: [Option<CellId>; 4],
    brick: Option<BrickId>,
}

impl GridCell {
    pub fn neighbor(&self, dir: Direction) -> Option<CellId> {
        self.neighbors[dir.slot()]
    }

    pub fn brick(&self) -> Option<BrickId> {
        self.brick
    }
}

/// The playfield: cells plus every live brick
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<GridCell>,
    bricks: BTreeMap<BrickId, Brick>,
    next_brick: u32,
}

impl Grid {
    /// Build a `rows x cols` grid and wire neighbour links
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let link = |dr: i32, dc: i32| {
                    let r = row as i32 + dr;
                    let c = col as i32 + dc;
                    (r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols)
                        .then(|| CellId((r as usize * cols + c as usize) as u16))
                };
                cells.push(GridCell {
                    row,
                    col,
                    neighbors: [link(-1, 0), link(0, 1), link(1, 0), link(0, -1)],
                    brick: None,
                });
            }
        }

        Self {
            rows,
            cols,
            cells,
            bricks: BTreeMap::new(),
            next_brick: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at column `x`, row `y`; `None` when out of bounds
    #[inline]
    pub fn cell_id(&self, x: i32, y: i32) -> Option<CellId> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        Some(CellId((y as usize * self.cols + x as usize) as u16))
    }

    pub fn cell(&self, id: CellId) -> &GridCell {
        &self.cells[id.0 as usize]
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// `(x, y)` of a cell
    pub fn position(&self, id: CellId) -> (i32, i32) {
        let cell = self.cell(id);
        (cell.col as i32, cell.row as i32)
    }

    pub fn brick_at(&self, id: CellId) -> Option<BrickId> {
        self.cell(id).brick
    }

    pub fn brick(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.get(&id)
    }

    /// All live bricks in id order
    pub fn bricks(&self) -> impl Iterator<Item = (BrickId, &Brick)> {
        self.bricks.iter().map(|(&id, brick)| (id, brick))
    }

    pub fn brick_count(&self) -> usize {
        self.bricks.len()
    }

    /// Free for a moving figure: empty, or holding a brick that is still
    /// owned by a figure.
    pub fn is_cell_free(&self, id: CellId) -> bool {
        match self.cell(id).brick {
            None => true,
            Some(brick) => self.bricks.get(&brick).is_some_and(|b| b.figure.is_some()),
        }
    }

    /// In bounds and free (see [`Grid::is_cell_free`])
    pub fn check_for_free_place(&self, x: i32, y: i32) -> bool {
        self.cell_id(x, y).is_some_and(|id| self.is_cell_free(id))
    }

    /// The neighbour in `dir` if it exists and is free
    pub fn free_neighbor(&self, id: CellId, dir: Direction) -> Option<CellId> {
        self.cell(id)
            .neighbor(dir)
            .filter(|&next| self.is_cell_free(next))
    }

    pub fn check_top_for_free(&self, id: CellId) -> Option<CellId> {
        self.free_neighbor(id, Direction::Up)
    }

    pub fn check_bottom_for_free(&self, id: CellId) -> Option<CellId> {
        self.free_neighbor(id, Direction::Down)
    }

    pub fn check_left_for_free(&self, id: CellId) -> Option<CellId> {
        self.free_neighbor(id, Direction::Left)
    }

    pub fn check_right_for_free(&self, id: CellId) -> Option<CellId> {
        self.free_neighbor(id, Direction::Right)
    }

    /// True if every cell of `row` holds a brick
    pub fn is_row_filled(&self, row: usize) -> bool {
        let start = row * self.cols;
        self.cells[start..start + self.cols]
            .iter()
            .all(|cell| cell.brick.is_some())
    }

    /// Indices of all completely filled rows, top to bottom
    pub fn get_filled_lines(&self) -> ArrayVec<usize, 32> {
        let mut lines = ArrayVec::new();
        for row in 0..self.rows {
            if self.is_row_filled(row) && lines.try_push(row).is_err() {
                warn!(row, "too many filled rows in one check");
                break;
            }
        }
        lines
    }

    /// Bricks of `row` in column order
    pub fn get_bricks_in_row(&self, row: usize) -> Vec<BrickId> {
        if row >= self.rows {
            return Vec::new();
        }
        let start = row * self.cols;
        self.cells[start..start + self.cols]
            .iter()
            .filter_map(|cell| cell.brick)
            .collect()
    }

    /// Create a brick in an empty cell.
    ///
    /// Returns `None` (and leaves the grid untouched) when the cell already
    /// holds a brick.
    pub fn place_brick(
        &mut self,
        cell: CellId,
        color: BrickColor,
        figure: Option<FigureId>,
    ) -> Option<BrickId> {
        if let Some(existing) = self.cell(cell).brick {
            warn!(?cell, ?existing, "place into occupied cell");
            return None;
        }
        let id = BrickId(self.next_brick);
        self.next_brick += 1;
        self.bricks.insert(id, Brick::new(figure, cell, color));
        self.cells[cell.0 as usize].brick = Some(id);
        Some(id)
    }

    /// Move a brick to `to`, overwriting whatever the target points at.
    pub fn move_brick(&mut self, id: BrickId, to: CellId) {
        let Some(brick) = self.bricks.get_mut(&id) else {
            warn!(?id, "move of unknown brick");
            return;
        };
        let from = brick.cell;
        brick.cell = to;

        let old = &mut self.cells[from.0 as usize];
        if old.brick == Some(id) {
            old.brick = None;
        }
        self.cells[to.0 as usize].brick = Some(id);
    }

    /// Detach a brick from its figure; it becomes a settled brick.
    pub fn release_brick(&mut self, id: BrickId) {
        match self.bricks.get_mut(&id) {
            Some(brick) => brick.figure = None,
            None => warn!(?id, "release of unknown brick"),
        }
    }

    /// Remove a brick from the arena and its cell.
    pub fn destroy_brick(&mut self, id: BrickId) -> Option<Brick> {
        let Some(brick) = self.bricks.remove(&id) else {
            warn!(?id, "destroy of unknown brick");
            return None;
        };
        let cell = &mut self.cells[brick.cell.0 as usize];
        if cell.brick == Some(id) {
            cell.brick = None;
        } else {
            warn!(?id, cell = ?brick.cell, "cell no longer points at destroyed brick");
        }
        Some(brick)
    }

    /// Record the hard-drop destination of a brick.
    pub fn fall_start(&mut self, id: BrickId, target: CellId) {
        if let Some(brick) = self.bricks.get_mut(&id) {
            brick.falling = Some(target);
        }
    }

    /// Commit a brick to its hard-drop destination.
    pub fn fall_stop(&mut self, id: BrickId) {
        let target = self.bricks.get_mut(&id).and_then(|b| b.falling.take());
        match target {
            Some(target) => self.move_brick(id, target),
            None => warn!(?id, "fall stop without fall start"),
        }
    }

    /// Record the collapse destination of a brick.
    pub fn smooth_move_start(&mut self, id: BrickId, target: CellId) {
        if let Some(brick) = self.bricks.get_mut(&id) {
            brick.smooth_moving = Some(target);
        }
    }

    /// Commit a brick to its collapse destination.
    pub fn smooth_move_stop(&mut self, id: BrickId) {
        let target = self.bricks.get_mut(&id).and_then(|b| b.smooth_moving.take());
        if let Some(target) = target {
            self.move_brick(id, target);
        }
    }
}
