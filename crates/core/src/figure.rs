//! Figure module - the active (or queued) tetromino instance
//!
//! A figure is generated off-board with a random shape, color and spawn
//! column, waits in the queue, and is then activated: one brick per occupied
//! shape cell is placed into the grid. From there every move or rotation is
//! all-or-nothing. Legality is checked for every brick before any brick
//! moves.
//!
//! # Coordinates
//!
//! `(x, y)` is the grid position of the shape matrix's top-left corner. It can
//! be negative when the matrix has empty leading columns or rows. Brick `i`
//! always sits on the `i`-th occupied matrix cell in row-major order.
//!
//! # Hard drop
//!
//! [`Figure::begin_fall`] only records each brick's destination; the grid is
//! not touched until [`Figure::finish_fall`] commits all of them at once.
//! While a fall runs, movement and rotation are rejected.

use std::sync::Arc;

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::warn;

use crate::brick::BrickId;
use crate::grid::{Direction, Grid};
use crate::rng::SimpleRng;
use crate::snapshot::FigureView;
use crate::stream::{StreamId, StreamTree};
use crate::tetromino::{ShapeOffsets, Tetromino, TetrominoSet, MAX_BLOCKS};
use crate::types::{BrickColor, PieceKind, Rotation};

/// Identifies a figure for the lifetime of a playground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FigureId(pub u32);

#[derive(Debug, Clone)]
pub struct Figure {
    id: FigureId,
    set: Arc<TetrominoSet>,
    index: usize,
    color: BrickColor,
    x: i32,
    y: i32,
    finish_y: i32,
    bricks: ArrayVec<BrickId, MAX_BLOCKS>,
    falling: bool,
    fall_progress: f64,
    stream: Option<StreamId>,
}

impl Figure {
    /// Create an inactive figure at a random spawn column.
    ///
    /// The column range keeps every occupied cell inside `cols`, using the
    /// base variant's empty margins. The rotation always starts at the base
    /// variant.
    pub fn generate(
        id: FigureId,
        set: Arc<TetrominoSet>,
        color: BrickColor,
        cols: usize,
        rng: &mut SimpleRng,
    ) -> Self {
        let base = set.variant(0);
        let free = base.free_spaces();
        let min_x = -(free.left as i32);
        let max_x = cols as i32 - base.size() as i32 + free.right as i32;
        let x = rng.next_between(min_x, max_x);
        Self::at(id, set, color, x)
    }

    /// Create an inactive figure with its shape's top row at `y = 0`.
    pub fn at(id: FigureId, set: Arc<TetrominoSet>, color: BrickColor, x: i32) -> Self {
        let y = -(set.variant(0).free_spaces().top as i32);
        Self {
            id,
            set,
            index: 0,
            color,
            x,
            y,
            finish_y: y,
            bricks: ArrayVec::new(),
            falling: false,
            fall_progress: 0.0,
            stream: None,
        }
    }

    pub fn id(&self) -> FigureId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.set.kind()
    }

    pub fn tetromino(&self) -> &Tetromino {
        self.set.variant(self.index)
    }

    pub fn rotation(&self) -> Rotation {
        self.tetromino().state()
    }

    pub fn rotation_index(&self) -> usize {
        self.index
    }

    pub fn color(&self) -> BrickColor {
        self.color
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Landing row of the anchor, kept current after every change
    pub fn finish_y(&self) -> i32 {
        self.finish_y
    }

    pub fn bricks(&self) -> &[BrickId] {
        &self.bricks
    }

    /// True once bricks have been placed into the grid
    pub fn is_active(&self) -> bool {
        !self.bricks.is_empty()
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn fall_progress(&self) -> f64 {
        self.fall_progress
    }

    pub fn set_fall_progress(&mut self, progress: f64) {
        self.fall_progress = progress;
    }

    /// Scheduler node carrying this figure's animations
    pub fn stream(&self) -> Option<StreamId> {
        self.stream
    }

    pub fn set_stream(&mut self, stream: StreamId) {
        self.stream = Some(stream);
    }

    /// Absolute cells of variant `index` anchored at `(x, y)`
    pub fn cells_at(&self, index: usize, x: i32, y: i32) -> ShapeOffsets {
        self.set
            .variant(index)
            .offsets()
            .into_iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .collect()
    }

    /// Current absolute cells
    pub fn cells(&self) -> ShapeOffsets {
        self.cells_at(self.index, self.x, self.y)
    }

    /// True if variant `index` fits at `(x, y)`; this figure's own bricks
    /// count as free.
    pub fn can_place(&self, grid: &Grid, index: usize, x: i32, y: i32) -> bool {
        self.cells_at(index, x, y)
            .iter()
            .all(|&(cx, cy)| grid.check_for_free_place(cx, cy))
    }

    /// Place one brick per shape cell into the grid.
    ///
    /// Returns false, leaving the grid untouched, when any spawn cell is out
    /// of bounds or occupied.
    pub fn activate(&mut self, grid: &mut Grid) -> bool {
        if self.is_active() {
            return false;
        }
        let mut targets = ArrayVec::<_, MAX_BLOCKS>::new();
        for (cx, cy) in self.cells() {
            match grid.cell_id(cx, cy) {
                Some(cell) if grid.brick_at(cell).is_none() => targets.push(cell),
                _ => return false,
            }
        }

        for cell in targets {
            match grid.place_brick(cell, self.color, Some(self.id)) {
                Some(brick) => self.bricks.push(brick),
                None => warn!(figure = ?self.id, ?cell, "spawn cell taken during activation"),
            }
        }
        self.update_finish(grid);
        true
    }

    /// Lowest anchor row reachable by dropping straight down.
    ///
    /// Does not mutate anything, so repeated calls agree.
    pub fn finish_position(&self, grid: &Grid) -> i32 {
        let mut y = self.y;
        while self.can_place(grid, self.index, self.x, y + 1) {
            y += 1;
        }
        y
    }

    fn update_finish(&mut self, grid: &Grid) {
        self.finish_y = self.finish_position(grid);
    }

    fn try_move(&mut self, grid: &mut Grid, dir: Direction) -> bool {
        if self.falling || !self.is_active() {
            return false;
        }

        let mut targets = ArrayVec::<_, MAX_BLOCKS>::new();
        for &brick in &self.bricks {
            let Some(cell) = grid.brick(brick).map(|b| b.cell) else {
                warn!(figure = ?self.id, ?brick, "figure holds unknown brick");
                return false;
            };
            match grid.free_neighbor(cell, dir) {
                Some(next) => targets.push(next),
                None => return false,
            }
        }

        for (&brick, &target) in self.bricks.iter().zip(&targets) {
            grid.move_brick(brick, target);
        }
        let (dx, dy) = dir.offset();
        self.x += dx;
        self.y += dy;
        self.update_finish(grid);
        true
    }

    pub fn try_move_left(&mut self, grid: &mut Grid) -> bool {
        self.try_move(grid, Direction::Left)
    }

    pub fn try_move_right(&mut self, grid: &mut Grid) -> bool {
        self.try_move(grid, Direction::Right)
    }

    pub fn try_move_bottom(&mut self, grid: &mut Grid) -> bool {
        self.try_move(grid, Direction::Down)
    }

    /// SRS rotation: try each kick offset in order and commit the first
    /// placement that fits.
    fn rotate(&mut self, grid: &mut Grid, clockwise: bool) -> bool {
        if self.falling || !self.is_active() || !self.tetromino().has_tests() {
            return false;
        }

        let to = if clockwise {
            self.set.next_index(self.index)
        } else {
            self.set.prev_index(self.index)
        };
        let from_state = self.tetromino().state();
        let to_state = self.set.variant(to).state();
        let Some(tests) = self.tetromino().test(from_state, to_state) else {
            warn!(kind = ?self.kind(), ?from_state, ?to_state, "missing kick test");
            return false;
        };

        let Some((x, y)) = tests
            .iter()
            .map(|&(dx, dy)| (self.x + dx, self.y + dy))
            .find(|&(x, y)| self.can_place(grid, to, x, y))
        else {
            return false;
        };

        let cells = self.cells_at(to, x, y);
        for (&brick, &(cx, cy)) in self.bricks.iter().zip(&cells) {
            if let Some(cell) = grid.cell_id(cx, cy) {
                grid.move_brick(brick, cell);
            }
        }
        self.index = to;
        self.x = x;
        self.y = y;
        self.update_finish(grid);
        true
    }

    pub fn rotate_right(&mut self, grid: &mut Grid) -> bool {
        self.rotate(grid, true)
    }

    pub fn rotate_left(&mut self, grid: &mut Grid) -> bool {
        self.rotate(grid, false)
    }

    /// True if any brick cannot move down one row
    pub fn is_the_end(&self, grid: &Grid) -> bool {
        self.bricks.iter().any(|&brick| {
            grid.brick(brick)
                .map_or(true, |b| grid.check_bottom_for_free(b.cell).is_none())
        })
    }

    /// Start a hard drop toward the landing row.
    ///
    /// Returns false when already falling or already resting on the landing
    /// row.
    pub fn begin_fall(&mut self, grid: &mut Grid) -> bool {
        if self.falling || !self.is_active() {
            return false;
        }
        self.update_finish(grid);
        if self.finish_y == self.y {
            return false;
        }

        let cells = self.cells_at(self.index, self.x, self.finish_y);
        for (&brick, &(cx, cy)) in self.bricks.iter().zip(&cells) {
            if let Some(cell) = grid.cell_id(cx, cy) {
                grid.fall_start(brick, cell);
            }
        }
        self.falling = true;
        self.fall_progress = 0.0;
        true
    }

    /// Commit every brick to its landing cell and end the fall.
    pub fn finish_fall(&mut self, grid: &mut Grid) {
        if !self.falling {
            return;
        }
        for &brick in &self.bricks {
            grid.fall_stop(brick);
        }
        self.y = self.finish_y;
        self.falling = false;
        self.fall_progress = 1.0;
        self.update_finish(grid);
    }

    /// Drop the figure's scheduler node and settle its bricks.
    pub fn destroy<T>(self, grid: &mut Grid, streams: &mut StreamTree<T>) {
        if let Some(stream) = self.stream {
            streams.destroy(stream);
        }
        for &brick in &self.bricks {
            grid.release_brick(brick);
        }
    }

    pub fn view(&self) -> FigureView {
        FigureView {
            id: self.id,
            kind: self.kind(),
            rotation: self.rotation(),
            x: self.x,
            y: self.y,
            color: self.color,
            cells: self.cells().to_vec(),
            finish_y: self.finish_y,
            falling: self.falling,
            fall_progress: self.fall_progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::Catalog;

    fn figure(kind: PieceKind, x: i32) -> Figure {
        let catalog = Catalog::standard().unwrap();
        Figure::at(
            FigureId(0),
            catalog.get(kind).clone(),
            BrickColor::from_index(0),
            x,
        )
    }

    #[test]
    fn test_activate_places_bricks_and_computes_finish() {
        let mut grid = Grid::new(20, 10);
        let mut fig = figure(PieceKind::O, 4);
        assert!(fig.activate(&mut grid));
        assert_eq!(fig.bricks().len(), 4);
        assert_eq!(grid.brick_count(), 4);
        assert_eq!(fig.y(), 0);
        assert_eq!(fig.finish_y(), 18);
        assert!(!fig.activate(&mut grid));
    }

    #[test]
    fn test_spawn_column_stays_in_bounds() {
        let catalog = Catalog::standard().unwrap();
        let mut rng = SimpleRng::new(3);
        for _ in 0..200 {
            for kind in PieceKind::ALL {
                let fig = Figure::generate(
                    FigureId(0),
                    catalog.get(kind).clone(),
                    BrickColor::from_index(0),
                    10,
                    &mut rng,
                );
                for (x, y) in fig.cells() {
                    assert!((0..10).contains(&x), "{kind:?} x={x}");
                    assert!(y >= 0);
                }
            }
        }
    }

    #[test]
    fn test_move_right_until_wall() {
        let mut grid = Grid::new(20, 10);
        let mut fig = figure(PieceKind::O, 7);
        fig.activate(&mut grid);
        assert!(fig.try_move_right(&mut grid));
        assert!(!fig.try_move_right(&mut grid));
        assert_eq!(fig.x(), 8);
        let cols: Vec<_> = fig.cells().iter().map(|c| c.0).collect();
        assert!(cols.iter().all(|&c| c == 8 || c == 9));
    }

    #[test]
    fn test_rotation_commits_bricks_in_shape_order() {
        let mut grid = Grid::new(20, 10);
        let mut fig = figure(PieceKind::T, 3);
        fig.activate(&mut grid);
        assert!(fig.rotate_right(&mut grid));
        assert_eq!(fig.rotation(), Rotation::East);
        for (&brick, &(x, y)) in fig.bricks().iter().zip(&fig.cells()) {
            assert_eq!(grid.brick(brick).unwrap().cell, grid.cell_id(x, y).unwrap());
        }
        assert_eq!(grid.brick_count(), 4);
    }

    #[test]
    fn test_o_piece_does_not_rotate() {
        let mut grid = Grid::new(20, 10);
        let mut fig = figure(PieceKind::O, 3);
        fig.activate(&mut grid);
        assert!(!fig.rotate_right(&mut grid));
        assert!(!fig.rotate_left(&mut grid));
    }

    #[test]
    fn test_fall_commits_only_on_finish() {
        let mut grid = Grid::new(20, 10);
        let mut fig = figure(PieceKind::O, 0);
        fig.activate(&mut grid);
        let start_cells = fig.cells();

        assert!(fig.begin_fall(&mut grid));
        assert!(fig.is_falling());
        assert!(!fig.try_move_right(&mut grid));
        assert!(!fig.begin_fall(&mut grid));
        for (x, y) in start_cells {
            assert!(grid.brick_at(grid.cell_id(x, y).unwrap()).is_some());
        }

        fig.finish_fall(&mut grid);
        assert!(!fig.is_falling());
        assert_eq!(fig.y(), 18);
        assert!(fig.is_the_end(&grid));
        assert!(!fig.begin_fall(&mut grid));
    }
}
