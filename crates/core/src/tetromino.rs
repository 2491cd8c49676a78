//! Tetromino catalog - shape matrices, free-space margins and SRS wall kicks
//!
//! Every shape is described by a square occupancy matrix per rotation state.
//! Margins (empty rows/columns around the blocks) are derived from the matrix
//! once, at catalog construction, and drive spawn placement.
//!
//! Rows grow downward on the grid, so every kick offset below is the
//! published SRS offset with its `dy` negated.
//! Reference: https://tetris.wiki/Super_Rotation_System

use std::sync::Arc;

use arrayvec::ArrayVec;
use serde::Serialize;
use thiserror::Error;

use crate::types::{PieceKind, Rotation};

/// Largest shape matrix side (the I piece)
pub const MAX_SHAPE_SIZE: usize = 4;

/// Upper bound on blocks in one shape
pub const MAX_BLOCKS: usize = MAX_SHAPE_SIZE * MAX_SHAPE_SIZE;

/// Candidate translation tried during a rotation, in grid units
pub type Kick = (i32, i32);

/// Block offsets of one shape, relative to its matrix origin
pub type ShapeOffsets = ArrayVec<(i32, i32), MAX_BLOCKS>;

/// Static data problems found while building the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{kind:?} {state:?}: row {row} has {len} cells, expected {size}")]
    NotSquare {
        kind: PieceKind,
        state: Rotation,
        row: usize,
        len: usize,
        size: usize,
    },

    #[error("{kind:?} {state:?}: matrix size {size} is outside 1..={max}")]
    BadSize {
        kind: PieceKind,
        state: Rotation,
        size: usize,
        max: usize,
    },

    #[error("{kind:?} {state:?}: cell value {value} is not 0 or 1")]
    InvalidCell {
        kind: PieceKind,
        state: Rotation,
        value: u8,
    },

    #[error("{kind:?} {state:?}: shape has no blocks")]
    Empty { kind: PieceKind, state: Rotation },

    #[error("{kind:?}: rotation variants disagree on block count")]
    BlockCountMismatch { kind: PieceKind },

    #[error("{kind:?}: variant {index} is tagged {found:?}, expected {expected:?}")]
    StateMismatch {
        kind: PieceKind,
        index: usize,
        found: Rotation,
        expected: Rotation,
    },

    #[error("{kind:?}: no wall-kick test for {from:?} -> {to:?}")]
    MissingKick {
        kind: PieceKind,
        from: Rotation,
        to: Rotation,
    },
}

/// Empty rows/columns around the occupied part of a shape matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FreeSpaces {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

/// Ordered kick offsets for one rotation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickTest {
    pub from: Rotation,
    pub to: Rotation,
    pub offsets: [Kick; 5],
}

/// Kick tests for all eight single-step transitions of one shape family.
pub type KickTable = [KickTest; 8];

const fn kick(from: Rotation, to: Rotation, offsets: [Kick; 5]) -> KickTest {
    KickTest { from, to, offsets }
}

use Rotation::{East as R, North as N0, South as S2, West as L};

/// Shared by J, L, S, T and Z
pub static JLSTZ_KICKS: KickTable = [
    kick(N0, R, [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
    kick(R, N0, [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
    kick(R, S2, [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
    kick(S2, R, [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
    kick(S2, L, [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
    kick(L, S2, [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
    kick(L, N0, [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
    kick(N0, L, [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
];

pub static I_KICKS: KickTable = [
    kick(N0, R, [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)]),
    kick(R, N0, [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)]),
    kick(R, S2, [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)]),
    kick(S2, R, [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)]),
    kick(S2, L, [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)]),
    kick(L, S2, [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)]),
    kick(L, N0, [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)]),
    kick(N0, L, [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)]),
];

type ShapeRows = &'static [&'static [u8]];

static I_SHAPES: [ShapeRows; 4] = [
    &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    &[&[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0]],
    &[&[0, 0, 0, 0], &[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0]],
    &[&[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0]],
];

static O_SHAPES: [ShapeRows; 1] = [&[&[1, 1], &[1, 1]]];

static T_SHAPES: [ShapeRows; 4] = [
    &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 1], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1, 0], &[1, 1, 0], &[0, 1, 0]],
];

static S_SHAPES: [ShapeRows; 4] = [
    &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 1], &[0, 0, 1]],
    &[&[0, 0, 0], &[0, 1, 1], &[1, 1, 0]],
    &[&[1, 0, 0], &[1, 1, 0], &[0, 1, 0]],
];

static Z_SHAPES: [ShapeRows; 4] = [
    &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
    &[&[0, 0, 1], &[0, 1, 1], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 0], &[0, 1, 1]],
    &[&[0, 1, 0], &[1, 1, 0], &[1, 0, 0]],
];

static J_SHAPES: [ShapeRows; 4] = [
    &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 1], &[0, 1, 0], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 1], &[0, 0, 1]],
    &[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]],
];

static L_SHAPES: [ShapeRows; 4] = [
    &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]],
    &[&[0, 0, 0], &[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1, 0], &[0, 1, 0], &[0, 1, 0]],
];

fn shape_rows(kind: PieceKind) -> &'static [ShapeRows] {
    match kind {
        PieceKind::I => &I_SHAPES,
        PieceKind::O => &O_SHAPES,
        PieceKind::T => &T_SHAPES,
        PieceKind::S => &S_SHAPES,
        PieceKind::Z => &Z_SHAPES,
        PieceKind::J => &J_SHAPES,
        PieceKind::L => &L_SHAPES,
    }
}

fn kick_table(kind: PieceKind) -> Option<&'static KickTable> {
    match kind {
        PieceKind::O => None,
        PieceKind::I => Some(&I_KICKS),
        _ => Some(&JLSTZ_KICKS),
    }
}

/// One rotation state of one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetromino {
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
    size: usize,
    free: FreeSpaces,
    blocks_count: usize,
    state: Rotation,
    tests: Option<&'static KickTable>,
}

impl Tetromino {
    /// Build a variant from a square 0/1 matrix.
    pub fn from_rows(
        kind: PieceKind,
        state: Rotation,
        rows: &[&[u8]],
        tests: Option<&'static KickTable>,
    ) -> Result<Self, CatalogError> {
        let size = rows.len();
        if size == 0 || size > MAX_SHAPE_SIZE {
            return Err(CatalogError::BadSize {
                kind,
                state,
                size,
                max: MAX_SHAPE_SIZE,
            });
        }

        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut blocks_count = 0;
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(CatalogError::NotSquare {
                    kind,
                    state,
                    row,
                    len: values.len(),
                    size,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                match value {
                    0 => {}
                    1 => {
                        cells[row][col] = true;
                        blocks_count += 1;
                    }
                    value => return Err(CatalogError::InvalidCell { kind, state, value }),
                }
            }
        }
        if blocks_count == 0 {
            return Err(CatalogError::Empty { kind, state });
        }

        let mut tetromino = Self {
            cells,
            size,
            free: FreeSpaces::default(),
            blocks_count,
            state,
            tests,
        };
        tetromino.free = tetromino.compute_free_spaces();
        Ok(tetromino)
    }

    fn row_empty(&self, row: usize) -> bool {
        (0..self.size).all(|col| !self.cells[row][col])
    }

    fn col_empty(&self, col: usize) -> bool {
        (0..self.size).all(|row| !self.cells[row][col])
    }

    fn compute_free_spaces(&self) -> FreeSpaces {
        let rows = 0..self.size;
        FreeSpaces {
            top: rows.clone().take_while(|&r| self.row_empty(r)).count(),
            bottom: rows.clone().rev().take_while(|&r| self.row_empty(r)).count(),
            left: rows.clone().take_while(|&c| self.col_empty(c)).count(),
            right: rows.rev().take_while(|&c| self.col_empty(c)).count(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn free_spaces(&self) -> FreeSpaces {
        self.free
    }

    pub fn blocks_count(&self) -> usize {
        self.blocks_count
    }

    /// Width of the occupied columns only
    pub fn pure_width(&self) -> usize {
        self.size - self.free.left - self.free.right
    }

    /// Height of the occupied rows only
    pub fn pure_height(&self) -> usize {
        self.size - self.free.top - self.free.bottom
    }

    pub fn state(&self) -> Rotation {
        self.state
    }

    /// True if this shape can rotate (has a kick table)
    pub fn has_tests(&self) -> bool {
        self.tests.is_some()
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// `(dx, dy)` of every block in row-major order.
    ///
    /// Figures rely on this order staying stable across rotations: the i-th
    /// brick always maps to the i-th offset.
    pub fn offsets(&self) -> ShapeOffsets {
        let mut out = ShapeOffsets::new();
        for row in 0..self.size {
            for col in 0..self.size {
                if self.cells[row][col] {
                    out.push((col as i32, row as i32));
                }
            }
        }
        out
    }

    /// Kick offsets for `from -> to`, in the order they must be tried.
    pub fn test(&self, from: Rotation, to: Rotation) -> Option<&'static [Kick]> {
        self.tests?
            .iter()
            .find(|t| t.from == from && t.to == to)
            .map(|t| &t.offsets[..])
    }
}

/// All rotation variants of one piece kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetrominoSet {
    kind: PieceKind,
    variants: Vec<Tetromino>,
}

impl TetrominoSet {
    fn build(kind: PieceKind) -> Result<Self, CatalogError> {
        let tests = kick_table(kind);
        let variants = shape_rows(kind)
            .iter()
            .enumerate()
            .map(|(i, rows)| Tetromino::from_rows(kind, Rotation::from_index(i), rows, tests))
            .collect::<Result<Vec<_>, _>>()?;

        let set = Self { kind, variants };
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let kind = self.kind;
        let Some(first) = self.variants.first() else {
            return Err(CatalogError::Empty {
                kind,
                state: Rotation::North,
            });
        };

        for (index, variant) in self.variants.iter().enumerate() {
            let expected = Rotation::from_index(index);
            if variant.state != expected {
                return Err(CatalogError::StateMismatch {
                    kind,
                    index,
                    found: variant.state,
                    expected,
                });
            }
            if variant.blocks_count != first.blocks_count {
                return Err(CatalogError::BlockCountMismatch { kind });
            }
            if variant.has_tests() {
                for to in [self.next_index(index), self.prev_index(index)] {
                    let to = self.variants[to].state;
                    if variant.test(variant.state, to).is_none() {
                        return Err(CatalogError::MissingKick {
                            kind,
                            from: variant.state,
                            to,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[Tetromino] {
        &self.variants
    }

    /// Variant by index, wrapping modulo the variant count.
    pub fn variant(&self, index: usize) -> &Tetromino {
        &self.variants[index % self.variants.len()]
    }

    /// Clockwise neighbour index.
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 >= self.variants.len() {
            0
        } else {
            index + 1
        }
    }

    /// Counter-clockwise neighbour index.
    pub fn prev_index(&self, index: usize) -> usize {
        if index == 0 {
            self.variants.len() - 1
        } else {
            index - 1
        }
    }
}

/// The seven standard shapes, built and validated once per playground.
#[derive(Debug, Clone)]
pub struct Catalog {
    sets: Vec<Arc<TetrominoSet>>,
}

impl Catalog {
    pub fn standard() -> Result<Self, CatalogError> {
        let sets = PieceKind::ALL
            .iter()
            .map(|&kind| TetrominoSet::build(kind).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sets })
    }

    pub fn get(&self, kind: PieceKind) -> &Arc<TetrominoSet> {
        &self.sets[kind.index()]
    }

    pub fn sets(&self) -> &[Arc<TetrominoSet>] {
        &self.sets
    }

    /// Largest matrix side over all variants
    pub fn max_size(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|set| set.variants.iter().map(|v| v.size))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_builds() {
        let catalog = Catalog::standard().unwrap();
        assert_eq!(catalog.sets().len(), 7);
        assert_eq!(catalog.max_size(), 4);
        for set in catalog.sets() {
            let expected = if set.kind() == PieceKind::O { 1 } else { 4 };
            assert_eq!(set.len(), expected, "{:?}", set.kind());
            for variant in set.variants() {
                assert_eq!(variant.blocks_count(), 4);
            }
        }
    }

    #[test]
    fn free_spaces_of_i_piece() {
        let catalog = Catalog::standard().unwrap();
        let i = catalog.get(PieceKind::I);

        let north = i.variant(0);
        assert_eq!(
            north.free_spaces(),
            FreeSpaces {
                top: 1,
                right: 0,
                bottom: 2,
                left: 0
            }
        );
        assert_eq!(north.pure_width(), 4);
        assert_eq!(north.pure_height(), 1);

        let east = i.variant(1);
        assert_eq!(
            east.free_spaces(),
            FreeSpaces {
                top: 0,
                right: 1,
                bottom: 0,
                left: 2
            }
        );
        assert_eq!(east.pure_width(), 1);
        assert_eq!(east.pure_height(), 4);
    }

    #[test]
    fn o_piece_has_no_kicks() {
        let catalog = Catalog::standard().unwrap();
        let o = catalog.get(PieceKind::O).variant(0);
        assert!(!o.has_tests());
        assert_eq!(o.free_spaces(), FreeSpaces::default());
        assert_eq!(o.test(Rotation::North, Rotation::East), None);
    }

    #[test]
    fn kick_lookup_starts_with_identity() {
        let catalog = Catalog::standard().unwrap();
        let t = catalog.get(PieceKind::T).variant(0);
        let offsets = t.test(Rotation::North, Rotation::East).unwrap();
        assert_eq!(offsets[0], (0, 0));
        assert_eq!(offsets[1], (-1, 0));
        assert_eq!(offsets.len(), 5);
    }

    #[test]
    fn offsets_are_row_major() {
        let catalog = Catalog::standard().unwrap();
        let j = catalog.get(PieceKind::J).variant(0);
        assert_eq!(j.offsets().as_slice(), &[(0, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn malformed_matrices_are_rejected() {
        let err = Tetromino::from_rows(PieceKind::T, Rotation::North, &[&[1, 1], &[1]], None);
        assert!(matches!(err, Err(CatalogError::NotSquare { row: 1, .. })));

        let err = Tetromino::from_rows(PieceKind::T, Rotation::North, &[&[0, 0], &[0, 0]], None);
        assert!(matches!(err, Err(CatalogError::Empty { .. })));

        let err = Tetromino::from_rows(PieceKind::T, Rotation::North, &[&[2]], None);
        assert!(matches!(err, Err(CatalogError::InvalidCell { value: 2, .. })));
    }
}
