//! Brick module - one occupied unit cell
//!
//! Bricks live in the [`crate::Grid`] arena. A brick owned by a figure moves
//! with it; once released it is a settled brick until its row is cleared.

use serde::Serialize;

use crate::figure::FigureId;
use crate::grid::CellId;
use crate::types::BrickColor;

/// Arena handle for a [`Brick`]. Ids are never reused within one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BrickId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    /// Owning figure; `None` once settled
    pub figure: Option<FigureId>,
    pub cell: CellId,
    pub color: BrickColor,
    /// Destination of a running hard drop
    pub falling: Option<CellId>,
    /// Destination of a running post-clear collapse
    pub smooth_moving: Option<CellId>,
}

impl Brick {
    pub fn new(figure: Option<FigureId>, cell: CellId, color: BrickColor) -> Self {
        Self {
            figure,
            cell,
            color,
            falling: None,
            smooth_moving: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.figure.is_none()
    }

    /// Cell this brick is animating toward, if any
    pub fn pending_target(&self) -> Option<CellId> {
        self.falling.or(self.smooth_moving)
    }
}
