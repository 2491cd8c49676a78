//! Scoring module - color-group scoring and level progression
//!
//! When rows are cleared, their bricks are partitioned into groups of the
//! same color. Two cleared bricks share a group when a 4-neighbour path of
//! same-color bricks connects them; the path may run through bricks outside
//! the cleared rows. Each group scores `score_per_brick x group size`.
//!
//! Levels advance every `rows_per_level` destroyed rows. Gravity speeds up
//! by a fixed step per level, computed from the level being left.

use std::collections::VecDeque;

use serde::Serialize;

use crate::grid::{CellId, Direction, Grid};
use crate::types::BrickColor;

/// One scoring group: bounding box of its cleared bricks, color and points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreGroup {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub score: u32,
    pub color: BrickColor,
}

/// Score for one line clear
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub total: u32,
    pub groups: Vec<ScoreGroup>,
}

/// Partition the bricks of `rows` into same-color groups and score them.
///
/// Groups are ordered by their first brick, walking `rows` in the given
/// order and each row left to right.
pub fn calculate_score_groups(grid: &Grid, rows: &[usize], score_per_brick: u32) -> ScoreReport {
    let cleared: Vec<CellId> = rows
        .iter()
        .flat_map(|&row| grid.get_bricks_in_row(row))
        .filter_map(|brick| grid.brick(brick).map(|b| b.cell))
        .collect();

    let color_of = |cell: CellId| {
        grid.brick_at(cell)
            .and_then(|brick| grid.brick(brick))
            .map(|b| b.color)
    };

    // Component label per cell; components are flooded across the whole grid.
    let mut label: Vec<Option<usize>> = vec![None; grid.rows() * grid.cols()];
    let mut members: Vec<Vec<CellId>> = Vec::new();
    let mut queue = VecDeque::new();

    for &start in &cleared {
        if label[start.0 as usize].is_some() {
            continue;
        }
        let Some(color) = color_of(start) else {
            continue;
        };
        let component = members.len();
        members.push(Vec::new());
        label[start.0 as usize] = Some(component);
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for dir in Direction::ALL {
                let Some(next) = grid.cell(cell).neighbor(dir) else {
                    continue;
                };
                if label[next.0 as usize].is_none() && color_of(next) == Some(color) {
                    label[next.0 as usize] = Some(component);
                    queue.push_back(next);
                }
            }
        }
    }

    for &cell in &cleared {
        if let Some(component) = label[cell.0 as usize] {
            members[component].push(cell);
        }
    }

    let mut report = ScoreReport::default();
    for cells in members.into_iter().filter(|cells| !cells.is_empty()) {
        let Some(color) = color_of(cells[0]) else {
            continue;
        };
        let rows = cells.iter().map(|&c| grid.cell(c).row);
        let cols = cells.iter().map(|&c| grid.cell(c).col);
        let (min_row, max_row) = (rows.clone().min().unwrap_or(0), rows.max().unwrap_or(0));
        let (min_col, max_col) = (cols.clone().min().unwrap_or(0), cols.max().unwrap_or(0));

        let score = score_per_brick * cells.len() as u32;
        report.total += score;
        report.groups.push(ScoreGroup {
            x: min_col,
            y: min_row,
            width: max_col - min_col + 1,
            height: max_row - min_row + 1,
            score,
            color,
        });
    }
    report
}

/// Level for a destroyed-row total (levels start at 1)
pub fn calculate_level(destroyed_rows: u32, rows_per_level: u32) -> u32 {
    1 + destroyed_rows / rows_per_level.max(1)
}

/// Gravity interval after leaving `previous_level`
pub fn get_gravity_interval_ms(previous_level: u32, base_ms: f64, step_ms: f64) -> f64 {
    (base_ms - step_ms * previous_level as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BrickColor;

    fn fill(grid: &mut Grid, x: i32, y: i32, color: usize) {
        let cell = grid.cell_id(x, y).unwrap();
        grid.place_brick(cell, BrickColor::from_index(color), None);
    }

    #[test]
    fn test_single_color_row_scores_one_group() {
        let mut grid = Grid::new(20, 10);
        for x in 0..10 {
            fill(&mut grid, x, 19, 2);
        }
        let report = calculate_score_groups(&grid, &[19], 5);
        assert_eq!(report.total, 50);
        assert_eq!(
            report.groups,
            vec![ScoreGroup {
                x: 0,
                y: 19,
                width: 10,
                height: 1,
                score: 50,
                color: BrickColor::from_index(2),
            }]
        );
    }

    #[test]
    fn test_colors_split_groups() {
        let mut grid = Grid::new(20, 4);
        for (x, color) in [(0, 1), (1, 1), (2, 3), (3, 1)] {
            fill(&mut grid, x, 19, color);
        }
        let report = calculate_score_groups(&grid, &[19], 5);
        let scores: Vec<_> = report.groups.iter().map(|g| (g.x, g.score)).collect();
        assert_eq!(scores, vec![(0, 10), (2, 5), (3, 5)]);
        assert_eq!(report.total, 20);
    }

    #[test]
    fn test_groups_bridge_through_uncleared_bricks() {
        let mut grid = Grid::new(20, 4);
        // Row 19 is cleared: colors 1 1 3 1. Column 3 joins columns 0-1
        // through a color-1 path in row 18.
        for (x, color) in [(0, 1), (1, 1), (2, 3), (3, 1)] {
            fill(&mut grid, x, 19, color);
        }
        for x in 1..4 {
            fill(&mut grid, x, 18, 1);
        }
        let report = calculate_score_groups(&grid, &[19], 5);
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].score, 15);
        assert_eq!(report.groups[0].width, 4);
        assert_eq!(report.groups[0].height, 1);
        assert_eq!(report.groups[1].score, 5);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(calculate_level(0, 10), 1);
        assert_eq!(calculate_level(9, 10), 1);
        assert_eq!(calculate_level(10, 10), 2);
        assert_eq!(calculate_level(25, 10), 3);
    }

    #[test]
    fn test_gravity_interval() {
        assert_eq!(get_gravity_interval_ms(1, 1000.0, 50.0), 950.0);
        assert_eq!(get_gravity_interval_ms(2, 1000.0, 50.0), 900.0);
        assert_eq!(get_gravity_interval_ms(40, 1000.0, 50.0), 0.0);
    }
}
