//! Grid tests - cells, neighbours and brick bookkeeping

use brickfall::core::{Direction, Grid};
use brickfall::types::BrickColor;

fn fill_row(grid: &mut Grid, row: i32, color: BrickColor) {
    for x in 0..grid.cols() as i32 {
        let cell = grid.cell_id(x, row).unwrap();
        grid.place_brick(cell, color, None).unwrap();
    }
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new(20, 10);
    assert_eq!(grid.rows(), 20);
    assert_eq!(grid.cols(), 10);
    assert_eq!(grid.cells().len(), 200);
    assert_eq!(grid.brick_count(), 0);

    for y in 0..20 {
        for x in 0..10 {
            assert!(grid.check_for_free_place(x, y), "cell ({}, {}) should be free", x, y);
        }
    }
}

#[test]
fn test_out_of_bounds_is_never_free() {
    let grid = Grid::new(20, 10);
    assert_eq!(grid.cell_id(-1, 0), None);
    assert_eq!(grid.cell_id(0, -1), None);
    assert_eq!(grid.cell_id(10, 0), None);
    assert_eq!(grid.cell_id(0, 20), None);
    assert!(!grid.check_for_free_place(10, 5));
    assert!(!grid.check_for_free_place(3, -1));
}

#[test]
fn test_neighbours_stop_at_edges() {
    let grid = Grid::new(4, 4);
    let corner = grid.cell_id(0, 0).unwrap();
    let cell = grid.cell(corner);
    assert_eq!(cell.neighbor(Direction::Up), None);
    assert_eq!(cell.neighbor(Direction::Left), None);
    assert_eq!(cell.neighbor(Direction::Right), grid.cell_id(1, 0));
    assert_eq!(cell.neighbor(Direction::Down), grid.cell_id(0, 1));
}

#[test]
fn test_settled_brick_blocks_but_figure_brick_does_not() {
    let mut grid = Grid::new(6, 6);
    let settled = grid.cell_id(2, 5).unwrap();
    grid.place_brick(settled, BrickColor::from_index(0), None).unwrap();
    assert!(!grid.check_for_free_place(2, 5));

    let above = grid.cell_id(2, 4).unwrap();
    assert_eq!(grid.check_bottom_for_free(above), None);
    assert_eq!(grid.check_left_for_free(above), grid.cell_id(1, 4));
}

#[test]
fn test_place_into_occupied_cell_is_rejected() {
    let mut grid = Grid::new(6, 6);
    let cell = grid.cell_id(1, 1).unwrap();
    let first = grid.place_brick(cell, BrickColor::from_index(1), None);
    assert!(first.is_some());
    assert_eq!(grid.place_brick(cell, BrickColor::from_index(2), None), None);
    assert_eq!(grid.brick_at(cell), first);
    assert_eq!(grid.brick_count(), 1);
}

#[test]
fn test_filled_lines_top_to_bottom() {
    let mut grid = Grid::new(8, 5);
    fill_row(&mut grid, 7, BrickColor::from_index(0));
    fill_row(&mut grid, 4, BrickColor::from_index(1));
    // Row 6 has a hole.
    for x in 0..4 {
        let cell = grid.cell_id(x, 6).unwrap();
        grid.place_brick(cell, BrickColor::from_index(2), None);
    }

    assert_eq!(grid.get_filled_lines().as_slice(), &[4, 7]);
    assert!(!grid.is_row_filled(6));
    assert_eq!(grid.get_bricks_in_row(6).len(), 4);
}

#[test]
fn test_destroy_brick_frees_cell() {
    let mut grid = Grid::new(6, 6);
    let cell = grid.cell_id(3, 3).unwrap();
    let brick = grid.place_brick(cell, BrickColor::from_index(4), None).unwrap();

    let removed = grid.destroy_brick(brick).unwrap();
    assert_eq!(removed.cell, cell);
    assert!(grid.is_cell_free(cell));
    assert!(grid.destroy_brick(brick).is_none());
}

#[test]
fn test_smooth_move_commits_on_stop() {
    let mut grid = Grid::new(6, 6);
    let from = grid.cell_id(0, 2).unwrap();
    let to = grid.cell_id(0, 5).unwrap();
    let brick = grid.place_brick(from, BrickColor::from_index(0), None).unwrap();

    grid.smooth_move_start(brick, to);
    assert_eq!(grid.brick(brick).unwrap().pending_target(), Some(to));
    assert_eq!(grid.brick_at(from), Some(brick));

    grid.smooth_move_stop(brick);
    assert_eq!(grid.brick_at(to), Some(brick));
    assert_eq!(grid.brick_at(from), None);
    assert_eq!(grid.brick(brick).unwrap().pending_target(), None);
}
