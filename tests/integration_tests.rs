//! Integration tests for the playground loop

use brickfall::autopilot::Autopilot;
use brickfall::core::{Phase, Playground, PlaygroundConfig, PlaygroundEvent};
use brickfall::types::{GameAction, NoInput, PieceKind};

/// First seed whose queue opens with `kinds`, in order.
fn seed_opening_with(config: &PlaygroundConfig, kinds: &[PieceKind]) -> u32 {
    (1..50_000)
        .find(|&seed| {
            let pg = Playground::new(config.clone().with_seed(seed)).unwrap();
            let queued: Vec<_> = pg.queue().map(|f| f.kind()).take(kinds.len()).collect();
            queued == kinds
        })
        .expect("no seed opens with the requested pieces")
}

fn seed_opening_with_i(config: &PlaygroundConfig) -> u32 {
    seed_opening_with(config, &[PieceKind::I])
}

fn start(config: PlaygroundConfig) -> Playground {
    let mut pg = Playground::new(config.with_start_delay_ms(0.0)).unwrap();
    pg.frame(60.0, &NoInput);
    pg.frame(60.0, &NoInput);
    assert!(pg.figure().is_some());
    pg
}

fn run_frames(pg: &mut Playground, frames: usize) {
    for _ in 0..frames {
        pg.frame(60.0, &NoInput);
    }
}

#[test]
fn test_game_lifecycle() {
    let mut pg = Playground::new(PlaygroundConfig::default().with_seed(12345)).unwrap();
    assert_eq!(pg.phase(), Phase::WaitingStart);
    assert!(!pg.apply_action(GameAction::MoveLeft));

    run_frames(&mut pg, 20);
    assert!(pg.is_running());
    assert_eq!(pg.phase(), Phase::Controlling);
    assert_eq!(pg.level(), 1);
    assert_eq!(pg.score(), 0);
    assert!(!pg.is_game_over());
    assert!(!pg.is_paused());
}

#[test]
fn test_hard_dropped_i_piece_rests_on_bottom_row() {
    let config = PlaygroundConfig::default();
    let seed = seed_opening_with_i(&config);
    let mut pg = start(config.with_seed(seed));
    assert_eq!(pg.figure().unwrap().kind(), PieceKind::I);

    assert!(pg.apply_action(GameAction::HardDrop));
    run_frames(&mut pg, 4);

    assert_eq!(pg.grid().get_bricks_in_row(19).len(), 4);
    assert_eq!(pg.score(), 0);
    assert_eq!(pg.destroyed_rows(), 0);
}

#[test]
fn test_line_clear_scores_and_collapses() {
    // Four columns: a flat I piece fills a row on its own.
    let config = PlaygroundConfig::default().with_grid(20, 4);
    let seed = seed_opening_with_i(&config);
    let mut pg = start(config.with_seed(seed));

    assert!(pg.apply_action(GameAction::HardDrop));
    run_frames(&mut pg, 20);

    assert_eq!(pg.destroyed_rows(), 1);
    // One color group of four bricks at 5 points each.
    assert_eq!(pg.score(), 20);
    assert!(!pg.is_collapsing());
    // Only the next figure is left on the grid.
    assert_eq!(pg.grid().brick_count(), 4);

    let events = pg.drain_events();
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    let order = [
        "fallStopped",
        "rowsAboutToClear",
        "figureLocked",
        "bricksDestroyed",
        "collapseStarted",
        "scoreUpdated",
        "collapseFinished",
        "figureSpawned",
    ];
    let mut at = 0;
    for name in order {
        let found = names[at..].iter().position(|&n| n == name);
        assert!(found.is_some(), "missing {} after index {} in {:?}", name, at, names);
        at += found.unwrap_or(0) + 1;
    }

    let cleared = events.iter().find_map(|e| match e {
        PlaygroundEvent::RowsAboutToClear(rows) => Some(rows.clone()),
        _ => None,
    });
    assert_eq!(cleared, Some(vec![19]));
}

/// Slide the active figure until its leftmost brick is in `col`.
fn shift_to_column(pg: &mut Playground, col: i32) {
    let leftmost = |pg: &Playground| {
        let figure = pg.figure().unwrap();
        figure.cells().iter().map(|c| c.0).min().unwrap()
    };
    while leftmost(&*pg) > col {
        assert!(pg.apply_action(GameAction::MoveLeft));
    }
    while leftmost(&*pg) < col {
        assert!(pg.apply_action(GameAction::MoveRight));
    }
}

/// Hard-drop and run frames until the next figure is in play.
fn drop_and_wait(pg: &mut Playground) {
    let current = pg.figure().unwrap().id();
    assert!(pg.apply_action(GameAction::HardDrop));
    for _ in 0..40 {
        pg.frame(60.0, &NoInput);
        if pg.figure().is_some_and(|f| f.id() != current) {
            return;
        }
    }
    panic!("next figure never spawned");
}

#[test]
fn test_cleared_rows_shift_bricks_above_down() {
    let config = PlaygroundConfig::default().with_grid(20, 4);
    let seed = seed_opening_with(&config, &[PieceKind::I, PieceKind::I, PieceKind::O]);
    let mut pg = start(config.with_seed(seed));

    // Two upright I pieces in columns 0 and 1.
    for col in 0..2 {
        assert!(pg.apply_action(GameAction::SoftDrop));
        assert!(pg.apply_action(GameAction::SoftDrop));
        assert!(pg.apply_action(GameAction::RotateCw));
        shift_to_column(&mut pg, col);
        drop_and_wait(&mut pg);
    }
    assert_eq!(pg.grid().get_bricks_in_row(16).len(), 2);

    // The O piece completes rows 18 and 19.
    assert_eq!(pg.figure().unwrap().kind(), PieceKind::O);
    shift_to_column(&mut pg, 2);
    assert!(pg.apply_action(GameAction::HardDrop));
    run_frames(&mut pg, 12);

    assert_eq!(pg.destroyed_rows(), 2);
    assert!(!pg.is_collapsing());
    assert_eq!(pg.grid().rows(), 20);
    // The upper halves of both I pieces moved down two rows.
    for row in 16..18 {
        assert!(pg.grid().get_bricks_in_row(row).is_empty());
    }
    for row in 18..20 {
        let settled: Vec<_> = pg
            .grid()
            .get_bricks_in_row(row)
            .into_iter()
            .map(|b| pg.grid().brick(b).unwrap().cell)
            .map(|cell| pg.grid().position(cell).0)
            .collect();
        assert_eq!(settled, vec![0, 1]);
    }
}

#[test]
fn test_stack_overflow_ends_the_game() {
    let mut pg = start(PlaygroundConfig::default().with_grid(4, 8).with_seed(3));
    for _ in 0..1_000 {
        if pg.is_game_over() {
            break;
        }
        pg.apply_action(GameAction::HardDrop);
        pg.frame(60.0, &NoInput);
    }

    assert!(pg.is_game_over());
    assert_eq!(pg.phase(), Phase::GameOver);
    assert!(pg.snapshot().game_over);
    let events = pg.drain_events();
    assert!(matches!(events.last(), Some(PlaygroundEvent::GameOver)));

    // Nothing moves any more.
    let bricks = pg.grid().brick_count();
    assert!(!pg.apply_action(GameAction::HardDrop));
    assert!(!pg.apply_action(GameAction::Pause));
    run_frames(&mut pg, 30);
    assert_eq!(pg.grid().brick_count(), bricks);
    assert!(pg.drain_events().is_empty());
}

#[test]
fn test_snapshot_matches_grid() {
    let mut pg = start(PlaygroundConfig::default().with_seed(21));
    run_frames(&mut pg, 10);
    let snap = pg.snapshot();

    assert_eq!(snap.rows, 20);
    assert_eq!(snap.cols, 10);
    assert_eq!(snap.brick_count(), pg.grid().brick_count());
    assert_eq!(snap.queue.len(), 3);

    let active = snap.active.as_ref().unwrap();
    for &(x, y) in &active.cells {
        let cell = snap.cell(x as usize, y as usize).unwrap();
        assert!(cell.active);
        assert_eq!(cell.color, active.color);
    }
}

#[test]
fn test_same_seed_replays_same_events() {
    fn play(seed: u32) -> Vec<String> {
        let mut pg = Playground::new(PlaygroundConfig::default().with_seed(seed)).unwrap();
        let mut pilot = Autopilot::new(seed);
        let mut lines = Vec::new();
        for _ in 0..600 {
            pilot.advance();
            pg.frame(60.0, &pilot);
            for event in pg.drain_events() {
                lines.push(serde_json::to_string(&event).unwrap());
            }
        }
        lines
    }

    let a = play(8);
    assert!(!a.is_empty());
    assert_eq!(a, play(8));
    assert_ne!(a, play(9));
}

#[test]
fn test_events_serialize_with_camel_case_tags() {
    let mut pg = start(PlaygroundConfig::default().with_seed(4));
    let events = pg.drain_events();
    let json = serde_json::to_value(&events[1]).unwrap();
    assert_eq!(json["event"], "figureSpawned");
    assert!(json["data"]["cells"].as_array().is_some_and(|c| c.len() == 4));
}
