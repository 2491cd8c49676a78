//! Playground module - the orchestration state machine
//!
//! The playground owns every piece of simulation state: grid, queue, active
//! figure, RNG and the scheduler tree. Each frame is split into fixed ticks
//! and every tick is one traversal of the tree:
//!
//! ```text
//! session
//! ├── keyboard            edge-triggered actions (rotate, hard drop)
//! └── root                gravity and lock detection
//!     ├── start delay     sets the run flag, then removes itself
//!     ├── repeat right    auto-repeat controllers
//!     ├── repeat left
//!     ├── repeat down
//!     ├── figure          one node per active figure
//!     │   └── fall        hard-drop interpolation
//!     ├── score delay     publishes a clear's score after the clear delay
//!     └── collapse        post-clear compaction
//! ```
//!
//! Parents run before their children, so gravity is decided before any
//! animation advances within the same tick. Pausing stops the session node;
//! the pause key is read before the traversal so a paused tree can resume.
//!
//! # Phases
//!
//! | Phase | Meaning |
//! |-------|---------|
//! | `WaitingStart` | Start delay has not elapsed |
//! | `Spawning` | Running with no active figure |
//! | `Controlling` | Active figure accepts input |
//! | `Dropping` | Hard-drop interpolation running |
//! | `Locking` | Figure is grounded; the next gravity tick locks it |
//! | `ClearingRows` | Rows removed, waiting for the clear delay |
//! | `Collapsing` | Rows above the cleared ones are settling |
//! | `GameOver` | A spawn was blocked |

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, warn};

use crate::brick::BrickId;
use crate::config::{ConfigError, PlaygroundConfig};
use crate::events::{BrickShift, PlaygroundEvent, PlaygroundObserver};
use crate::figure::{Figure, FigureId};
use crate::grid::Grid;
use crate::repeat::KeyMoveController;
use crate::rng::SimpleRng;
use crate::scoring::{
    calculate_level, calculate_score_groups, get_gravity_interval_ms, ScoreReport,
};
use crate::snapshot::{CellView, GameSnapshot, QueuedView};
use crate::stream::{Delay, FrameClock, StreamId, StreamTree, TimedTransition};
use crate::tetromino::Catalog;
use crate::types::{GameAction, InputSource};

/// Current state-machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    WaitingStart,
    Spawning,
    Controlling,
    Dropping,
    Locking,
    ClearingRows,
    Collapsing,
    GameOver,
}

/// Which auto-repeat controller a node drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKey {
    Right,
    Left,
    Down,
}

/// Work carried by a scheduler node
#[derive(Debug, Clone)]
pub enum PlaygroundTask {
    Keyboard,
    Update,
    StartDelay(Delay),
    Repeat(RepeatKey),
    Fall(TimedTransition),
    ScoreDelay(Delay, ScoreReport),
    Collapse(TimedTransition, Vec<BrickId>),
}

pub struct Playground {
    config: PlaygroundConfig,
    catalog: Catalog,
    rng: SimpleRng,
    grid: Grid,
    streams: StreamTree<PlaygroundTask>,
    session: StreamId,
    root: StreamId,
    clock: FrameClock,
    figure: Option<Figure>,
    queue: VecDeque<Figure>,
    next_figure_id: u32,
    is_run: bool,
    move_interval: f64,
    move_interval_time: f64,
    destroyed_rows: u32,
    level: u32,
    score: u32,
    collapsing: bool,
    collapse_progress: f64,
    paused: bool,
    game_over: bool,
    edges_pending: bool,
    right: KeyMoveController,
    left: KeyMoveController,
    down: KeyMoveController,
    events: Vec<PlaygroundEvent>,
}

impl Playground {
    /// Build a playground; nothing spawns until the start delay elapses.
    pub fn new(config: PlaygroundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = Catalog::standard()?;

        let mut streams = StreamTree::new();
        let session = streams.insert(None, true);
        streams.spawn(session, PlaygroundTask::Keyboard);
        let root = streams.spawn(session, PlaygroundTask::Update);
        streams.spawn(
            root,
            PlaygroundTask::StartDelay(Delay::new(config.start_delay_ms)),
        );
        for key in [RepeatKey::Right, RepeatKey::Left, RepeatKey::Down] {
            streams.spawn(root, PlaygroundTask::Repeat(key));
        }

        let mut playground = Self {
            rng: SimpleRng::new(config.seed),
            grid: Grid::new(config.rows as usize, config.cols as usize),
            move_interval: config.base_gravity_ms,
            config,
            catalog,
            streams,
            session,
            root,
            clock: FrameClock::default(),
            figure: None,
            queue: VecDeque::new(),
            next_figure_id: 0,
            is_run: false,
            move_interval_time: 0.0,
            destroyed_rows: 0,
            level: 1,
            score: 0,
            collapsing: false,
            collapse_progress: 0.0,
            paused: false,
            game_over: false,
            edges_pending: false,
            right: KeyMoveController::new(),
            left: KeyMoveController::new(),
            down: KeyMoveController::new(),
            events: Vec::new(),
        };
        for _ in 0..playground.config.queue_depth {
            let figure = playground.generate_figure();
            playground.queue.push_back(figure);
        }
        Ok(playground)
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// Upcoming figures, next first
    pub fn queue(&self) -> impl Iterator<Item = &Figure> {
        self.queue.iter()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn destroyed_rows(&self) -> u32 {
        self.destroyed_rows
    }

    /// Current gravity interval in ms
    pub fn gravity_interval_ms(&self) -> f64 {
        self.move_interval
    }

    pub fn is_running(&self) -> bool {
        self.is_run
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_collapsing(&self) -> bool {
        self.collapsing
    }

    /// Scheduler tree, for inspection
    pub fn streams(&self) -> &StreamTree<PlaygroundTask> {
        &self.streams
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            return Phase::GameOver;
        }
        if !self.is_run {
            return Phase::WaitingStart;
        }
        if self.collapsing {
            return if self.collapse_progress > 0.0 {
                Phase::Collapsing
            } else {
                Phase::ClearingRows
            };
        }
        match &self.figure {
            None => Phase::Spawning,
            Some(figure) if figure.is_falling() => Phase::Dropping,
            Some(figure) if figure.is_the_end(&self.grid) => Phase::Locking,
            Some(_) => Phase::Controlling,
        }
    }

    /// Advance by one wall-clock frame.
    ///
    /// Key-down edges from `input` are honoured once per frame, however many
    /// ticks the frame is split into.
    pub fn frame(&mut self, elapsed_ms: f64, input: &dyn InputSource) {
        if input.was_pressed(GameAction::Pause) {
            self.toggle_pause();
        }
        self.edges_pending = true;
        for dt in self.clock.ticks(elapsed_ms) {
            self.tick(dt, input);
        }
        self.edges_pending = false;
    }

    /// Run one scheduler traversal with tick size `dt`.
    pub fn tick(&mut self, dt: f64, input: &dyn InputSource) {
        let mut streams = std::mem::take(&mut self.streams);
        let session = self.session;
        streams.call(session, &mut |streams, id, task| {
            self.run_task(streams, id, task, dt, input)
        });
        self.streams = streams;
    }

    /// Apply one action immediately, outside the tick.
    ///
    /// Returns whether state changed. Movement is rejected while paused,
    /// before the start delay, during a collapse and after game over.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if action == GameAction::Pause {
            return self.toggle_pause();
        }
        if self.paused || self.game_over || !self.is_run || self.collapsing {
            return false;
        }

        let mut streams = std::mem::take(&mut self.streams);
        let changed = match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::RotateCw => self.rotate(true),
            GameAction::RotateCcw => self.rotate(false),
            GameAction::HardDrop => self.start_fall(&mut streams),
            GameAction::Pause => false,
        };
        self.streams = streams;
        changed
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaygroundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand pending events to `observer` in emission order.
    pub fn dispatch_events(&mut self, observer: &mut dyn PlaygroundObserver) {
        for event in self.drain_events() {
            observer.on_event(&event);
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let rows = self.grid.rows();
        let cols = self.grid.cols();
        let active_id = self.figure.as_ref().map(Figure::id);

        let mut cells = vec![vec![None; cols]; rows];
        for (_, brick) in self.grid.bricks() {
            let cell = self.grid.cell(brick.cell);
            let target = brick.pending_target().map(|t| {
                let t = self.grid.cell(t);
                (t.col, t.row)
            });
            cells[cell.row][cell.col] = Some(CellView {
                color: brick.color,
                active: brick.figure.is_some() && brick.figure == active_id,
                target,
            });
        }

        GameSnapshot {
            rows,
            cols,
            cells,
            active: self.figure.as_ref().map(Figure::view),
            queue: self
                .queue
                .iter()
                .map(|f| QueuedView {
                    kind: f.kind(),
                    color: f.color(),
                })
                .collect(),
            phase: self.phase(),
            score: self.score,
            level: self.level,
            destroyed_rows: self.destroyed_rows,
            collapse_progress: self.collapse_progress,
            paused: self.paused,
            game_over: self.game_over,
        }
    }

    fn emit(&mut self, event: PlaygroundEvent) {
        self.events.push(event);
    }

    fn toggle_pause(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.paused = !self.paused;
        if self.paused {
            self.streams.stop(self.session);
            self.emit(PlaygroundEvent::Paused);
        } else {
            self.streams.resume(self.session);
            self.emit(PlaygroundEvent::Resumed);
        }
        debug!(paused = self.paused, "pause toggled");
        true
    }

    fn run_task(
        &mut self,
        streams: &mut StreamTree<PlaygroundTask>,
        id: StreamId,
        task: &mut PlaygroundTask,
        dt: f64,
        input: &dyn InputSource,
    ) {
        match task {
            PlaygroundTask::Keyboard => self.handle_edges(streams, input),
            PlaygroundTask::Update => self.update(streams, dt),
            PlaygroundTask::StartDelay(delay) => {
                if delay.step(dt) {
                    self.is_run = true;
                    self.emit(PlaygroundEvent::Started);
                    debug!("playground started");
                    streams.destroy(id);
                }
            }
            PlaygroundTask::Repeat(key) => self.update_repeat(*key, dt, input),
            PlaygroundTask::Fall(transition) => {
                let progress = transition.step(dt);
                if let Some(figure) = self.figure.as_mut() {
                    figure.set_fall_progress(progress);
                }
                if progress >= 1.0 {
                    streams.destroy(id);
                    self.finish_fall(streams);
                }
            }
            PlaygroundTask::ScoreDelay(delay, report) => {
                if delay.step(dt) {
                    let report = std::mem::take(report);
                    self.score += report.total;
                    debug!(gained = report.total, total = self.score, "score updated");
                    self.emit(PlaygroundEvent::ScoreUpdated(report));
                    streams.destroy(id);
                }
            }
            PlaygroundTask::Collapse(transition, bricks) => {
                self.collapse_progress = transition.step(dt);
                if self.collapse_progress >= 1.0 {
                    for &brick in bricks.iter() {
                        self.grid.smooth_move_stop(brick);
                    }
                    self.collapsing = false;
                    self.collapse_progress = 0.0;
                    self.emit(PlaygroundEvent::CollapseFinished);
                    streams.destroy(id);
                }
            }
        }
    }

    fn handle_edges(&mut self, streams: &mut StreamTree<PlaygroundTask>, input: &dyn InputSource) {
        if !std::mem::take(&mut self.edges_pending) {
            return;
        }
        if self.figure.is_none() || self.collapsing {
            return;
        }
        if input.was_pressed(GameAction::RotateCw) {
            self.rotate(true);
        }
        if input.was_pressed(GameAction::RotateCcw) {
            self.rotate(false);
        }
        if input.was_pressed(GameAction::HardDrop) {
            self.start_fall(streams);
        }
    }

    fn update_repeat(&mut self, key: RepeatKey, dt: f64, input: &dyn InputSource) {
        let timing = self.config.repeat;
        match key {
            RepeatKey::Right => {
                if self
                    .right
                    .update(dt, input.is_held(GameAction::MoveRight), &timing)
                {
                    if self.figure.is_some() && !self.left.is_active() && !self.collapsing {
                        self.move_right();
                    }
                    self.left.reset();
                }
            }
            RepeatKey::Left => {
                if self
                    .left
                    .update(dt, input.is_held(GameAction::MoveLeft), &timing)
                {
                    if self.figure.is_some() && !self.right.is_active() && !self.collapsing {
                        self.move_left();
                    }
                    self.right.reset();
                }
            }
            RepeatKey::Down => {
                if self
                    .down
                    .update(dt, input.is_held(GameAction::SoftDrop), &timing)
                    && self.figure.is_some()
                    && !self.collapsing
                {
                    self.soft_drop();
                }
            }
        }
    }

    /// Gravity and lock detection, once per tick.
    fn update(&mut self, streams: &mut StreamTree<PlaygroundTask>, dt: f64) {
        if !self.is_run || self.collapsing {
            return;
        }
        if self.figure.is_none() {
            self.make_figure(streams);
        }
        let Some(figure) = self.figure.as_ref() else {
            return;
        };

        if figure.is_falling() {
            self.move_interval_time = self.move_interval;
            return;
        }

        if self.move_interval_time >= self.move_interval {
            self.move_interval_time = 0.0;
            if figure.is_the_end(&self.grid) {
                self.lock_figure(streams);
            } else {
                self.move_down();
            }
        } else {
            self.move_interval_time += dt;
        }
    }

    fn generate_figure(&mut self) -> Figure {
        let id = FigureId(self.next_figure_id);
        self.next_figure_id += 1;
        let kind = self.rng.next_kind();
        let color = self.rng.next_color();
        let set = self.catalog.get(kind).clone();
        Figure::generate(id, set, color, self.grid.cols(), &mut self.rng)
    }

    /// Settle the active figure's bricks and drop its scheduler node.
    fn release_figure(&mut self, streams: &mut StreamTree<PlaygroundTask>) {
        if let Some(figure) = self.figure.take() {
            debug!(figure = ?figure.id(), kind = ?figure.kind(), "figure locked");
            self.emit(PlaygroundEvent::FigureLocked(figure.view()));
            figure.destroy(&mut self.grid, streams);
        }
    }

    /// Activate the next queued figure and refill the queue by one.
    fn make_figure(&mut self, streams: &mut StreamTree<PlaygroundTask>) {
        self.release_figure(streams);

        let Some(mut figure) = self.queue.pop_front() else {
            warn!("spawn queue is empty");
            return;
        };
        let next = self.generate_figure();
        self.queue.push_back(next);

        if !figure.activate(&mut self.grid) {
            self.top_out();
            return;
        }

        let node = streams.insert(None, true);
        streams.child(self.root, node);
        figure.set_stream(node);

        debug!(figure = ?figure.id(), kind = ?figure.kind(), x = figure.x(), "figure spawned");
        self.emit(PlaygroundEvent::FigureSpawned(figure.view()));
        self.figure = Some(figure);
    }

    fn top_out(&mut self) {
        self.is_run = false;
        self.game_over = true;
        debug!(score = self.score, level = self.level, "game over");
        self.emit(PlaygroundEvent::GameOver);
    }

    /// Clear filled rows if any, otherwise spawn the next figure.
    fn lock_figure(&mut self, streams: &mut StreamTree<PlaygroundTask>) {
        let lines = self.grid.get_filled_lines();
        if lines.is_empty() {
            self.make_figure(streams);
        } else {
            self.clear_rows(streams, &lines);
        }
    }

    fn clear_rows(&mut self, streams: &mut StreamTree<PlaygroundTask>, lines: &[usize]) {
        let report = calculate_score_groups(&self.grid, lines, self.config.score_per_brick);
        debug!(rows = ?lines, groups = report.groups.len(), "clearing rows");
        self.emit(PlaygroundEvent::RowsAboutToClear(lines.to_vec()));

        self.destroyed_rows += lines.len() as u32;
        self.release_figure(streams);

        streams.spawn(
            self.root,
            PlaygroundTask::ScoreDelay(Delay::new(self.config.clear_delay_ms), report),
        );

        let doomed: Vec<BrickId> = lines
            .iter()
            .flat_map(|&row| self.grid.get_bricks_in_row(row))
            .collect();
        for &brick in &doomed {
            self.grid.destroy_brick(brick);
        }
        self.emit(PlaygroundEvent::BricksDestroyed(doomed));

        let mut shifts = Vec::new();
        let mut offset = 0;
        for row in (0..self.grid.rows()).rev() {
            if lines.contains(&row) {
                offset += 1;
                continue;
            }
            if offset == 0 {
                continue;
            }
            for brick in self.grid.get_bricks_in_row(row) {
                let Some(from) = self.grid.brick(brick).map(|b| b.cell) else {
                    continue;
                };
                let (x, y) = self.grid.position(from);
                let Some(to) = self.grid.cell_id(x, y + offset) else {
                    warn!(?brick, "collapse target out of bounds");
                    continue;
                };
                self.grid.smooth_move_start(brick, to);
                shifts.push(BrickShift {
                    brick,
                    from: (x as usize, y as usize),
                    to: (x as usize, (y + offset) as usize),
                });
            }
        }

        self.update_level();

        self.collapsing = true;
        self.collapse_progress = 0.0;
        let bricks: Vec<BrickId> = shifts.iter().map(|s| s.brick).collect();
        self.emit(PlaygroundEvent::CollapseStarted(shifts));
        streams.spawn(
            self.root,
            PlaygroundTask::Collapse(
                TimedTransition::delayed(self.config.clear_delay_ms, self.config.collapse_ms),
                bricks,
            ),
        );
    }

    fn update_level(&mut self) {
        let level = calculate_level(self.destroyed_rows, self.config.rows_per_level);
        if level != self.level {
            self.move_interval = get_gravity_interval_ms(
                self.level,
                self.config.base_gravity_ms,
                self.config.gravity_step_ms,
            );
            self.level = level;
            debug!(level, interval = self.move_interval, "level changed");
            self.emit(PlaygroundEvent::LevelChanged(level));
        }
    }

    fn move_left(&mut self) -> bool {
        self.move_with(Figure::try_move_left)
    }

    fn move_right(&mut self) -> bool {
        self.move_with(Figure::try_move_right)
    }

    fn move_down(&mut self) -> bool {
        self.move_with(Figure::try_move_bottom)
    }

    fn move_with(&mut self, f: fn(&mut Figure, &mut Grid) -> bool) -> bool {
        let Some(figure) = self.figure.as_mut() else {
            return false;
        };
        if !f(figure, &mut self.grid) {
            return false;
        }
        let view = figure.view();
        self.emit(PlaygroundEvent::FigureMoved(view));
        true
    }

    /// One row down; resets gravity unless the figure is now grounded.
    fn soft_drop(&mut self) -> bool {
        let moved = self.move_down();
        if let Some(figure) = self.figure.as_ref() {
            if !figure.is_the_end(&self.grid) {
                self.move_interval_time = 0.0;
            }
        }
        moved
    }

    fn rotate(&mut self, clockwise: bool) -> bool {
        let Some(figure) = self.figure.as_mut() else {
            return false;
        };
        let rotated = if clockwise {
            figure.rotate_right(&mut self.grid)
        } else {
            figure.rotate_left(&mut self.grid)
        };
        if rotated {
            let view = figure.view();
            self.emit(PlaygroundEvent::FigureRotated(view));
        }
        rotated
    }

    fn start_fall(&mut self, streams: &mut StreamTree<PlaygroundTask>) -> bool {
        let Some(figure) = self.figure.as_mut() else {
            return false;
        };
        if !figure.begin_fall(&mut self.grid) {
            return false;
        }
        let parent = figure.stream().unwrap_or(self.root);
        let view = figure.view();
        streams.spawn(
            parent,
            PlaygroundTask::Fall(TimedTransition::new(self.config.hard_drop_ms)),
        );
        self.emit(PlaygroundEvent::FallStarted(view));
        true
    }

    fn finish_fall(&mut self, streams: &mut StreamTree<PlaygroundTask>) {
        let Some(figure) = self.figure.as_mut() else {
            return;
        };
        figure.finish_fall(&mut self.grid);
        let view = figure.view();
        self.emit(PlaygroundEvent::FallStopped(view));
        self.lock_figure(streams);
    }
}
