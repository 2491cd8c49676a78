//! Playground events and observers.
//!
//! The playground never calls into presentation code. Every state change a
//! renderer might animate is pushed onto an outbox as a [`PlaygroundEvent`];
//! callers drain it after each frame or hand it to a [`PlaygroundObserver`].

use serde::Serialize;

use crate::brick::BrickId;
use crate::scoring::ScoreReport;
use crate::snapshot::FigureView;

/// One brick's collapse move, `(x, y)` from and to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrickShift {
    pub brick: BrickId,
    pub from: (usize, usize),
    pub to: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PlaygroundEvent {
    /// Start delay elapsed; spawning begins
    Started,
    FigureSpawned(FigureView),
    FigureMoved(FigureView),
    FigureRotated(FigureView),
    FallStarted(FigureView),
    FallStopped(FigureView),
    /// The figure's bricks were released into the settled grid
    FigureLocked(FigureView),
    RowsAboutToClear(Vec<usize>),
    BricksDestroyed(Vec<BrickId>),
    CollapseStarted(Vec<BrickShift>),
    CollapseFinished,
    ScoreUpdated(ScoreReport),
    LevelChanged(u32),
    Paused,
    Resumed,
    GameOver,
}

impl PlaygroundEvent {
    /// Stable name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            PlaygroundEvent::Started => "started",
            PlaygroundEvent::FigureSpawned(_) => "figureSpawned",
            PlaygroundEvent::FigureMoved(_) => "figureMoved",
            PlaygroundEvent::FigureRotated(_) => "figureRotated",
            PlaygroundEvent::FallStarted(_) => "fallStarted",
            PlaygroundEvent::FallStopped(_) => "fallStopped",
            PlaygroundEvent::FigureLocked(_) => "figureLocked",
            PlaygroundEvent::RowsAboutToClear(_) => "rowsAboutToClear",
            PlaygroundEvent::BricksDestroyed(_) => "bricksDestroyed",
            PlaygroundEvent::CollapseStarted(_) => "collapseStarted",
            PlaygroundEvent::CollapseFinished => "collapseFinished",
            PlaygroundEvent::ScoreUpdated(_) => "scoreUpdated",
            PlaygroundEvent::LevelChanged(_) => "levelChanged",
            PlaygroundEvent::Paused => "paused",
            PlaygroundEvent::Resumed => "resumed",
            PlaygroundEvent::GameOver => "gameOver",
        }
    }
}

/// Receives playground events in emission order.
pub trait PlaygroundObserver {
    fn on_event(&mut self, event: &PlaygroundEvent);
}

impl PlaygroundObserver for Vec<PlaygroundEvent> {
    fn on_event(&mut self, event: &PlaygroundEvent) {
        self.push(event.clone());
    }
}
