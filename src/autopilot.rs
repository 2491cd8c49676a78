//! Deterministic scripted input for headless runs and tests.
//!
//! Every few frames the autopilot picks a gameplay action from its own
//! [`SimpleRng`] and holds it for a short, random number of frames. Same seed,
//! same keystrokes.

use crate::core::SimpleRng;
use crate::types::{ActionState, GameAction, InputSource};

const SCRIPTED: [GameAction; 6] = [
    GameAction::MoveLeft,
    GameAction::MoveRight,
    GameAction::RotateCw,
    GameAction::RotateCcw,
    GameAction::SoftDrop,
    GameAction::HardDrop,
];

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: SimpleRng,
    actions: ActionState,
    /// Action currently held and frames left to hold it
    holding: Option<(GameAction, u32)>,
    /// Idle frames before the next pick
    idle: u32,
    max_hold: u32,
    max_idle: u32,
}

impl Autopilot {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            actions: ActionState::new(),
            holding: None,
            idle: 0,
            max_hold: 6,
            max_idle: 4,
        }
    }

    /// Bounds for how long an action is held and how long to wait between.
    pub fn with_pacing(mut self, max_hold: u32, max_idle: u32) -> Self {
        self.max_hold = max_hold.max(1);
        self.max_idle = max_idle;
        self
    }

    pub fn holding(&self) -> Option<GameAction> {
        self.holding.map(|(action, _)| action)
    }

    /// Prepare input for the next frame.
    pub fn advance(&mut self) {
        self.actions.end_frame();

        if let Some((action, left)) = self.holding {
            if left > 1 {
                self.holding = Some((action, left - 1));
                return;
            }
            self.actions.release(action);
            self.holding = None;
            self.idle = self.rng.next_range(self.max_idle + 1);
        }

        if self.idle > 0 {
            self.idle -= 1;
            return;
        }

        let action = SCRIPTED[self.rng.next_range(SCRIPTED.len() as u32) as usize];
        let frames = 1 + self.rng.next_range(self.max_hold);
        self.actions.press(action);
        self.holding = Some((action, frames));
    }
}

impl InputSource for Autopilot {
    fn is_held(&self, action: GameAction) -> bool {
        self.actions.is_held(action)
    }

    fn was_pressed(&self, action: GameAction) -> bool {
        self.actions.was_pressed(action)
    }
}
