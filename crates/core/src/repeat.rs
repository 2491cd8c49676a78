//! Auto-repeat for held movement keys.
//!
//! The first tick a key is seen held fires immediately. While it stays held,
//! the n-th repeat fires once `RepeatTiming::delay_after(n)` ms have passed
//! since the previous one. Releasing the key resets the count.

use crate::config::RepeatTiming;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyMoveController {
    times: u32,
    passed: f64,
    active: bool,
}

impl KeyMoveController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` ms; returns true when the action should fire now.
    pub fn update(&mut self, dt: f64, held: bool, timing: &RepeatTiming) -> bool {
        if !held {
            self.reset();
            self.active = false;
            return false;
        }

        self.active = true;
        if self.times == 0 || self.passed >= timing.delay_after(self.times) {
            self.times += 1;
            self.passed = 0.0;
            return true;
        }
        self.passed += dt;
        false
    }

    /// Restart the repeat sequence; the next held tick fires immediately.
    pub fn reset(&mut self) {
        self.times = 0;
        self.passed = 0.0;
    }

    /// True while the key was held on the last update
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn times(&self) -> u32 {
        self.times
    }
}
