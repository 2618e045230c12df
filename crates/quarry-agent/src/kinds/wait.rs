//! Do nothing for a number of ticks.

use quarry_goals::{Goal, GoalContext, Outcome, Step};

/// Synchronous countdown; resolves on the step after the last tick.
#[derive(Debug)]
pub struct Wait {
    remaining: u32,
}

impl Wait {
    /// Wait `ticks` ticks.
    pub const fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }
}

impl Goal for Wait {
    fn label(&self) -> String {
        format!("wait {} ticks", self.remaining)
    }

    fn step(&mut self, _ctx: &mut GoalContext<'_>) -> Step {
        if self.remaining == 0 {
            return Step::ok(Outcome::Waited);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Step::Pending
    }
}
