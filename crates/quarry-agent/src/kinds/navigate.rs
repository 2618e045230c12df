//! Travel to a target.

use futures::FutureExt;
use quarry_goals::{Goal, GoalContext, GoalError, Outcome, Step};
use quarry_world::{MovementProfile, NavTarget};

/// Moves the agent to a [`NavTarget`] and resolves on arrival.
///
/// Cancelling stops the navigator; the pending trip then rejects and the
/// goal resolves as cancelled.
#[derive(Debug)]
pub struct NavigateTo {
    target: NavTarget,
    profile: MovementProfile,
}

impl NavigateTo {
    /// Travel to `target` with the default movement profile.
    pub fn new(target: NavTarget) -> Self {
        Self {
            target,
            profile: MovementProfile::default(),
        }
    }

    /// Use a different movement profile.
    #[must_use]
    pub const fn with_profile(mut self, profile: MovementProfile) -> Self {
        self.profile = profile;
        self
    }
}

impl Goal for NavigateTo {
    fn label(&self) -> String {
        format!("go to {}", self.target)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let trip = ctx.navigator().goto(self.target, self.profile);
        Step::Suspended(
            trip.map(|result| result.map(|()| Outcome::Arrived).map_err(GoalError::from))
                .boxed(),
        )
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        ctx.navigator().stop();
    }
}
