//! Run from a threat.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{EntityId, GoalId};
use quarry_world::{MovementProfile, NavTarget};
use tracing::debug;

use super::NavigateTo;

/// Legs of running before giving up.
const MAX_LEGS: u32 = 8;

/// Sprints away from an entity until it is gone or at least `distance`
/// away.
#[derive(Debug)]
pub struct Flee {
    threat: EntityId,
    distance: f64,
    legs: u32,
    last_error: Option<GoalError>,
    child: Option<GoalResult>,
}

impl Flee {
    /// Flee from `threat` until `distance` separates the two.
    pub const fn new(threat: EntityId, distance: f64) -> Self {
        Self {
            threat,
            distance,
            legs: 0,
            last_error: None,
            child: None,
        }
    }
}

impl Goal for Flee {
    fn label(&self) -> String {
        format!("flee from {}", self.threat)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        if let Some(Err(e)) = self.child.take() {
            debug!(goal = %ctx.id(), error = %e, "flee leg failed");
            self.last_error = Some(e);
        }

        let view = ctx.view();
        let Some(threat) = view.entity(self.threat) else {
            return Step::ok(Outcome::Fled);
        };
        if view.position().distance_to(threat.position) >= self.distance {
            return Step::ok(Outcome::Fled);
        }
        if self.legs >= MAX_LEGS {
            return Step::fail(self.last_error.take().unwrap_or(GoalError::EndlessLoop {
                label: self.label(),
                iterations: self.legs,
            }));
        }

        self.legs = self.legs.saturating_add(1);
        let leg = NavigateTo::new(NavTarget::AwayFrom {
            point: threat.position,
            distance: self.distance,
        })
        .with_profile(MovementProfile::FLEEING);
        ctx.spawn(leg);
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
