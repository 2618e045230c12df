//! Idle wandering.

use std::f64::consts::TAU;

use futures::FutureExt;
use quarry_goals::{Goal, GoalContext, GoalError, Outcome, Step};
use quarry_types::Vec3;
use quarry_world::{MovementProfile, NavTarget};
use rand::Rng;

/// Walks to a random point near where it was created.
#[derive(Debug)]
pub struct Wander {
    destination: Vec3,
}

impl Wander {
    /// Pick a destination between one block and `radius` away from
    /// `center`, on the same level.
    pub fn around(center: Vec3, radius: f64, rng: &mut impl Rng) -> Self {
        let angle = rng.random_range(0.0..TAU);
        let distance = rng.random_range(1.0..=radius.max(1.0));
        Self {
            destination: center.offset(angle.cos() * distance, 0.0, angle.sin() * distance),
        }
    }

    /// Where the wander goes.
    pub const fn destination(&self) -> Vec3 {
        self.destination
    }
}

impl Goal for Wander {
    fn label(&self) -> String {
        format!("wander to {}", self.destination)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let trip = ctx
            .navigator()
            .goto(NavTarget::Point(self.destination), MovementProfile::CAUTIOUS);
        Step::Suspended(
            trip.map(|result| result.map(|()| Outcome::Arrived).map_err(GoalError::from))
                .boxed(),
        )
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        ctx.navigator().stop();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn destination_stays_within_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = Vec3::new(0.5, 64.0, 0.5);
        for _ in 0..50 {
            let wander = Wander::around(center, 8.0, &mut rng);
            let d = center.distance_to(wander.destination());
            assert!((1.0 - 1e-9..=8.0 + 1e-9).contains(&d), "distance {d}");
        }
    }
}
