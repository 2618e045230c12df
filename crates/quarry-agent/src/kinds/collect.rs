//! Pick up dropped items.

use std::collections::BTreeSet;

use quarry_goals::{Goal, GoalContext, GoalResult, Outcome, Step};
use quarry_types::{EntityId, EntityKind, EntitySnapshot, GoalId, Vec3};
use quarry_world::NavTarget;
use tracing::debug;

use super::{NavigateTo, inventory_total};

/// Trips before stopping with whatever was picked up.
const MAX_TRIPS: u32 = 16;

/// Walks onto every dropped item within `radius` of a point, optionally
/// only items named in a filter. Resolves with the number of items the
/// inventory gained.
#[derive(Debug)]
pub struct CollectDrops {
    center: Vec3,
    radius: f64,
    items: Option<BTreeSet<String>>,
    trips: u32,
    current: Option<EntityId>,
    skipped: BTreeSet<EntityId>,
    start_total: Option<u32>,
    child: Option<GoalResult>,
}

impl CollectDrops {
    /// Collect every drop within `radius` of `center`.
    pub const fn around(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            items: None,
            trips: 0,
            current: None,
            skipped: BTreeSet::new(),
            start_total: None,
            child: None,
        }
    }

    /// Only collect these items.
    #[must_use]
    pub fn only<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = Some(items.into_iter().map(Into::into).collect());
        self
    }

    fn wanted(&self, entity: &EntitySnapshot) -> bool {
        entity.kind == EntityKind::Drop
            && !self.skipped.contains(&entity.id)
            && entity.position.distance_to(self.center) <= self.radius
            && self
                .items
                .as_ref()
                .is_none_or(|items| items.contains(&entity.name))
    }
}

impl Goal for CollectDrops {
    fn label(&self) -> String {
        format!("collect drops near {}", self.center)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let view = ctx.view();
        let start = *self.start_total.get_or_insert_with(|| inventory_total(view));

        // A drop still lying there after a trip is unreachable or not ours.
        if let (Some(result), Some(id)) = (self.child.take(), self.current.take()) {
            if let Err(e) = &result {
                debug!(goal = %ctx.id(), drop = %id, error = %e, "could not reach drop");
            }
            if view.entity(id).is_some() {
                self.skipped.insert(id);
            }
        }

        let gained = inventory_total(view).saturating_sub(start);
        if self.trips >= MAX_TRIPS {
            return Step::ok(Outcome::Collected(gained));
        }
        let search = view.position().distance_to(self.center) + self.radius;
        let Some(drop) = view.nearest_entity(&|e| self.wanted(e), search) else {
            return Step::ok(Outcome::Collected(gained));
        };

        self.trips = self.trips.saturating_add(1);
        self.current = Some(drop.id);
        ctx.spawn(NavigateTo::new(NavTarget::Point(drop.position)));
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
