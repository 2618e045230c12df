//! Triggers that turn world conditions into quiet goals.
//!
//! The agent evaluates triggers before every scheduler tick. Each trigger
//! watches one condition and, when it holds and its lane is free, proposes
//! a quiet root goal:
//!
//! - **Threat**: a hostile within `threat_radius` and nothing in the
//!   critical lane. Flee when health is low, otherwise fight.
//! - **Hunger**: food below `hunger_threshold`, food held, survival lane
//!   empty. Eat.
//! - **Night**: sleeping enabled, a bed known, survival lane empty. Sleep.
//! - **Idle**: no non-quiet work for `idle_chores_after_secs` and an empty
//!   normal lane. Harvest, plant, pick up drops, or wander.
//!
//! A trigger that fired stays silent for `cooldown_secs`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quarry_goals::{Goal, GoalScheduler};
use quarry_types::{EntityKind, Lane};
use quarry_world::{AgentMemory, GameData, Landmark, WorldView};
use rand::Rng;
use tracing::debug;

use crate::config::TriggerConfig;
use crate::kinds::eat::best_food;
use crate::kinds::harvest::ripe_crop;
use crate::kinds::plant::planting_spot;
use crate::kinds::{
    AttackEntity, CollectDrops, Eat, Flee, HarvestCrops, PlantSapling, Planning, Sleep, Wander,
    held_matching,
};

/// The condition a firing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trigger {
    /// A hostile is close.
    Threat,
    /// Food is low.
    Hunger,
    /// It is night.
    Night,
    /// Nothing to do.
    Idle,
}

/// A goal proposed by a trigger, to be pushed as a quiet root.
pub struct Firing {
    /// Where it came from.
    pub trigger: Trigger,
    /// Lane to push it onto.
    pub lane: Lane,
    /// The goal.
    pub goal: Box<dyn Goal>,
}

impl core::fmt::Debug for Firing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Firing")
            .field("trigger", &self.trigger)
            .field("lane", &self.lane)
            .field("goal", &self.goal.label())
            .finish()
    }
}

/// What the triggers look at.
#[derive(Clone, Copy)]
pub struct TriggerInputs<'a> {
    /// Current world.
    pub view: &'a dyn WorldView,
    /// Agent memory.
    pub memory: &'a AgentMemory,
    /// Lane occupancy and idle time.
    pub scheduler: &'a GoalScheduler,
    /// Planning handed to goals that may need to obtain things.
    pub planning: &'a Planning,
    /// Evaluation time.
    pub now: DateTime<Utc>,
}

/// Trigger state: thresholds plus when each trigger last fired.
#[derive(Debug, Clone)]
pub struct Triggers {
    config: TriggerConfig,
    last_fired: BTreeMap<Trigger, DateTime<Utc>>,
}

impl Triggers {
    /// Triggers with the given thresholds.
    pub const fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            last_fired: BTreeMap::new(),
        }
    }

    /// The thresholds.
    pub const fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Evaluate every trigger, highest lane first. At most one goal is
    /// proposed per lane.
    pub fn evaluate(&mut self, inputs: TriggerInputs<'_>, rng: &mut impl Rng) -> Vec<Firing> {
        let mut fired = Vec::new();

        if let Some(goal) = self.threat(inputs) {
            fired.push(self.record(Trigger::Threat, Lane::Critical, goal, inputs.now));
        }

        if inputs.scheduler.lane_len(Lane::Survival) == 0 {
            if let Some(goal) = self.hunger(inputs) {
                fired.push(self.record(Trigger::Hunger, Lane::Survival, goal, inputs.now));
            } else if let Some(goal) = self.night(inputs) {
                fired.push(self.record(Trigger::Night, Lane::Survival, goal, inputs.now));
            }
        }

        if let Some(goal) = self.idle(inputs, rng) {
            fired.push(self.record(Trigger::Idle, Lane::Normal, goal, inputs.now));
        }

        fired
    }

    fn record(
        &mut self,
        trigger: Trigger,
        lane: Lane,
        goal: Box<dyn Goal>,
        now: DateTime<Utc>,
    ) -> Firing {
        debug!(?trigger, %lane, goal = goal.label(), "trigger fired");
        self.last_fired.insert(trigger, now);
        Firing {
            trigger,
            lane,
            goal,
        }
    }

    fn cooled_down(&self, trigger: Trigger, now: DateTime<Utc>) -> bool {
        self.last_fired
            .get(&trigger)
            .is_none_or(|last| elapsed_at_least(*last, now, self.config.cooldown_secs))
    }

    fn threat(&self, inputs: TriggerInputs<'_>) -> Option<Box<dyn Goal>> {
        if inputs.scheduler.lane_len(Lane::Critical) > 0
            || !self.cooled_down(Trigger::Threat, inputs.now)
        {
            return None;
        }
        let view = inputs.view;
        let hostile = view.nearest_entity(
            &|e| e.kind == EntityKind::Hostile,
            self.config.threat_radius,
        )?;
        if view.health() < self.config.flee_health {
            Some(Box::new(Flee::new(hostile.id, self.config.flee_distance)))
        } else {
            Some(Box::new(AttackEntity::new(hostile.id)))
        }
    }

    fn hunger(&self, inputs: TriggerInputs<'_>) -> Option<Box<dyn Goal>> {
        let view = inputs.view;
        if view.food() >= self.config.hunger_threshold
            || !self.cooled_down(Trigger::Hunger, inputs.now)
            || best_food(view).is_none()
        {
            return None;
        }
        Some(Box::new(Eat::new()))
    }

    fn night(&self, inputs: TriggerInputs<'_>) -> Option<Box<dyn Goal>> {
        if !self.config.sleep_at_night
            || !inputs.view.is_night()
            || !inputs.memory.knows(Landmark::Bed)
            || !self.cooled_down(Trigger::Night, inputs.now)
        {
            return None;
        }
        Some(Box::new(Sleep::new(inputs.planning.clone())))
    }

    fn idle(&self, inputs: TriggerInputs<'_>, rng: &mut impl Rng) -> Option<Box<dyn Goal>> {
        let idle_long_enough = inputs.scheduler.idle_since().is_some_and(|since| {
            elapsed_at_least(since, inputs.now, self.config.idle_chores_after_secs)
        });
        if !idle_long_enough
            || inputs.scheduler.lane_len(Lane::Normal) > 0
            || !self.cooled_down(Trigger::Idle, inputs.now)
        {
            return None;
        }
        Some(self.chore(inputs, rng))
    }

    fn chore(&self, inputs: TriggerInputs<'_>, rng: &mut impl Rng) -> Box<dyn Goal> {
        let view = inputs.view;
        let here = view.position();
        if ripe_crop(view).is_some() {
            return Box::new(HarvestCrops::new(inputs.planning.clone()));
        }
        if held_matching(view, GameData::is_sapling).is_some()
            && planting_spot(view, inputs.memory).is_some()
        {
            return Box::new(PlantSapling::new());
        }
        let radius = self.config.wander_radius;
        if view
            .nearest_entity(&|e| e.kind == EntityKind::Drop, radius)
            .is_some()
        {
            return Box::new(CollectDrops::around(here, radius));
        }
        Box::new(Wander::around(here, radius, rng))
    }
}

fn elapsed_at_least(since: DateTime<Utc>, now: DateTime<Utc>, secs: u64) -> bool {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX);
    now.signed_duration_since(since).num_seconds() >= secs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;
    use quarry_goals::WorldContext;
    use quarry_types::{BlockPos, Vec3};
    use quarry_world::SimWorld;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    struct Fixture {
        world: SimWorld,
        memory: AgentMemory,
        scheduler: GoalScheduler,
        planning: Planning,
        triggers: Triggers,
        rng: StdRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: SimWorld::vanilla(),
                memory: AgentMemory::default(),
                scheduler: GoalScheduler::new(),
                planning: Planning::root(Arc::default()),
                triggers: Triggers::new(TriggerConfig::default()),
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn evaluate(&mut self, now: DateTime<Utc>) -> Vec<(Trigger, Lane, String)> {
            let inputs = TriggerInputs {
                view: &self.world,
                memory: &self.memory,
                scheduler: &self.scheduler,
                planning: &self.planning,
                now,
            };
            self.triggers
                .evaluate(inputs, &mut self.rng)
                .into_iter()
                .map(|f| (f.trigger, f.lane, f.goal.label()))
                .collect()
        }

        /// Run one empty scheduler tick so it records when idling began.
        fn start_idling(&mut self, now: DateTime<Utc>) {
            let handles = self.world.handles();
            let mut ctx = WorldContext::new(&handles, &mut self.memory, now);
            let _ = self.scheduler.tick(&mut ctx);
        }
    }

    #[test]
    fn quiet_world_fires_nothing() {
        let mut f = Fixture::new();
        assert!(f.evaluate(Utc::now()).is_empty());
    }

    #[test]
    fn healthy_agent_fights_a_close_hostile() {
        let mut f = Fixture::new();
        let zombie = f.world.spawn_creature("zombie", Vec3::new(3.5, 64.0, 0.5));
        let fired = f.evaluate(Utc::now());
        assert_eq!(
            fired,
            vec![(Trigger::Threat, Lane::Critical, format!("attack {zombie}"))]
        );
    }

    #[test]
    fn wounded_agent_flees() {
        let mut f = Fixture::new();
        let zombie = f.world.spawn_creature("zombie", Vec3::new(3.5, 64.0, 0.5));
        f.world.set_health(4.0);
        let fired = f.evaluate(Utc::now());
        assert_eq!(
            fired,
            vec![(Trigger::Threat, Lane::Critical, format!("flee from {zombie}"))]
        );
    }

    #[test]
    fn distant_or_passive_creatures_are_ignored() {
        let mut f = Fixture::new();
        f.world.spawn_creature("zombie", Vec3::new(30.5, 64.0, 0.5));
        f.world.spawn_creature("cow", Vec3::new(1.5, 64.0, 0.5));
        assert!(f.evaluate(Utc::now()).is_empty());
    }

    #[test]
    fn hunger_needs_food_in_the_inventory() {
        let mut f = Fixture::new();
        f.world.set_food(5);
        assert!(f.evaluate(Utc::now()).is_empty());

        f.world.give("bread", 2);
        let fired = f.evaluate(Utc::now());
        assert_eq!(fired.len(), 1);
        assert_eq!(fired.first().map(|t| t.0), Some(Trigger::Hunger));
        assert_eq!(fired.first().map(|t| t.1), Some(Lane::Survival));
    }

    #[test]
    fn cooldown_silences_a_repeat() {
        let mut f = Fixture::new();
        f.world.set_food(5);
        f.world.give("bread", 2);
        let now = Utc::now();
        assert_eq!(f.evaluate(now).len(), 1);
        assert!(f.evaluate(now).is_empty());
        assert_eq!(f.evaluate(now + TimeDelta::seconds(6)).len(), 1);
    }

    #[test]
    fn night_sleeps_only_with_a_known_bed() {
        let mut f = Fixture::new();
        f.world.set_night(true);
        assert!(f.evaluate(Utc::now()).is_empty());

        f.memory.remember_block("white_bed", BlockPos::new(2, 64, 0));
        let fired = f.evaluate(Utc::now());
        assert_eq!(
            fired,
            vec![(Trigger::Night, Lane::Survival, String::from("sleep"))]
        );
    }

    #[test]
    fn idle_agent_wanders_after_the_delay() {
        let mut f = Fixture::new();
        let start = Utc::now();
        f.start_idling(start);
        assert!(f.evaluate(start + TimeDelta::seconds(2)).is_empty());

        let fired = f.evaluate(start + TimeDelta::seconds(11));
        assert_eq!(fired.len(), 1);
        let (trigger, lane, label) = fired.first().cloned().unwrap();
        assert_eq!(trigger, Trigger::Idle);
        assert_eq!(lane, Lane::Normal);
        assert!(label.starts_with("wander to"), "{label}");
    }

    #[test]
    fn idle_chores_prefer_ripe_crops() {
        let mut f = Fixture::new();
        f.world.set_block(BlockPos::new(2, 64, 2), "wheat");
        let start = Utc::now();
        f.start_idling(start);
        let fired = f.evaluate(start + TimeDelta::seconds(11));
        assert_eq!(
            fired,
            vec![(Trigger::Idle, Lane::Normal, String::from("harvest crops"))]
        );
    }

    #[test]
    fn idle_chores_plant_held_saplings() {
        let mut f = Fixture::new();
        f.world.fill(BlockPos::new(-3, 63, -3), BlockPos::new(3, 63, 3), "grass_block");
        f.world.give("oak_sapling", 1);
        let start = Utc::now();
        f.start_idling(start);
        let fired = f.evaluate(start + TimeDelta::seconds(11));
        assert_eq!(
            fired,
            vec![(Trigger::Idle, Lane::Normal, String::from("plant a sapling"))]
        );
    }
}
